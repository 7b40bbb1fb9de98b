#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod error;
pub mod config;
pub mod metrics;
pub mod util;

// Движок и snapshot (hard-link копия каталога без LOCK)
pub mod store;    // src/store/{mod,rocks,mem}.rs
pub mod snapshot;
pub mod shutdown; // SIGINT/SIGTERM: удаление snapshot или graceful stop

// Чтение: листинг ключей, статистика, владелец handle
pub mod browse;
pub mod stats;
pub mod inspector;

// HTTP façade
pub mod model;
pub mod server;   // src/server/{mod,handlers}.rs

// Удобные реэкспорты
pub use browse::{Key, Page, PageRequest, SearchMode};
pub use config::InspectConfig;
pub use error::{InspectError, InspectResult};
pub use inspector::Inspector;
pub use snapshot::{provision, SnapshotDir};
pub use stats::StoreStats;
pub use store::{MemStore, OrderedStore, RocksStore};
