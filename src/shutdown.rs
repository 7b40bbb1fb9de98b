//! shutdown — что делать с SIGINT/SIGTERM в зависимости от фазы процесса.
//!
//! Обработчик ставится в `main` до любого provisioning:
//! - пока процесс открывает стор или выполняет одноразовую команду, сигнал
//!   удаляет отслеживаемый snapshot-каталог и процесс завершается (`Exit`);
//! - после `subscribe()` (HTTP-сервер поднят) сигнал уходит подписчику и
//!   дальше идёт обычный graceful shutdown (`Graceful`);
//! - повторный сигнал, когда подписчик уже ушёл, снова даёт `Exit`.
//!
//! Only `kill -9` can leave a snapshot behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// A subscriber was notified; the caller keeps running.
    Graceful,
    /// Nobody is waiting; the tracked snapshot (if any) is already removed.
    Exit,
}

#[derive(Default)]
struct GateState {
    snapshot: Option<PathBuf>,
    waiter: Option<Sender<()>>,
}

/// Shared between the signal handler thread and the command.
#[derive(Clone, Default)]
pub struct ShutdownGate {
    state: Arc<Mutex<GateState>>,
}

impl ShutdownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a snapshot dir to remove if the process is interrupted.
    pub fn track_snapshot(&self, path: &Path) {
        if let Ok(mut st) = self.state.lock() {
            st.snapshot = Some(path.to_path_buf());
        }
    }

    pub fn untrack_snapshot(&self) {
        if let Ok(mut st) = self.state.lock() {
            st.snapshot = None;
        }
    }

    pub fn tracked_snapshot(&self) -> Option<PathBuf> {
        self.state.lock().ok().and_then(|st| st.snapshot.clone())
    }

    /// Switch to graceful mode: the next signal is delivered to the receiver.
    pub fn subscribe(&self) -> Receiver<()> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut st) = self.state.lock() {
            st.waiter = Some(tx);
        }
        rx
    }

    /// Called from the signal handler.
    pub fn on_signal(&self) -> SignalAction {
        let mut st = match self.state.lock() {
            Ok(st) => st,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(tx) = st.waiter.take() {
            if tx.send(()).is_ok() {
                info!("shutdown requested");
                return SignalAction::Graceful;
            }
        }
        if let Some(p) = st.snapshot.take() {
            match remove_dir(&p) {
                Ok(()) => info!("interrupted: snapshot {} removed", p.display()),
                Err(e) => warn!("interrupted: snapshot {} not removed: {}", p.display(), e),
            }
        }
        SignalAction::Exit
    }
}

fn remove_dir(p: &Path) -> io::Result<()> {
    match fs::remove_dir_all(p) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
