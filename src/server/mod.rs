//! server — HTTP façade над Inspector (tiny_http, пул потоков).
//!
//! Каждый воркер крутит `Server::recv()` и обслуживает запросы независимо;
//! общий `Arc<Inspector>` используется только через `&self`.
//!
//! Shutdown: stop flag + one `unblock()` per worker, then join. Requests that
//! were already accepted are answered before the workers exit.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use tiny_http::{Header, Request, Response, Server};

use crate::inspector::Inspector;
use crate::metrics::{record_http_error, record_http_request};

pub struct HttpServer {
    server: Arc<Server>,
    workers: Vec<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

/// Bind `addr` and spawn `workers` request threads.
pub fn start(addr: &str, inspector: Arc<Inspector>, workers: usize) -> Result<HttpServer> {
    let server = Server::http(addr).map_err(|e| anyhow!("bind http at {}: {}", addr, e))?;
    let server = Arc::new(server);
    let stop = Arc::new(AtomicBool::new(false));

    let n = workers.max(1);
    let mut handles = Vec::with_capacity(n);
    for i in 0..n {
        let server = Arc::clone(&server);
        let insp = Arc::clone(&inspector);
        let stop = Arc::clone(&stop);
        let h = thread::Builder::new()
            .name(format!("keyscope-http-{}", i))
            .spawn(move || worker_loop(&server, &insp, &stop))
            .context("spawn http worker")?;
        handles.push(h);
    }

    Ok(HttpServer {
        server,
        workers: handles,
        stop,
    })
}

impl HttpServer {
    /// Bound TCP address (useful with port 0).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Stop accepting, drain in-flight requests, join all workers.
    pub fn shutdown(self) {
        self.stop.store(true, Ordering::Release);
        for _ in 0..self.workers.len() {
            self.server.unblock();
        }
        for h in self.workers {
            if h.join().is_err() {
                warn!("http worker panicked");
            }
        }
        info!("http server stopped");
    }
}

fn worker_loop(server: &Server, insp: &Inspector, stop: &AtomicBool) {
    loop {
        let rq = match server.recv() {
            Ok(rq) => rq,
            Err(e) => {
                if stop.load(Ordering::Acquire) {
                    break;
                }
                warn!("http recv error: {}", e);
                continue;
            }
        };
        serve_one(insp, rq);
    }
    debug!("http worker exiting");
}

fn serve_one(insp: &Inspector, rq: Request) {
    record_http_request();

    let url = rq.url().to_string();
    let method = rq.method().as_str().to_string();
    let remote = rq
        .remote_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string());
    info!("{} {} {}", remote, method, url);

    let reply = handlers::route(insp, &method, &url);
    if reply.status >= 400 {
        record_http_error();
    }

    let mut resp = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(ct) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        resp.add_header(ct);
    }
    if let Err(e) = rq.respond(resp) {
        warn!("respond to {}: {}", remote, e);
    }
}
