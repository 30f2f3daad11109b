use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::error::{ProxyError, Result};
use crate::registry::StreamRegistry;
use crate::transport::UdpSender;
use crate::transport::tcp;

/// High-level proxy orchestrator.
///
/// Owns the stream registry and the accept loop's lifecycle. Delegates
/// connection handling to [`transport::tcp`](crate::transport::tcp) and
/// per-connection proxying to [`proxy::ProxyHandler`](crate::proxy::ProxyHandler).
pub struct Server {
    registry: StreamRegistry,
    running: Arc<AtomicBool>,
    bind_addr: String,
}

impl Server {
    pub fn new(bind_addr: &str, registry: StreamRegistry) -> Self {
        Self {
            registry,
            running: Arc::new(AtomicBool::new(false)),
            bind_addr: bind_addr.to_string(),
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(ProxyError::AlreadyRunning);
        }

        let udp = Arc::new(UdpSender::bind()?);

        let listener = TcpListener::bind(&self.bind_addr)?;
        listener.set_nonblocking(true)?;

        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let registry = self.registry.clone();

        tracing::info!(
            addr = %self.bind_addr,
            streams = self.registry.len(),
            "RTSP proxy listening"
        );

        thread::spawn(move || {
            tcp::accept_loop(listener, registry, udp, running);
        });

        Ok(())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        tracing::info!("proxy stopping");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
