//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::io::Write;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, SentinelError};
use super::Connection;

/// Reply sent to a client refused because every slot is taken
const BUSY_REPLY: &[u8] = b"-ERR max connections reached\r\n";

/// TCP server for SentinelDB
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    local_addr: SocketAddr,

    /// Connections currently being served
    active: Arc<AtomicUsize>,

    shutdown: Arc<AtomicBool>,
}

/// Stops a running server from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<AtomicBool>,
    local_addr: SocketAddr,
}

impl Server {
    /// Bind the listener described by `config`
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        if config.max_connections == 0 {
            return Err(SentinelError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            SentinelError::Network(format!("bind {}: {}", config.listen_addr, e))
        })?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            config,
            engine,
            listener,
            local_addr,
            active: Arc::new(AtomicUsize::new(0)),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle that can stop `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: Arc::clone(&self.shutdown),
            local_addr: self.local_addr,
        }
    }

    /// Accept connections until shut down (blocking)
    ///
    /// Connections already admitted keep running after this returns.
    pub fn run(&self) -> Result<()> {
        tracing::info!(
            "Listening on {} (max {} connections)",
            self.local_addr,
            self.config.max_connections
        );

        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(e) => tracing::warn!("Accept failed: {}", e),
            }
        }

        tracing::info!("Listener on {} stopped", self.local_addr);
        Ok(())
    }

    fn dispatch(&self, mut stream: TcpStream) {
        let Some(permit) = ConnectionPermit::acquire(&self.active, self.config.max_connections)
        else {
            tracing::warn!(
                "Refusing {:?}: {} connections already active",
                stream.peer_addr().ok(),
                self.config.max_connections
            );
            let _ = stream.write_all(BUSY_REPLY);
            return;
        };

        let engine = Arc::clone(&self.engine);
        let spawned = thread::Builder::new()
            .name("sentineldb-conn".to_string())
            .spawn(move || {
                let _permit = permit;
                let mut connection = match Connection::new(stream, engine) {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::warn!("Could not set up connection: {}", e);
                        return;
                    }
                };
                if let Err(e) = connection.handle() {
                    tracing::debug!("Connection {} ended with error: {}", connection.peer_addr(), e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Could not spawn connection worker: {}", e);
        }
    }
}

impl ShutdownHandle {
    /// Stop accepting new connections
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        // Wake the blocking accept so it observes the flag
        let mut addr = self.local_addr;
        if addr.ip().is_unspecified() {
            addr.set_ip(match addr {
                SocketAddr::V4(_) => Ipv4Addr::LOCALHOST.into(),
                SocketAddr::V6(_) => Ipv6Addr::LOCALHOST.into(),
            });
        }
        let _ = TcpStream::connect(addr);
    }
}

/// A slot among `max_connections`, released on drop
struct ConnectionPermit {
    active: Arc<AtomicUsize>,
}

impl ConnectionPermit {
    fn acquire(active: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < max).then_some(n + 1))
            .ok()?;
        Some(Self {
            active: Arc::clone(active),
        })
    }
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
