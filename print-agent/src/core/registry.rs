//! Connected client registry
//!
//! Small piece of shared state: one entry per open WebSocket session,
//! inserted on connect and removed when the session's guard drops.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Snapshot of one connected client
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub id: Uuid,
    pub remote_addr: SocketAddr,
    pub connected_at: DateTime<Utc>,
}

struct ClientEntry {
    info: ClientInfo,
    shutdown: CancellationToken,
}

#[derive(Default)]
struct Sessions {
    clients: HashMap<Uuid, ClientEntry>,
    /// Set by `close_all`; later registrations start cancelled
    closed: bool,
}

#[derive(Default)]
struct Inner {
    sessions: Mutex<Sessions>,
    idle: Notify,
}

#[derive(Clone, Default)]
pub struct ClientRegistry {
    inner: Arc<Inner>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session; it stays registered until the guard drops
    pub fn register(&self, remote_addr: SocketAddr) -> ClientGuard {
        let info = ClientInfo {
            id: Uuid::new_v4(),
            remote_addr,
            connected_at: Utc::now(),
        };
        let shutdown = CancellationToken::new();
        let id = info.id;

        let mut sessions = self.inner.sessions.lock();
        if sessions.closed {
            shutdown.cancel();
        }
        sessions.clients.insert(
            id,
            ClientEntry {
                info,
                shutdown: shutdown.clone(),
            },
        );
        drop(sessions);

        ClientGuard {
            id,
            shutdown,
            registry: self.clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.inner.sessions.lock().clients.len()
    }

    /// Ask every session to close, including any that register later
    ///
    /// Sessions finish the job in hand before closing.
    pub fn close_all(&self) {
        let mut sessions = self.inner.sessions.lock();
        sessions.closed = true;
        tracing::info!(count = sessions.clients.len(), "Closing client sessions");

        let now = Utc::now();
        for entry in sessions.clients.values() {
            tracing::debug!(
                client = %entry.info.id,
                remote_addr = %entry.info.remote_addr,
                connected_secs = (now - entry.info.connected_at).num_seconds(),
                "Closing session"
            );
            entry.shutdown.cancel();
        }
    }

    /// Resolve once no session is registered
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn remove(&self, id: &Uuid) {
        let mut sessions = self.inner.sessions.lock();
        sessions.clients.remove(id);
        if sessions.clients.is_empty() {
            self.inner.idle.notify_waiters();
        }
    }
}

/// Registration handle held by a session
pub struct ClientGuard {
    id: Uuid,
    shutdown: CancellationToken,
    registry: ClientRegistry,
}

impl ClientGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Cancelled when the server asks this session to close
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[test]
    fn test_register_and_drop() {
        let registry = ClientRegistry::new();
        let a = registry.register(addr(5001));
        let b = registry.register(addr(5002));
        assert_eq!(registry.count(), 2);
        assert_ne!(a.id(), b.id());
        assert!(!a.shutdown_token().is_cancelled());

        drop(a);
        assert_eq!(registry.count(), 1);

        drop(b);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_close_all_cancels_sessions() {
        let registry = ClientRegistry::new();
        let a = registry.register(addr(5001));
        let b = registry.register(addr(5002));

        registry.close_all();

        assert!(a.shutdown_token().is_cancelled());
        assert!(b.shutdown_token().is_cancelled());
        // Entries stay until the sessions end
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_register_after_close_all_starts_cancelled() {
        let registry = ClientRegistry::new();
        registry.close_all();

        let late = registry.register(addr(5003));
        assert!(late.shutdown_token().is_cancelled());
        assert_eq!(registry.count(), 1);
    }

    #[tokio::test]
    async fn test_wait_idle_resolves_when_last_session_drops() {
        let registry = ClientRegistry::new();
        registry.wait_idle().await;

        let a = registry.register(addr(5001));
        let b = registry.register(addr(5002));

        let waiter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.wait_idle().await })
        };

        drop(a);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(b);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait_idle did not resolve")
            .unwrap();
    }
}
