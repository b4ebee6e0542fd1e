use anyhow::{Result, anyhow};
use futures_util::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::database::models::Notification;

/// A mechanism that pushes a rendered notification to its recipient.
pub trait DeliveryChannel: Send + Sync {
    fn name(&self) -> &'static str;

    fn deliver(&self, notification: &Notification) -> Result<()>;
}

struct Connection {
    id: u64,
    sender: mpsc::Sender<Notification>,
}

/// Live push connections, at most one per user.
#[derive(Clone)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<Uuid, Connection>>>,
    next_id: Arc<AtomicU64>,
    buffer: usize,
}

impl ConnectionRegistry {
    pub fn new(buffer: usize) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            buffer: buffer.max(1),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, Connection>> {
        self.connections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Connection>> {
        self.connections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open a connection for `user_id`, replacing (and thereby closing) any
    /// previous one.
    pub fn register(&self, user_id: Uuid) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        if self.write().insert(user_id, Connection { id, sender }).is_some() {
            log::debug!("Replaced existing push connection for user {}", user_id);
        }
        log::info!("Push connection {} registered for user {}", id, user_id);

        Subscription {
            user_id,
            connection_id: id,
            receiver,
            registry: self.clone(),
        }
    }

    /// Remove the connection only if it is still the one identified by `connection_id`.
    pub fn unregister(&self, user_id: Uuid, connection_id: u64) -> bool {
        let mut connections = self.write();
        match connections.get(&user_id) {
            Some(connection) if connection.id == connection_id => {
                connections.remove(&user_id);
                log::info!(
                    "Push connection {} unregistered for user {}",
                    connection_id,
                    user_id
                );
                true
            }
            _ => false,
        }
    }

    pub fn is_connected(&self, user_id: Uuid) -> bool {
        self.read().contains_key(&user_id)
    }

    pub fn connection_count(&self) -> usize {
        self.read().len()
    }

    /// Push to the user's connection. `Ok(false)` when the user is offline.
    pub fn send(&self, user_id: Uuid, notification: Notification) -> Result<bool> {
        let (connection_id, outcome) = {
            let connections = self.read();
            let Some(connection) = connections.get(&user_id) else {
                return Ok(false);
            };
            (connection.id, connection.sender.try_send(notification))
        };

        match outcome {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => {
                self.unregister(user_id, connection_id);
                Err(anyhow!("Push buffer full for user {}", user_id))
            }
            Err(TrySendError::Closed(_)) => {
                self.unregister(user_id, connection_id);
                Err(anyhow!("Push connection closed for user {}", user_id))
            }
        }
    }
}

/// Receiving half of a registered connection. Dropping it unregisters the
/// connection unless it has been replaced in the meantime.
pub struct Subscription {
    user_id: Uuid,
    connection_id: u64,
    receiver: mpsc::Receiver<Notification>,
    registry: ConnectionRegistry,
}

impl Subscription {
    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }

    /// Next notification, or `None` once the connection was replaced or removed.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.receiver.recv().await
    }
}

impl Stream for Subscription {
    type Item = Notification;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unregister(self.user_id, self.connection_id);
    }
}

/// Server-sent-event push delivery backed by the connection registry.
pub struct PushChannel {
    registry: ConnectionRegistry,
}

impl PushChannel {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }
}

impl DeliveryChannel for PushChannel {
    fn name(&self) -> &'static str {
        "push"
    }

    fn deliver(&self, notification: &Notification) -> Result<()> {
        let recipient_id = notification.recipient_id;
        if !self.registry.send(recipient_id, notification.clone())? {
            log::debug!(
                "User {} is offline, notification {} kept in inbox only",
                recipient_id,
                notification.id
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NotificationType, ReferenceType};
    use chrono::Utc;

    fn notification(recipient_id: Uuid) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            recipient_id,
            notification_type: NotificationType::RequestApproved,
            reference_type: ReferenceType::Request,
            reference_id: Uuid::new_v4(),
            title: "Approved".to_string(),
            message: "Your request was approved".to_string(),
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn delivers_to_registered_user() {
        let registry = ConnectionRegistry::new(4);
        let user_id = Uuid::new_v4();
        let mut subscription = registry.register(user_id);

        let channel = PushChannel::new(registry.clone());
        channel.deliver(&notification(user_id)).unwrap();

        let received = subscription.recv().await.unwrap();
        assert_eq!(received.recipient_id, user_id);
    }

    #[test]
    fn offline_user_is_not_an_error() {
        let registry = ConnectionRegistry::new(4);
        assert!(!registry.send(Uuid::new_v4(), notification(Uuid::new_v4())).unwrap());
    }

    #[tokio::test]
    async fn new_subscription_replaces_old_one() {
        let registry = ConnectionRegistry::new(4);
        let user_id = Uuid::new_v4();

        let mut first = registry.register(user_id);
        let mut second = registry.register(user_id);
        assert_eq!(registry.connection_count(), 1);

        // The replaced sender was dropped, so the old stream ends.
        assert!(first.recv().await.is_none());

        // Dropping the stale subscription must not remove its replacement.
        drop(first);
        assert!(registry.is_connected(user_id));

        registry.send(user_id, notification(user_id)).unwrap();
        assert!(second.recv().await.is_some());
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let registry = ConnectionRegistry::new(4);
        let user_id = Uuid::new_v4();
        let subscription = registry.register(user_id);
        assert!(registry.is_connected(user_id));

        drop(subscription);
        assert!(!registry.is_connected(user_id));
    }

    #[test]
    fn full_buffer_drops_connection() {
        let registry = ConnectionRegistry::new(1);
        let user_id = Uuid::new_v4();
        let _subscription = registry.register(user_id);

        registry.send(user_id, notification(user_id)).unwrap();
        assert!(registry.send(user_id, notification(user_id)).is_err());
        assert!(!registry.is_connected(user_id));
    }
}
