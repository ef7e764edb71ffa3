//! Notification CRUD and send-and-deliver.

use std::sync::Arc;

use tracing::{info, warn};

use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;
use notifyhub_database::store::NotificationStore;
use notifyhub_entity::notification::CreateNotification;
use notifyhub_realtime::RealtimeEngine;

use super::payload::NotificationResponse;

/// Manages notifications and pushes new ones to connected receivers.
#[derive(Debug, Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    realtime: RealtimeEngine,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(store: Arc<dyn NotificationStore>, realtime: RealtimeEngine) -> Self {
        Self { store, realtime }
    }

    /// Persist a notification, then push it to the receiver's topic if
    /// the receiver is connected.
    ///
    /// An unreachable receiver is not an error: the notification stays
    /// unread in the store for later retrieval.
    pub async fn send_notification(&self, request: CreateNotification) -> AppResult<NotificationResponse> {
        if request.receiver_id.trim().is_empty() {
            return Err(AppError::validation("receiverId must not be empty"));
        }

        let notification = self
            .store
            .create(&request)
            .await
            .map_err(|e| AppError::with_source(e.kind, "Failed to save notification", e))?;
        let response = NotificationResponse::from(notification);

        let topic = self.realtime.user_topic(&response.receiver_id);
        let payload = serde_json::to_value(&response)?;
        let delivered = self
            .realtime
            .gate
            .send_to_user(&response.receiver_id, &topic, &payload)
            .await;

        if delivered {
            info!(
                notification_id = response.id,
                receiver_id = %response.receiver_id,
                "Notification delivered"
            );
        } else {
            warn!(
                notification_id = response.id,
                receiver_id = %response.receiver_id,
                "Receiver not reachable, notification stored only"
            );
        }

        Ok(response)
    }

    /// All notifications for a receiver, newest first.
    pub async fn list_for_receiver(&self, receiver_id: &str) -> AppResult<Vec<NotificationResponse>> {
        let notifications = self.store.find_by_receiver(receiver_id).await?;
        Ok(notifications.into_iter().map(NotificationResponse::from).collect())
    }

    /// Unread notifications for a receiver, newest first.
    pub async fn list_unread(&self, receiver_id: &str) -> AppResult<Vec<NotificationResponse>> {
        let notifications = self.store.find_unread_by_receiver(receiver_id).await?;
        Ok(notifications.into_iter().map(NotificationResponse::from).collect())
    }

    /// Mark one notification read. Unknown IDs are a no-op.
    pub async fn mark_read(&self, notification_id: i64) -> AppResult<bool> {
        self.store.mark_read(notification_id).await
    }

    /// Mark all of a receiver's notifications read.
    pub async fn mark_all_read(&self, receiver_id: &str) -> AppResult<u64> {
        let marked = self.store.mark_all_read(receiver_id).await?;
        info!(receiver_id = %receiver_id, marked, "Marked all notifications read");
        Ok(marked)
    }

    /// Count a receiver's unread notifications.
    pub async fn unread_count(&self, receiver_id: &str) -> AppResult<i64> {
        self.store.count_unread(receiver_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifyhub_core::config::RealtimeConfig;
    use notifyhub_database::memory::{MemoryNotificationStore, MemorySessionRegistry};
    use notifyhub_realtime::message::types::{ClientFrame, ServerFrame};

    fn service() -> (NotificationService, RealtimeEngine) {
        let engine = RealtimeEngine::new(RealtimeConfig::default(), Arc::new(MemorySessionRegistry::new()));
        let service = NotificationService::new(Arc::new(MemoryNotificationStore::new()), engine.clone());
        (service, engine)
    }

    fn request(receiver: &str, message: &str) -> CreateNotification {
        CreateNotification {
            sender_id: "system".to_string(),
            receiver_id: receiver.to_string(),
            message: message.to_string(),
            notification_type: "INFO".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_to_connected_receiver_pushes_payload() {
        let (service, engine) = service();
        let mut rx = engine.connect_with_id("s1").await.unwrap();
        engine
            .handle_frame(
                "s1",
                ClientFrame::Subscribe {
                    destination: "/topic/notifications/alice".to_string(),
                },
            )
            .await;

        let response = service.send_notification(request("alice", "hello")).await.unwrap();
        assert!(!response.is_read);

        let mut pushed = None;
        while let Ok(frame) = rx.try_recv() {
            if let ServerFrame::Message { destination, body } = frame {
                pushed = Some((destination, body));
            }
        }
        let (destination, body) = pushed.expect("notification pushed");
        assert_eq!(destination, "/topic/notifications/alice");
        assert_eq!(body, serde_json::to_value(&response).unwrap());
    }

    #[tokio::test]
    async fn test_send_to_offline_receiver_is_stored() {
        let (service, _) = service();
        let response = service.send_notification(request("bob", "later")).await.unwrap();

        let unread = service.list_unread("bob").await.unwrap();
        assert_eq!(unread, vec![response]);
        assert_eq!(service.unread_count("bob").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_receiver_is_rejected() {
        let (service, _) = service();
        let err = service.send_notification(request(" ", "x")).await.unwrap_err();
        assert_eq!(err.kind, notifyhub_core::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_read_operations() {
        let (service, _) = service();
        let first = service.send_notification(request("bob", "one")).await.unwrap();
        service.send_notification(request("bob", "two")).await.unwrap();

        assert!(service.mark_read(first.id).await.unwrap());
        assert!(!service.mark_read(12345).await.unwrap());
        assert_eq!(service.unread_count("bob").await.unwrap(), 1);
        assert_eq!(service.list_for_receiver("bob").await.unwrap().len(), 2);

        assert_eq!(service.mark_all_read("bob").await.unwrap(), 1);
        assert!(service.list_unread("bob").await.unwrap().is_empty());
    }
}
