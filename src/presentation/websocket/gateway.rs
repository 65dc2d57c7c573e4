//! WebSocket Gateway
//!
//! Tracks connected sessions per user and routes events to them.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::application::dto::response::NotificationResponse;
use crate::application::services::NotificationDispatcher;
use crate::domain::NotificationView;
use crate::infrastructure::metrics;

/// Events pushed to connected clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "t", content = "d")]
pub enum GatewayEvent {
    #[serde(rename = "NEW_NOTIFICATION")]
    NewNotification(NotificationResponse),
}

impl GatewayEvent {
    /// Get the event name for dispatch
    pub fn event_name(&self) -> &'static str {
        match self {
            GatewayEvent::NewNotification(_) => "NEW_NOTIFICATION",
        }
    }

    /// Payload sent as `d`
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            GatewayEvent::NewNotification(n) => serde_json::to_value(n),
        }
    }
}

/// Connected session with its event sender
pub struct ConnectedSession {
    pub user_id: i64,
    pub session_id: String,
    pub sender: mpsc::UnboundedSender<GatewayEvent>,
}

/// WebSocket gateway managing all connections
pub struct Gateway {
    /// Active sessions by session_id
    sessions: DashMap<String, Arc<ConnectedSession>>,
    /// User ID to session IDs (one user can be connected from several clients)
    user_sessions: DashMap<i64, Vec<String>>,
    heartbeat_interval_ms: u64,
}

impl Gateway {
    pub fn new(heartbeat_interval_ms: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            user_sessions: DashMap::new(),
            heartbeat_interval_ms,
        }
    }

    pub fn heartbeat_interval(&self) -> u64 {
        self.heartbeat_interval_ms
    }

    /// Register an identified session
    pub fn register_session(
        &self,
        session_id: String,
        user_id: i64,
        sender: mpsc::UnboundedSender<GatewayEvent>,
    ) {
        let session = Arc::new(ConnectedSession {
            user_id,
            session_id: session_id.clone(),
            sender,
        });

        self.sessions.insert(session_id.clone(), session);
        self.user_sessions
            .entry(user_id)
            .or_default()
            .push(session_id.clone());

        metrics::set_gateway_sessions(self.session_count());
        tracing::info!(user_id, session_id = %session_id, "Session registered");
    }

    /// Unregister a session
    pub fn unregister_session(&self, session_id: &str) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            if let Some(mut sessions) = self.user_sessions.get_mut(&session.user_id) {
                sessions.retain(|s| s != session_id);
            }
            self.user_sessions
                .remove_if(&session.user_id, |_, sessions| sessions.is_empty());

            metrics::set_gateway_sessions(self.session_count());
            tracing::info!(
                user_id = session.user_id,
                session_id = %session_id,
                "Session unregistered"
            );
        }
    }

    /// Send an event to every session of a user; returns how many accepted it
    pub fn send_to_user(&self, user_id: i64, event: GatewayEvent) -> usize {
        let Some(session_ids) = self.user_sessions.get(&user_id).map(|s| s.value().clone()) else {
            return 0;
        };

        session_ids
            .iter()
            .filter_map(|id| self.sessions.get(id).map(|s| s.sender.clone()))
            .filter(|sender| sender.send(event.clone()).is_ok())
            .count()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the user has at least one live session
    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.user_sessions
            .get(&user_id)
            .map(|sessions| !sessions.is_empty())
            .unwrap_or(false)
    }
}

impl NotificationDispatcher for Gateway {
    fn dispatch(&self, notification: &NotificationView) -> bool {
        let recipient_id = notification.notification.user_id;
        let event = GatewayEvent::NewNotification(NotificationResponse::from(notification));
        let delivered = self.send_to_user(recipient_id, event);

        let pushed = delivered > 0;
        metrics::record_notification(notification.notification.notification_type.as_str(), pushed);
        if pushed {
            tracing::debug!(recipient_id, sessions = delivered, "Notification pushed");
        }
        pushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Notification, NotificationType};
    use pretty_assertions::assert_eq;

    fn view(recipient: i64) -> NotificationView {
        NotificationView {
            notification: Notification::new(1, recipient, NotificationType::Follow, 2),
            actor_username: "actor".into(),
            actor_profile_image: "default-profile-photo.jpg".into(),
            post_image: None,
        }
    }

    #[test]
    fn test_dispatch_reaches_only_recipient() {
        let gateway = Gateway::new(1000);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        gateway.register_session("a".into(), 10, tx_a);
        gateway.register_session("b".into(), 20, tx_b);

        assert!(gateway.dispatch(&view(10)));

        let event = rx_a.try_recv().unwrap();
        assert_eq!(event.event_name(), "NEW_NOTIFICATION");
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_dispatch_to_every_session_of_user() {
        let gateway = Gateway::new(1000);
        let (tx_1, mut rx_1) = mpsc::unbounded_channel();
        let (tx_2, mut rx_2) = mpsc::unbounded_channel();
        gateway.register_session("one".into(), 10, tx_1);
        gateway.register_session("two".into(), 10, tx_2);

        assert_eq!(
            gateway.send_to_user(10, GatewayEvent::NewNotification((&view(10)).into())),
            2
        );
        assert!(rx_1.try_recv().is_ok());
        assert!(rx_2.try_recv().is_ok());
    }

    #[test]
    fn test_offline_user_is_not_pushed() {
        let gateway = Gateway::new(1000);
        assert!(!gateway.dispatch(&view(99)));
    }

    #[test]
    fn test_unregister_cleans_up() {
        let gateway = Gateway::new(1000);
        let (tx, _rx) = mpsc::unbounded_channel();
        gateway.register_session("s".into(), 10, tx);
        assert!(gateway.is_user_online(10));

        gateway.unregister_session("s");
        assert!(!gateway.is_user_online(10));
        assert_eq!(gateway.session_count(), 0);
    }

    #[test]
    fn test_event_payload() {
        let event = GatewayEvent::NewNotification((&view(10)).into());
        let payload = event.to_json().unwrap();
        assert_eq!(payload["type"], "follow");
        assert_eq!(payload["sentById"], "2");
    }
}
