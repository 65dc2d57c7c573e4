//! WebSocket Connection Handler
//!
//! Hello, Identify, READY, then heartbeats and event dispatch until the
//! client leaves or misses a heartbeat.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::SplitStream, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};
use uuid::Uuid;

use super::gateway::GatewayEvent;
use super::messages::{GatewayReceive, GatewaySend, IdentifyPayload, OpCode, ReadyPayload};
use super::session::SessionState;
use crate::application::dto::response::UserSummaryResponse;
use crate::application::services::verify_token;
use crate::domain::{UserRepository, UserSummary};
use crate::infrastructure::repositories::PgUserRepository;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Gateway protocol version reported in READY
const GATEWAY_VERSION: u8 = 1;

/// Extra time allowed on top of the heartbeat interval
const HEARTBEAT_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum GatewayError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unknown opcode {0}")]
    UnknownOpcode(u64),

    #[error("authentication failed: {0}")]
    Unauthorized(String),

    #[error("user {0} not found")]
    UnknownUser(i64),

    #[error(transparent)]
    Repository(#[from] AppError),
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4().to_string();
    tracing::debug!(session_id = %session_id, "New WebSocket connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<GatewaySend>();

    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize gateway frame");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    let _ = tx.send(GatewaySend::hello(state.gateway.heartbeat_interval()));

    let identify_timeout = Duration::from_secs(state.settings.websocket.identify_timeout_secs);
    let identify = match timeout(identify_timeout, wait_for_identify(&mut receiver)).await {
        Ok(Some(identify)) => identify,
        Ok(None) => {
            tracing::debug!(session_id = %session_id, "Connection closed before Identify");
            sender_task.abort();
            return;
        }
        Err(_) => {
            tracing::debug!(session_id = %session_id, "Identify timeout");
            reject(tx, sender_task).await;
            return;
        }
    };

    let user = match identify_user(&identify.token, &state).await {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(session_id = %session_id, error = %e, "Identify rejected");
            reject(tx, sender_task).await;
            return;
        }
    };

    let user_id = user.id;
    let mut session = SessionState::new(session_id.clone(), user_id);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<GatewayEvent>();
    state
        .gateway
        .register_session(session_id.clone(), user_id, event_tx);

    let ready = serde_json::to_value(ReadyPayload {
        v: GATEWAY_VERSION,
        user: UserSummaryResponse::from(user),
        session_id: session_id.clone(),
    });
    let sent = match ready {
        Ok(d) => tx.send(GatewaySend::dispatch("READY", session.next_sequence(), d)).is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build READY payload");
            false
        }
    };
    if !sent {
        state.gateway.unregister_session(&session_id);
        sender_task.abort();
        return;
    }

    tracing::info!(user_id, session_id = %session_id, "User connected and identified");

    let heartbeat_timeout = Duration::from_millis(state.gateway.heartbeat_interval()) + HEARTBEAT_GRACE;
    let mut heartbeat_check = interval(heartbeat_timeout);
    heartbeat_check.tick().await;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_message(text.as_str(), &mut session, &tx) {
                            tracing::debug!(session_id = %session_id, error = %e, "Error handling message");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(session_id = %session_id, "Connection closed");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                    // Pings are answered by axum
                    Some(Ok(_)) => {}
                }
            }

            Some(event) = event_rx.recv() => {
                let data = match event.to_json() {
                    Ok(data) => data,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize gateway event");
                        continue;
                    }
                };
                let frame = GatewaySend::dispatch(event.event_name(), session.next_sequence(), data);
                if tx.send(frame).is_err() {
                    break;
                }
            }

            _ = heartbeat_check.tick() => {
                if !session.is_alive(heartbeat_timeout) {
                    tracing::info!(session_id = %session_id, "Heartbeat timeout, closing connection");
                    break;
                }
            }
        }
    }

    state.gateway.unregister_session(&session_id);
    drop(tx);
    let _ = tokio::time::timeout(Duration::from_secs(1), sender_task).await;

    tracing::info!(user_id, session_id = %session_id, "User disconnected");
}

/// Read frames until an Identify arrives; `None` if the socket closes first.
async fn wait_for_identify(receiver: &mut SplitStream<WebSocket>) -> Option<IdentifyPayload> {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let Ok(frame) = serde_json::from_str::<GatewayReceive>(text.as_str()) else {
                    continue;
                };
                if OpCode::from_u64(frame.op) != Some(OpCode::Identify) {
                    continue;
                }
                if let Some(identify) = frame.d.and_then(|d| serde_json::from_value(d).ok()) {
                    return Some(identify);
                }
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
    None
}

/// Tell the client its session is invalid and close the connection.
async fn reject(tx: mpsc::UnboundedSender<GatewaySend>, sender_task: tokio::task::JoinHandle<()>) {
    let _ = tx.send(GatewaySend::invalid_session());
    drop(tx);
    if tokio::time::timeout(Duration::from_secs(1), sender_task)
        .await
        .is_err()
    {
        tracing::debug!("Sender task did not finish after InvalidSession");
    }
}

/// Validate the Identify token and load the user it belongs to
async fn identify_user(token: &str, state: &AppState) -> Result<UserSummary, GatewayError> {
    let user_id = verify_token(&state.settings.jwt.secret, token)
        .map_err(|e| GatewayError::Unauthorized(e.to_string()))?;

    let user_repo = PgUserRepository::new(state.db.clone());
    let user = user_repo
        .find_by_id(user_id)
        .await?
        .ok_or(GatewayError::UnknownUser(user_id))?;

    Ok(UserSummary::from(&user))
}

/// Handle a frame from an identified client
fn handle_message(
    text: &str,
    session: &mut SessionState,
    tx: &mpsc::UnboundedSender<GatewaySend>,
) -> Result<(), GatewayError> {
    let frame: GatewayReceive = serde_json::from_str(text)?;

    match OpCode::from_u64(frame.op) {
        Some(OpCode::Heartbeat) => {
            session.heartbeat();
            let _ = tx.send(GatewaySend::heartbeat_ack());
            tracing::trace!(session_id = %session.session_id, "Heartbeat received");
            Ok(())
        }
        Some(OpCode::Identify) => {
            tracing::debug!(session_id = %session.session_id, "Ignoring repeated Identify");
            Ok(())
        }
        _ => Err(GatewayError::UnknownOpcode(frame.op)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heartbeat_is_acknowledged() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = SessionState::new("s".into(), 1);
        session.last_heartbeat -= Duration::from_secs(30);

        handle_message(r#"{"op": 1, "d": null}"#, &mut session, &tx).unwrap();

        assert_eq!(rx.try_recv().unwrap(), GatewaySend::heartbeat_ack());
        assert!(session.is_alive(Duration::from_secs(5)));
    }

    #[test]
    fn test_unknown_opcode_is_reported() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = SessionState::new("s".into(), 1);

        let err = handle_message(r#"{"op": 3}"#, &mut session, &tx).unwrap_err();

        assert!(matches!(err, GatewayError::UnknownOpcode(3)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut session = SessionState::new("s".into(), 1);

        let err = handle_message("not json", &mut session, &tx).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidJson(_)));
    }
}
