use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use shared::conversation::ConversationError;
use shared::models::{RelayInboundFrame, RelayOutboundFrame};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::AppState;

pub(super) const RELAY_ERROR_MESSAGE: &str = "Error processing request";

#[derive(Debug, Error)]
enum RelayFrameError {
    #[error("malformed relay frame: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

pub(super) async fn relay_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| relay_connection(socket, state))
}

/// Serves one client connection: every inbound data frame gets exactly one
/// `{ "botResponse": .. }` frame back. Conversation state lives in the
/// session store, so the loop itself is stateless.
async fn relay_connection(mut socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    info!(%connection_id, "relay client connected");

    while let Some(frame) = socket.recv().await {
        let outbound = match frame {
            Ok(Message::Text(text)) => handle_frame(&state, connection_id, text.as_bytes()).await,
            Ok(Message::Binary(bytes)) => handle_frame(&state, connection_id, &bytes).await,
            Ok(Message::Ping(_) | Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => break,
            Err(err) => {
                warn!(%connection_id, error = %err, "relay transport error");
                break;
            }
        };

        let encoded = match serde_json::to_string(&outbound) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(%connection_id, error = %err, "failed to encode relay frame");
                continue;
            }
        };

        if let Err(err) = socket.send(Message::Text(encoded.into())).await {
            warn!(%connection_id, error = %err, "failed to send relay frame");
            break;
        }
    }

    info!(%connection_id, "relay client disconnected");
}

async fn handle_frame(state: &AppState, connection_id: Uuid, raw: &[u8]) -> RelayOutboundFrame {
    match relay_frame(state, raw).await {
        Ok(bot_response) => RelayOutboundFrame { bot_response },
        Err(err) => {
            warn!(%connection_id, error = %err, "relay frame failed");
            RelayOutboundFrame {
                bot_response: RELAY_ERROR_MESSAGE.to_string(),
            }
        }
    }
}

async fn relay_frame(state: &AppState, raw: &[u8]) -> Result<String, RelayFrameError> {
    let frame: RelayInboundFrame = serde_json::from_slice(raw)?;
    debug!(
        user_id = frame.user_id.as_deref().unwrap_or_default(),
        "relay frame received"
    );

    let reply = state
        .conversations
        .reply(frame.user_id.as_deref(), frame.prompt.as_deref())
        .await?;
    Ok(reply.bot_response)
}
