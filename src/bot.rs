use chrono::Utc;
use tokio::sync::mpsc;

use crate::services::dispatcher::{self, Command, DispatchOutcome};
use crate::services::persistence;
use crate::state::AppState;
use crate::transport::{ChatTransport, InboundMessage, TransportEvent};

/// Consumes transport events until the channel closes.
///
/// This loop is the only chat-side writer of the code store; one handler
/// body executes at a time, so usage events append in the order their
/// causing messages arrived.
pub async fn run(
    state: AppState,
    transport: std::sync::Arc<dyn ChatTransport>,
    mut events: mpsc::Receiver<TransportEvent>,
) {
    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::Message(message) => {
                handle_message(&state, transport.as_ref(), message).await;
            }
            TransportEvent::QrChallenge(qr) => {
                tracing::info!("🔐 QR challenge received - scan to authenticate");
                tracing::debug!("QR payload: {}...", qr.chars().take(50).collect::<String>());
            }
            TransportEvent::Ready => {
                tracing::info!("🎉 Bot ready for users");
                tracing::info!(
                    "📱 Users can message: !pair, !mycode, !help, !status, !ping"
                );
            }
            TransportEvent::Authenticated => {
                tracing::info!("✅ Messaging authentication successful");
            }
            TransportEvent::AuthFailure(reason) => {
                tracing::error!("❌ Messaging authentication failed: {}", reason);
            }
            TransportEvent::Disconnected(reason) => {
                tracing::warn!("❌ Messaging client disconnected: {}", reason);
                // Best-effort save before the transport goes away.
                if let Err(e) = persistence::checkpoint(&state).await {
                    tracing::error!("Checkpoint on disconnect failed: {}", e);
                }
            }
        }
    }

    tracing::info!("Transport event channel closed, bot loop exiting");
}

/// Processes one inbound message end to end.
///
/// A delivery failure is logged and never rolls the store back; the sender
/// can always retrieve an issued code via `!mycode`.
async fn handle_message(state: &AppState, transport: &dyn ChatTransport, message: InboundMessage) {
    if message.is_group_or_status {
        return;
    }

    let display_name = message
        .sender_display_name
        .as_deref()
        .unwrap_or("User")
        .to_string();

    tracing::info!("📨 {} ({}): {}", display_name, message.sender_id, message.text);

    {
        let mut store = match state.store.write() {
            Ok(store) => store,
            Err(_) => {
                tracing::error!("Code store lock poisoned, dropping message");
                return;
            }
        };
        store.record_session(&message.sender_id, &display_name, Utc::now());
    }

    let command = Command::parse(&message.text);
    let outcome = match dispatcher::dispatch(state, &message.sender_id, &display_name, command) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Error handling message from {}: {}", message.sender_id, e);
            DispatchOutcome::apology()
        }
    };

    if let Some(reply) = outcome.reply {
        if let Err(e) = transport.send(&message.sender_id, &reply).await {
            tracing::error!("❌ Failed to deliver reply to {}: {}", message.sender_id, e);
        }
    }

    for notice in outcome.admin_notices {
        if let Err(e) = transport.send(&notice.recipient, &notice.text).await {
            tracing::warn!("Failed to notify admin {}: {}", notice.recipient, e);
        }
    }
}
