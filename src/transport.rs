use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::error::Result;

/// An inbound chat message as delivered by the messaging collaborator.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    /// The stable, opaque sender identifier.
    pub sender_id: String,
    /// The raw message text.
    pub text: String,
    /// The sender's human-readable name, when the network provides one.
    pub sender_display_name: Option<String>,
    /// Group and status traffic is discarded unconditionally.
    pub is_group_or_status: bool,
}

/// Connection-lifecycle and message events from the messaging collaborator.
#[derive(Clone, Debug)]
pub enum TransportEvent {
    /// A QR challenge to present for login.
    QrChallenge(String),
    /// The client is connected and ready to relay messages.
    Ready,
    /// Session authentication succeeded.
    Authenticated,
    /// Session authentication failed.
    AuthFailure(String),
    /// The client lost its connection.
    Disconnected(String),
    /// An inbound message.
    Message(InboundMessage),
}

/// The outbound half of the external messaging collaborator.
///
/// The actual protocol handling, session authentication, and delivery are
/// implemented outside this crate; the bot only ever calls `send`.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Delivers `text` to `recipient_id`.
    async fn send(&self, recipient_id: &str, text: &str) -> Result<()>;
}

/// Transport that logs outbound messages to the console and feeds stdin
/// lines back in as inbound messages (for development).
pub struct ConsoleTransport;

impl ConsoleTransport {
    pub fn new() -> Self {
        Self
    }

    /// Spawns a task turning stdin lines into inbound message events from
    /// the configured console identity. EOF is reported as a disconnect.
    pub fn spawn_stdin_reader(
        events: mpsc::Sender<TransportEvent>,
        sender_id: String,
        display_name: String,
    ) {
        tokio::spawn(async move {
            if events.send(TransportEvent::Ready).await.is_err() {
                return;
            }

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let message = InboundMessage {
                            sender_id: sender_id.clone(),
                            text: line,
                            sender_display_name: Some(display_name.clone()),
                            is_group_or_status: false,
                        };
                        if events.send(TransportEvent::Message(message)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        let _ = events
                            .send(TransportEvent::Disconnected("stdin closed".to_string()))
                            .await;
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Console input error: {}", e);
                        break;
                    }
                }
            }
        });
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<()> {
        println!();
        println!("========================================");
        println!("  OUTBOUND MESSAGE TO: {recipient_id}");
        println!("{text}");
        println!("========================================");
        println!();

        tracing::debug!(recipient = %recipient_id, "Message delivered to console");
        Ok(())
    }
}
