//! Common test utilities for bot integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use pairbot::error::Result;
use pairbot::transport::InboundMessage;
use pairbot::{AppState, ChatTransport, Config};

/// Mock transport that captures outbound messages
#[derive(Default, Clone)]
pub struct MockTransport {
    /// Captured (recipient, text) pairs
    pub sent: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// All messages delivered to one recipient, in order
    pub fn sent_to(&self, recipient: &str) -> Vec<String> {
        self.sent
            .read()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// The most recent message delivered to one recipient
    pub fn last_sent_to(&self, recipient: &str) -> Option<String> {
        self.sent_to(recipient).pop()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<()> {
        self.sent
            .write()
            .unwrap()
            .push((recipient_id.to_string(), text.to_string()));
        Ok(())
    }
}

static STATE_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Create app state with the given admin allow-list and a temp data file
pub fn test_state(admin_ids: &[&str]) -> AppState {
    let data_file = std::env::temp_dir().join(format!(
        "pairbot-it-{}-{}.json",
        std::process::id(),
        STATE_SEQ.fetch_add(1, Ordering::SeqCst)
    ));
    AppState::new(Config {
        admin_ids: admin_ids.iter().map(|id| id.to_string()).collect(),
        data_file,
        ..Config::default()
    })
}

/// Build an inbound direct message
pub fn direct_message(sender_id: &str, name: &str, text: &str) -> InboundMessage {
    InboundMessage {
        sender_id: sender_id.to_string(),
        text: text.to_string(),
        sender_display_name: Some(name.to_string()),
        is_group_or_status: false,
    }
}
