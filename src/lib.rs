//! Pair Code Bot
//!
//! A messaging-bot application that issues short-lived pairing codes over a
//! chat protocol, tracks their lifecycle, and exposes usage statistics
//! through a small web dashboard. Protocol handling and delivery live behind
//! the [`transport::ChatTransport`] seam.

pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod maintenance;
pub mod state;
pub mod transport;

pub mod models {
    pub mod code;
    pub mod session;
    pub mod usage;
    pub mod user;
}

pub mod services {
    pub mod dispatcher;
    pub mod generator;
    pub mod persistence;
    pub mod quota;
    pub mod report;
    pub mod store;
}

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
pub use transport::{ChatTransport, ConsoleTransport, InboundMessage, TransportEvent};
