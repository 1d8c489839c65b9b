use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::services::store::{CodeStore, StoreSettings};

/// The application's state.
///
/// The code store is the single owner of all mutable pairing data; every
/// reader and writer goes through its lock, so no operation ever observes a
/// partially applied mutation.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// The in-memory code store.
    pub store: Arc<RwLock<CodeStore>>,
    /// When the process started.
    started_at: Instant,
}

impl AppState {
    /// Creates a new `AppState` with an empty store.
    pub fn new(config: Config) -> Self {
        let store = CodeStore::new(StoreSettings::from_config(&config));
        Self {
            config,
            store: Arc::new(RwLock::new(store)),
            started_at: Instant::now(),
        }
    }

    /// How long the process has been running.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
