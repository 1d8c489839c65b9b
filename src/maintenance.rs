use std::time::Duration;

use chrono::Utc;

use crate::services::persistence;
use crate::state::AppState;

/// How often expired codes are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);
/// How often the store is checkpointed to disk.
const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(300);

/// Spawns the hourly expire-sweep task. A sweep that removed anything is
/// followed by an immediate checkpoint.
pub fn spawn_sweep_task(state: AppState) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SWEEP_INTERVAL).await;
            let removed = {
                let mut store = match state.store.write() {
                    Ok(store) => store,
                    Err(_) => {
                        tracing::error!("Code store lock poisoned, skipping sweep");
                        continue;
                    }
                };
                store.sweep_expired(Utc::now())
            };

            if removed > 0 {
                tracing::info!("🧹 Cleaned {} expired pair codes", removed);
                if let Err(e) = persistence::checkpoint(&state).await {
                    tracing::error!("❌ Checkpoint after sweep failed: {}", e);
                }
            }
        }
    });
}

/// Spawns the periodic checkpoint task. A failed write is logged and
/// retried on the next interval, never fatal.
pub fn spawn_checkpoint_task(state: AppState) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(CHECKPOINT_INTERVAL).await;
            match persistence::checkpoint(&state).await {
                Ok(()) => tracing::debug!("💾 Checkpoint written"),
                Err(e) => tracing::error!("❌ Checkpoint failed: {}", e),
            }
        }
    });
}
