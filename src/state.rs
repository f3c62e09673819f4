use crate::errors::AppError;
use crate::storage::FsSlotStore;
use crate::store::StateStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

/// Shared handle to the single state store. Handlers hold the lock from
/// validation through the save, so mutations never interleave.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<StateStore<FsSlotStore>>>,
}

impl AppState {
    pub fn new(store: StateStore<FsSlotStore>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs `work` against the locked store on the blocking pool. Slot
    /// writes are synchronous file I/O and must stay off the runtime threads.
    pub async fn with_store<T, F>(&self, work: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut StateStore<FsSlotStore>) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let mut store = Arc::clone(&self.store).lock_owned().await;
        tokio::task::spawn_blocking(move || work(&mut store))
            .await
            .map_err(|err| {
                error!(error = %err, "store task failed");
                AppError::internal("store task failed")
            })?
    }
}
