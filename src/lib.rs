pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod ops;
pub mod score;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;

pub use app::router;
pub use config::Config;
pub use errors::{AppError, HabitError, StorageError};
pub use models::{Profile, StateDocument};
pub use ops::{Confirmation, Outcome, Prompt};
pub use state::AppState;
pub use storage::{FsSlotStore, MemorySlotStore, SlotStore};
pub use store::StateStore;
