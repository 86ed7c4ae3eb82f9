//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame scheduling (requestAnimationFrame on web, manual elsewhere)
//! - Input events (raw key codes to actions)
//! - Storage (LocalStorage on web, files or memory natively)

pub mod input;
pub mod scheduler;
pub mod storage;

pub use input::action_for_key;
pub use scheduler::{FrameHandle, ManualScheduler, Scheduler};
pub use storage::{KeyValueStore, MemoryStore, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;

#[cfg(target_arch = "wasm32")]
pub use scheduler::RafScheduler;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
