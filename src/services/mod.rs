//! External collaborators of the timer engine
//!
//! Storage, time and the commit recipient are injected into the engine so
//! it can run without a page, a filesystem or real time.

pub mod clock;
pub mod commit;
pub mod store;

// Re-export main types
pub use clock::{Clock, ManualClock, ManualScheduler, Scheduler, SystemClock, TickToken, TokioScheduler};
pub use commit::{quick_action, stdout_commit, Commit, CommitCallback};
pub use store::{default_store_path, JsonFileStore, MemoryStore, PersistenceStore, STORE_FILE_NAME};
