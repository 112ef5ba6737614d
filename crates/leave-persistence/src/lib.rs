//! Persistence layer for the leave bot.
//!
//! Everything the bot pipeline and the HTTP API read or write goes through
//! the narrow [`LeaveRepository`] trait. Three backends implement it:
//!
//! - [`FileStore`]: JSON collections on disk, written atomically
//!   (temp file, then rename).
//! - [`PostgrestStore`]: the hosted Postgres REST interface (Supabase).
//! - [`MemoryStore`]: in-process maps, for tests and demos.
//!
//! # Example
//!
//! ```no_run
//! use leave_models::UserProfile;
//! use leave_persistence::{FileStore, LeaveRepository};
//!
//! # async fn demo() -> leave_persistence::Result<()> {
//! let store = FileStore::new("/var/lib/leave-bot");
//! store.save_profile(&UserProfile::new("U1", "jane@example.com", Some("Jane"))).await?;
//!
//! let profile = store.find_profile_by_email("JANE@example.com").await?;
//! assert!(profile.is_some());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file_store;
pub mod memory_store;
pub mod postgrest;
pub mod repository;

pub use error::{PersistenceError, Result};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use postgrest::PostgrestStore;
pub use repository::LeaveRepository;
