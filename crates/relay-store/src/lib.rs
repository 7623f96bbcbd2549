//! Remote session storage for the WhatsApp relay.
//!
//! The messaging engine produces an opaque snapshot of its authenticated
//! session. This crate persists those snapshots so a restarted relay can
//! restore the session without scanning a new QR code.
//!
//! Backends:
//!
//! - **MongoStore**: MongoDB collection, used in production
//! - **InMemoryStore**: process-local map for development and tests
//!
//! Any backend can be wrapped in [`ReadOnlyStore`] to restore sessions while
//! never persisting updates.
//!
//! # Example
//!
//! ```no_run
//! use relay_store::{MongoStore, ReadOnlyStore, SessionStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> relay_store::Result<()> {
//! let store = MongoStore::connect("mongodb://localhost:27017/whatsapp", None).await?;
//!
//! // Restore-only deployment
//! let store: Arc<dyn SessionStore> = Arc::new(ReadOnlyStore::new(store));
//!
//! if let Some(snapshot) = store.extract("RemoteAuth").await? {
//!     println!("restoring {} bytes of session data", snapshot.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod mongo;
pub mod snapshot;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use mongo::{MongoStore, DEFAULT_DATABASE, SESSION_COLLECTION};
pub use snapshot::SessionSnapshot;
pub use store::{ReadOnlyStore, SessionStore};
