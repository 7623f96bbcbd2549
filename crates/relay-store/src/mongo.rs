//! MongoDB backend for session storage.
//!
//! Each session is one document in the `remote_sessions` collection:
//!
//! ```text
//! { _id: "<session name>", data: BinData(...), updated_at: ISODate(...) }
//! ```
//!
//! Saving upserts the document, so only the most recent snapshot is kept.

use async_trait::async_trait;
use mongodb::bson::{doc, spec::BinarySubtype, Binary, DateTime};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::snapshot::SessionSnapshot;
use crate::store::SessionStore;

/// Database used when neither the caller nor the URI names one.
pub const DEFAULT_DATABASE: &str = "whatsapp";

/// Collection holding session documents.
pub const SESSION_COLLECTION: &str = "remote_sessions";

/// Upper bound on server selection so an unreachable database fails startup
/// instead of hanging it.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);

const APP_NAME: &str = "wa-relay";

#[derive(Debug, Serialize, Deserialize)]
struct SessionDocument {
    #[serde(rename = "_id")]
    session: String,
    data: Binary,
    updated_at: DateTime,
}

/// MongoDB-backed session store.
///
/// The database handle keeps one long-lived client; the driver pools
/// connections internally, so the store is shared for the process lifetime.
pub struct MongoStore {
    database: Database,
    sessions: Collection<SessionDocument>,
}

impl MongoStore {
    /// Connects to MongoDB and verifies the server answers a `ping`.
    ///
    /// The database is `database` if given, else the one named in the URI,
    /// else [`DEFAULT_DATABASE`]. No retry is attempted.
    pub async fn connect(uri: &str, database: Option<&str>) -> Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StoreError::InvalidUri(e.to_string()))?;

        if options.server_selection_timeout.is_none() {
            options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
        }
        if options.app_name.is_none() {
            options.app_name = Some(APP_NAME.to_string());
        }

        let db_name = resolve_database(database, options.default_database.as_deref());

        let client =
            Client::with_options(options).map_err(|e| StoreError::InvalidUri(e.to_string()))?;
        let database = client.database(&db_name);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let sessions = database.collection::<SessionDocument>(SESSION_COLLECTION);
        Ok(Self {
            database,
            sessions,
        })
    }

    /// Name of the database in use.
    pub fn database_name(&self) -> &str {
        self.database.name()
    }
}

#[async_trait]
impl SessionStore for MongoStore {
    async fn session_exists(&self, session: &str) -> Result<bool> {
        let count = self
            .sessions
            .count_documents(doc! { "_id": session })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    async fn save(&self, session: &str, snapshot: SessionSnapshot) -> Result<()> {
        let bytes = snapshot.len();
        let document = SessionDocument {
            session: session.to_string(),
            data: Binary {
                subtype: BinarySubtype::Generic,
                bytes: snapshot.into_bytes(),
            },
            updated_at: DateTime::now(),
        };

        self.sessions
            .replace_one(doc! { "_id": session }, &document)
            .upsert(true)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(session = %session, bytes, "Session saved to MongoDB");
        Ok(())
    }

    async fn extract(&self, session: &str) -> Result<Option<SessionSnapshot>> {
        let document = self
            .sessions
            .find_one(doc! { "_id": session })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        match document {
            Some(doc) if doc.data.subtype != BinarySubtype::Generic => {
                Err(StoreError::Serialization(format!(
                    "session {} stored with unexpected binary subtype {:?}",
                    session, doc.data.subtype
                )))
            }
            Some(doc) => Ok(Some(SessionSnapshot::new(doc.data.bytes))),
            None => Ok(None),
        }
    }

    async fn delete(&self, session: &str) -> Result<()> {
        self.sessions
            .delete_one(doc! { "_id": session })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        debug!(session = %session, "Session deleted from MongoDB");
        Ok(())
    }
}

fn resolve_database(explicit: Option<&str>, from_uri: Option<&str>) -> String {
    explicit
        .filter(|name| !name.is_empty())
        .or(from_uri)
        .unwrap_or(DEFAULT_DATABASE)
        .to_string()
}
