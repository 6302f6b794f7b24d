use async_trait::async_trait;
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use tower_sessions::{session::Id, session::Record, session_store, ExpiredDeletion, SessionStore};
use tracing::debug;

use crate::error::Error;
use crate::storage::LocalStore;

const KEY_PREFIX: &str = "session:";

/// Visitor session storage for `tower-sessions`, kept in the [`LocalStore`].
///
/// Each visitor's session lives under `session:<id>` next to the site's
/// other durable keys, with the session's expiry as the entry's expiry. It
/// holds the visitor's own staff principal (`anandwanUser`), which intake
/// forms are in their submitted state, and the QR artifact the visitor last
/// generated.
///
/// # Usage
///
/// ```no_run
/// use anandwan_outreach::{LocalStore, VisitorSessionStore};
/// use sea_orm::Database;
/// use time::Duration;
/// use tower_sessions::{Expiry, SessionManagerLayer};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = Database::connect("sqlite://anandwan.db?mode=rwc").await?;
/// let store = VisitorSessionStore::new(LocalStore::new(conn));
/// let _layer = SessionManagerLayer::new(store)
///     .with_expiry(Expiry::OnInactivity(Duration::hours(24)));
/// # Ok(())
/// # }
/// ```
///
/// # Error Handling
///
/// Storage errors, encoding included, surface as
/// `session_store::Error::Backend`.
#[derive(Debug, Clone)]
pub struct VisitorSessionStore {
    local: LocalStore,
}

impl VisitorSessionStore {
    pub fn new(local: LocalStore) -> Self {
        Self { local }
    }
}

impl From<Error> for session_store::Error {
    fn from(err: Error) -> Self {
        session_store::Error::Backend(err.to_string())
    }
}

fn session_key(id: &Id) -> String {
    format!("{KEY_PREFIX}{id}")
}

// tower-sessions speaks `time`, the store speaks `chrono`
fn expiry_of(record: &Record) -> DateTime<Utc> {
    let at: OffsetDateTime = record.expiry_date;
    DateTime::from_timestamp(at.unix_timestamp(), at.nanosecond()).unwrap_or_default()
}

#[async_trait]
impl SessionStore for VisitorSessionStore {
    /// Stores a new record, drawing a fresh id while the current one is taken.
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while !self
            .local
            .insert_new(&session_key(&record.id), &*record, Some(expiry_of(record)))
            .await?
        {
            debug!("visitor session id collision, drawing another");
            record.id = Id::default();
        }
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.local
            .set_expiring(&session_key(&record.id), record, expiry_of(record))
            .await?;
        Ok(())
    }

    /// `None` when the session is missing or expired.
    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self.local.get(&session_key(session_id)).await?)
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.local.remove(&session_key(session_id)).await?;
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for VisitorSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        self.local.purge_expired().await?;
        Ok(())
    }
}
