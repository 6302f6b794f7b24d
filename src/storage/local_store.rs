use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::entity::kv_entry::{self, ActiveModel as KvActiveModel, Entity as KvEntity};
use crate::error::{Error, Result};

/// A durable key-value store over a Sea-ORM connection.
///
/// This is the server-side stand-in for the browser's local storage: one
/// row per logical key, values encoded with MessagePack. An entry may carry
/// an expiry, after which it reads as absent until [`purge_expired`]
/// removes it.
///
/// Clones share one write lock. Every write made through a store or its
/// clones is serialized, so read-modify-write cycles never interleave and
/// SQLite never sees two writers racing for the database lock. Build one
/// store per database and clone it.
///
/// # Error Handling
///
/// - Database errors → [`Error::Storage`]
/// - Encoding and decoding errors → [`Error::Storage`]
///
/// [`purge_expired`]: LocalStore::purge_expired
#[derive(Debug, Clone)]
pub struct LocalStore {
    conn: DatabaseConnection,
    writes: Arc<Mutex<()>>,
}

impl LocalStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Reads and decodes the value under `key`, `None` when absent or expired.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        read_value(&self.conn, key, false).await
    }

    /// Encodes `value` and writes it under `key`, replacing any prior value.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let _write = self.writes.lock().await;
        write_value(&self.conn, key, value, None).await
    }

    /// Like [`set`](LocalStore::set), but the entry expires at `expires_at`.
    pub async fn set_expiring<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let _write = self.writes.lock().await;
        write_value(&self.conn, key, value, Some(expires_at.into())).await
    }

    /// Writes `value` only if `key` is not already taken.
    ///
    /// Returns `false`, leaving the stored entry alone, when the key exists.
    pub async fn insert_new<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let _write = self.writes.lock().await;

        let entry = new_entry(key, encode(key, value)?, expires_at.map(Into::into));
        let inserted = KvEntity::insert(entry)
            .on_conflict(
                OnConflict::column(kv_entry::Column::Key)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await;

        match inserted {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes `key`. Removing an absent key is not an error.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let _write = self.writes.lock().await;
        KvEntity::delete_by_id(key.to_string())
            .exec(&self.conn)
            .await?;
        debug!(key, "removed durable key");
        Ok(())
    }

    /// Read-modify-write of `key`.
    ///
    /// `update` receives the current value (or `None`) and returns the new
    /// value plus whatever the caller wants back out of the closure. The
    /// cycle holds the store's write lock and runs in one transaction; on
    /// Postgres the row is also locked `FOR UPDATE` against other processes.
    pub async fn update<T, R, F>(&self, key: &str, update: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> (T, R),
    {
        let _write = self.writes.lock().await;
        let txn = self.conn.begin().await?;

        let current = read_value(&txn, key, true).await?;
        let (next, out) = update(current);
        write_value(&txn, key, &next, None).await?;

        txn.commit().await?;
        Ok(out)
    }

    /// Deletes every entry whose expiry has passed. Returns how many went.
    pub async fn purge_expired(&self) -> Result<u64> {
        let _write = self.writes.lock().await;
        let now: DateTimeWithTimeZone = Utc::now().into();

        let result = KvEntity::delete_many()
            .filter(kv_entry::Column::ExpiresAt.lt(now))
            .exec(&self.conn)
            .await?;
        if result.rows_affected > 0 {
            debug!(purged = result.rows_affected, "purged expired durable keys");
        }
        Ok(result.rows_affected)
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(|e| Error::Storage(format!("encode {key}: {e}")))
}

fn new_entry(key: &str, value: Vec<u8>, expires_at: Option<DateTimeWithTimeZone>) -> KvActiveModel {
    KvActiveModel {
        key: Set(key.to_string()),
        value: Set(value),
        updated_at: Set(Utc::now().into()),
        expires_at: Set(expires_at),
    }
}

async fn read_value<C, T>(conn: &C, key: &str, for_update: bool) -> Result<Option<T>>
where
    C: ConnectionTrait,
    T: DeserializeOwned,
{
    let mut select = KvEntity::find_by_id(key.to_string());
    // SQLite has no row locks; the write lock covers it
    if for_update && conn.get_database_backend() == DbBackend::Postgres {
        select = select.lock_exclusive();
    }

    let Some(model) = select.one(conn).await? else {
        return Ok(None);
    };
    if !model.is_live(Utc::now().into()) {
        return Ok(None);
    }

    let value = rmp_serde::from_slice(&model.value)
        .map_err(|e| Error::Storage(format!("decode {key}: {e}")))?;
    Ok(Some(value))
}

async fn write_value<C, T>(
    conn: &C,
    key: &str,
    value: &T,
    expires_at: Option<DateTimeWithTimeZone>,
) -> Result<()>
where
    C: ConnectionTrait,
    T: Serialize,
{
    let entry = new_entry(key, encode(key, value)?, expires_at);

    KvEntity::insert(entry)
        .on_conflict(
            OnConflict::column(kv_entry::Column::Key)
                .update_columns([
                    kv_entry::Column::Value,
                    kv_entry::Column::UpdatedAt,
                    kv_entry::Column::ExpiresAt,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await?;

    debug!(key, "wrote durable key");
    Ok(())
}
