use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::storage::LocalStore;

/// Named sequence of submissions inside the durable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Volunteers,
    Donations,
    Contacts,
}

impl Partition {
    /// Durable key the partition is stored under.
    pub fn key(self) -> &'static str {
        match self {
            Partition::Volunteers => "volunteers",
            Partition::Donations => "donations",
            Partition::Contacts => "contacts",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One completed form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: i64,
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Stamps `fields` with `submitted_at` and an id taken from the same
    /// instant in microseconds.
    pub fn new(fields: serde_json::Map<String, serde_json::Value>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: submitted_at.timestamp_micros(),
            fields,
            submitted_at,
        }
    }
}

/// Append-only log of form submissions, one sequence per [`Partition`].
///
/// There is no read, update or delete here: from the site's
/// point of view the log is write-only.
#[derive(Debug, Clone)]
pub struct SubmissionStore {
    local: LocalStore,
}

impl SubmissionStore {
    pub fn new(local: LocalStore) -> Self {
        Self { local }
    }

    /// Appends `record` to the end of `partition` and returns what was stored.
    ///
    /// Ids are strictly increasing within a partition. A record whose id is
    /// not greater than the last stored id is re-stamped to `last + 1`
    /// before it is written, so ids are never reused.
    pub async fn append(&self, partition: Partition, record: SubmissionRecord) -> Result<SubmissionRecord> {
        let stored = self
            .local
            .update(partition.key(), move |existing: Option<Vec<SubmissionRecord>>| {
                let mut records = existing.unwrap_or_default();
                let mut record = record;
                if let Some(last) = records.last() {
                    if record.id <= last.id {
                        record.id = last.id + 1;
                    }
                }
                records.push(record.clone());
                (records, record)
            })
            .await?;

        info!(partition = %partition, id = stored.id, "submission recorded");
        Ok(stored)
    }
}
