#![allow(dead_code)]

use anandwan_outreach::migration::{Migrator, MigratorTrait};
use anandwan_outreach::{Credentials, LocalStore, SessionGate, SubmissionStore};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh, migrated in-memory database. A single connection keeps every
/// query on the same in-memory file.
pub async fn memory_db() -> DatabaseConnection {
    connect("sqlite::memory:").await
}

pub async fn connect(url: &str) -> DatabaseConnection {
    connect_pooled(url, 1).await
}

pub async fn connect_pooled(url: &str, max_connections: u32) -> DatabaseConnection {
    let mut opt = ConnectOptions::new(url.to_string());
    opt.max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(opt).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn local_store() -> LocalStore {
    LocalStore::new(memory_db().await)
}

pub async fn submission_store() -> (SubmissionStore, LocalStore) {
    let local = local_store().await;
    (SubmissionStore::new(local.clone()), local)
}

pub async fn gate(local: &LocalStore) -> SessionGate {
    SessionGate::restore(local.clone(), Credentials::default())
        .await
        .expect("restore gate")
}

pub const VALID_CONTENT: &str =
    "The clinic is open from 9am to 5pm, Monday to Saturday, near the main gate.";
