mod common;

use std::collections::HashMap;

use anandwan_outreach::VisitorSessionStore;
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::{ExpiredDeletion, SessionStore};

fn record(expires_in: Duration) -> Record {
    Record {
        id: Id::default(),
        data: HashMap::from([("intake.volunteers".to_string(), json!({ "state": "entry" }))]),
        expiry_date: OffsetDateTime::now_utc() + expires_in,
    }
}

#[tokio::test]
async fn create_then_load_round_trips() {
    let store = VisitorSessionStore::new(common::local_store().await);
    let mut rec = record(Duration::hours(1));

    store.create(&mut rec).await.unwrap();
    let loaded = store.load(&rec.id).await.unwrap().expect("session present");

    assert_eq!(loaded.id, rec.id);
    assert_eq!(loaded.data, rec.data);
}

#[tokio::test]
async fn create_draws_a_new_id_when_taken() {
    let store = VisitorSessionStore::new(common::local_store().await);
    let mut first = record(Duration::hours(1));
    store.create(&mut first).await.unwrap();

    let mut second = record(Duration::hours(1));
    second.id = first.id;
    second.data.insert("marker".into(), json!("second"));
    store.create(&mut second).await.unwrap();

    assert_ne!(second.id, first.id);
    let kept = store.load(&first.id).await.unwrap().unwrap();
    assert!(!kept.data.contains_key("marker"));
    assert!(store.load(&second.id).await.unwrap().is_some());
}

#[tokio::test]
async fn save_overwrites_existing_data() {
    let store = VisitorSessionStore::new(common::local_store().await);
    let mut rec = record(Duration::hours(1));
    store.create(&mut rec).await.unwrap();

    rec.data.insert("publish.artifact".into(), json!({ "title": "Clinic Hours" }));
    store.save(&rec).await.unwrap();

    let loaded = store.load(&rec.id).await.unwrap().unwrap();
    assert_eq!(loaded.data.len(), 2);
}

#[tokio::test]
async fn expired_sessions_are_invisible_and_purged() {
    let local = common::local_store().await;
    let store = VisitorSessionStore::new(local.clone());
    let mut stale = record(-Duration::minutes(5));
    let mut fresh = record(Duration::hours(1));
    store.create(&mut stale).await.unwrap();
    store.create(&mut fresh).await.unwrap();

    assert!(store.load(&stale.id).await.unwrap().is_none());

    store.delete_expired().await.unwrap();
    assert_eq!(local.purge_expired().await.unwrap(), 0);
    assert!(store.load(&fresh.id).await.unwrap().is_some());
}

#[tokio::test]
async fn sessions_share_the_store_without_touching_other_keys() {
    let local = common::local_store().await;
    local.set("volunteers", &Vec::<u8>::new()).await.unwrap();
    let store = VisitorSessionStore::new(local.clone());

    let mut stale = record(-Duration::minutes(5));
    store.create(&mut stale).await.unwrap();
    store.delete_expired().await.unwrap();

    let kept: Option<Vec<u8>> = local.get("volunteers").await.unwrap();
    assert_eq!(kept, Some(Vec::new()));
}

#[tokio::test]
async fn delete_removes_the_session() {
    let store = VisitorSessionStore::new(common::local_store().await);
    let mut rec = record(Duration::hours(1));
    store.create(&mut rec).await.unwrap();

    store.delete(&rec.id).await.unwrap();
    assert!(store.load(&rec.id).await.unwrap().is_none());
    // Deleting again is fine
    store.delete(&rec.id).await.unwrap();
}
