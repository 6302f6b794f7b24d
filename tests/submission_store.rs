mod common;

use anandwan_outreach::{Partition, SubmissionRecord};
use chrono::{TimeZone, Utc};
use serde_json::{json, Map, Value};

fn fields(name: &str) -> Map<String, Value> {
    let Value::Object(map) = json!({ "name": name }) else {
        unreachable!()
    };
    map
}

async fn stored(local: &anandwan_outreach::LocalStore, partition: Partition) -> Vec<SubmissionRecord> {
    local
        .get(partition.key())
        .await
        .unwrap()
        .unwrap_or_default()
}

#[tokio::test]
async fn append_creates_partition_and_preserves_order() {
    let (store, local) = common::submission_store().await;

    let first = store
        .append(Partition::Volunteers, SubmissionRecord::new(fields("Asha"), Utc::now()))
        .await
        .unwrap();
    let second = store
        .append(Partition::Volunteers, SubmissionRecord::new(fields("Ravi"), Utc::now()))
        .await
        .unwrap();

    let records = stored(&local, Partition::Volunteers).await;
    assert_eq!(records, vec![first.clone(), second.clone()]);
    assert!(second.id > first.id);
}

#[tokio::test]
async fn colliding_ids_are_restamped_not_reused() {
    let (store, local) = common::submission_store().await;
    let instant = Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap();

    let a = store
        .append(Partition::Contacts, SubmissionRecord::new(fields("a"), instant))
        .await
        .unwrap();
    let b = store
        .append(Partition::Contacts, SubmissionRecord::new(fields("b"), instant))
        .await
        .unwrap();
    let earlier = instant - chrono::Duration::seconds(5);
    let c = store
        .append(Partition::Contacts, SubmissionRecord::new(fields("c"), earlier))
        .await
        .unwrap();

    assert_eq!(a.id, instant.timestamp_micros());
    assert_eq!(b.id, a.id + 1);
    assert_eq!(c.id, b.id + 1);
    assert_eq!(c.submitted_at, earlier);

    let ids: Vec<_> = stored(&local, Partition::Contacts).await.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn partitions_are_independent() {
    let (store, local) = common::submission_store().await;

    store
        .append(Partition::Donations, SubmissionRecord::new(fields("d"), Utc::now()))
        .await
        .unwrap();

    assert_eq!(stored(&local, Partition::Donations).await.len(), 1);
    assert!(stored(&local, Partition::Volunteers).await.is_empty());
    assert!(stored(&local, Partition::Contacts).await.is_empty());
}

#[tokio::test]
async fn records_survive_reconnecting_to_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("site.db").display());

    {
        let local = anandwan_outreach::LocalStore::new(common::connect(&url).await);
        let store = anandwan_outreach::SubmissionStore::new(local);
        store
            .append(Partition::Volunteers, SubmissionRecord::new(fields("kept"), Utc::now()))
            .await
            .unwrap();
    }

    let local = anandwan_outreach::LocalStore::new(common::connect(&url).await);
    let records = stored(&local, Partition::Volunteers).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fields["name"], json!("kept"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_all_land_with_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("site.db").display());
    let local = anandwan_outreach::LocalStore::new(common::connect_pooled(&url, 5).await);
    let store = anandwan_outreach::SubmissionStore::new(local.clone());

    let handles: Vec<_> = (0..20)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .append(
                        Partition::Volunteers,
                        SubmissionRecord::new(fields(&format!("visitor-{n}")), Utc::now()),
                    )
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let records = stored(&local, Partition::Volunteers).await;
    assert_eq!(records.len(), 20);
    assert!(records.windows(2).all(|pair| pair[0].id < pair[1].id));

    let mut names: Vec<_> = records
        .iter()
        .map(|r| r.fields["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 20);
}
