use chrono::Utc;

use super::fixtures::{alice, bob, clean, memory_store};
use crate::accounts::{filter::ListFilter, store::AccountStore};

/// Three records from two creators: Ada (vip), Grace (vip-plus), Linus (untagged).
async fn seeded_store() -> AccountStore {
    let store = memory_store().await;
    let ada = store.insert_one(&alice(), &clean("Ada Lovelace", "5551234567")).await.unwrap();
    let grace = store.insert_one(&alice(), &clean("Grace Hopper", "5559876543")).await.unwrap();
    store.insert_one(&bob(), &clean("Linus Torvalds", "4155550000")).await.unwrap();
    store.update_tag(ada, "vip").await.unwrap();
    store.update_tag(grace, "vip-plus").await.unwrap();
    store
}

#[tokio::test]
async fn integration_list_tag_is_exact_match_not_substring() {
    let store = seeded_store().await;

    let rows = store.list(&ListFilter::default().with_tag("vip"), 2000).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Ada Lovelace");

    // Case-insensitive equality, still never substring.
    let rows = store.list(&ListFilter::default().with_tag("VIP"), 2000).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tag, "vip");

    let rows = store.list(&ListFilter::default().with_tag("vip-plus"), 2000).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Grace Hopper");
}

#[tokio::test]
async fn integration_list_created_by_is_case_insensitive_substring() {
    let store = seeded_store().await;

    let rows = store.list(&ListFilter::default().with_created_by("ALICE"), 2000).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.created_by_email.as_deref() == Some("alice@example.com")));

    let rows = store.list(&ListFilter::default().with_created_by("corp.test"), 2000).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Linus Torvalds");

    let rows = store.list(&ListFilter::default().with_created_by("nobody"), 2000).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn integration_list_q_matches_name_or_phone() {
    let store = seeded_store().await;

    // Case-insensitive name substring.
    let rows = store.list(&ListFilter::default().with_q("ada love"), 2000).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Ada Lovelace");

    // Phone digit substring.
    let rows = store.list(&ListFilter::default().with_q("98765"), 2000).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].phone, "5559876543");

    // Shared phone prefix hits both rows.
    let rows = store.list(&ListFilter::default().with_q("555"), 2000).await.unwrap();
    assert_eq!(rows.len(), 2);

    let rows = store.list(&ListFilter::default().with_q("zzz"), 2000).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn integration_list_date_buckets_by_utc_day() {
    let store = seeded_store().await;
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let rows = store.list(&ListFilter::default().with_date(today), 2000).await.unwrap();
    assert_eq!(rows.len(), 3);

    let rows = store.list(&ListFilter::default().with_date("1999-01-01"), 2000).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn integration_list_conjoins_filters() {
    let store = seeded_store().await;

    let filter = ListFilter::default().with_created_by("alice").with_q("555").with_tag("vip");
    let rows = store.list(&filter, 2000).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Ada Lovelace");
}

#[tokio::test]
async fn integration_list_orders_most_recent_first_and_caps() {
    let store = memory_store().await;
    for i in 0..5 {
        store.insert_one(&alice(), &clean(&format!("Person {i}"), &format!("555000000{i}"))).await.unwrap();
    }

    let rows = store.list(&ListFilter::default(), 2000).await.unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.windows(2).all(|pair| pair[0].id > pair[1].id));
    assert!(rows.windows(2).all(|pair| pair[0].created_at >= pair[1].created_at));

    let rows = store.list(&ListFilter::default(), 3).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].name, "Person 4");
}
