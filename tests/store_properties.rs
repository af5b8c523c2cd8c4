//! Property tests for identity and merge rules, run against both backends.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use eblotter::domain::entities::{
    Broker, BrokerDraft, Deal, DealDraft, DealPatch, Record,
};
use eblotter::domain::value_objects::Timestamp;
use eblotter::infrastructure::persistence::{
    JsonFileStore, RecordStore, Repository, SqliteStore,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_opt_string() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-z ]{0,12}")
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// A patch field: absent, explicit null, or a value.
fn arb_slot<T: std::fmt::Debug + Clone + 'static>(
    value: impl Strategy<Value = T> + 'static,
) -> impl Strategy<Value = Option<Option<T>>> {
    prop_oneof![
        Just(None),
        Just(Some(None)),
        value.prop_map(|v| Some(Some(v))),
    ]
}

fn arb_deal_patch() -> impl Strategy<Value = DealPatch> {
    (
        proptest::option::of("[A-Za-z]{1,10}"),
        arb_slot("[A-Za-z ]{0,12}"),
        arb_slot(0.0f64..1e9),
        arb_slot("(Active|Pending|Completed)"),
        arb_slot(arb_date()),
        arb_slot(arb_date()),
        arb_slot("[A-Za-z ]{0,12}"),
    )
        .prop_map(
            |(deal_name, client, amount, status, start_date, end_date, owner)| DealPatch {
                deal_name,
                client,
                amount,
                status,
                start_date,
                end_date,
                owner,
            },
        )
}

fn arb_deal() -> impl Strategy<Value = Deal> {
    (
        "DD[0-9]{3}",
        "[A-Za-z]{1,10}",
        arb_opt_string(),
        proptest::option::of(0.0f64..1e9),
        arb_opt_string(),
    )
        .prop_map(|(deal_id, deal_name, client, amount, owner)| {
            let mut draft = DealDraft::new(deal_id, deal_name);
            draft.client = client;
            draft.amount = amount;
            draft.owner = owner;
            Deal::create(1, draft, Timestamp::now())
        })
}

fn expected<T: Clone>(before: &T, slot: &Option<T>) -> T {
    slot.clone().unwrap_or_else(|| before.clone())
}

proptest! {
    #[test]
    fn merge_overwrites_exactly_the_present_fields(
        deal in arb_deal(),
        patch in arb_deal_patch(),
    ) {
        let mut merged = deal.clone();
        merged.apply_update(patch.clone());

        prop_assert_eq!(merged.id, deal.id);
        prop_assert_eq!(&merged.deal_id, &deal.deal_id);
        prop_assert_eq!(merged.audit.created_at, deal.audit.created_at);
        prop_assert!(merged.audit.updated_at.is_after(&deal.audit.updated_at));

        prop_assert_eq!(&merged.deal_name, &expected(&deal.deal_name, &patch.deal_name));
        prop_assert_eq!(&merged.client, &expected(&deal.client, &patch.client));
        prop_assert_eq!(merged.amount, expected(&deal.amount, &patch.amount));
        prop_assert_eq!(&merged.status, &expected(&deal.status, &patch.status));
        prop_assert_eq!(merged.start_date, expected(&deal.start_date, &patch.start_date));
        prop_assert_eq!(merged.end_date, expected(&deal.end_date, &patch.end_date));
        prop_assert_eq!(&merged.owner, &expected(&deal.owner, &patch.owner));
    }
}

/// A sequence of creates (true) and deletes of the newest record (false).
fn arb_ops() -> impl Strategy<Value = Vec<bool>> {
    proptest::collection::vec(proptest::bool::weighted(0.7), 1..24)
}

async fn check_monotonic_ids(store: &dyn RecordStore, ops: &[bool]) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    let mut highest = 0;
    let mut live: Vec<String> = Vec::new();

    for (n, create) in ops.iter().enumerate() {
        if *create || live.is_empty() {
            let key = format!("BRK{n:03}");
            let broker =
                Repository::<Broker>::create(store, BrokerDraft::new(key.clone(), "Broker", None))
                    .await
                    .unwrap();
            prop_assert!(seen.insert(broker.id), "id {} reused", broker.id);
            prop_assert!(broker.id > highest);
            highest = broker.id;
            live.push(key);
        } else if let Some(key) = live.pop() {
            prop_assert!(Repository::<Broker>::delete(store, &key).await.unwrap());
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn json_ids_strictly_increase_across_deletes(ops in arb_ops()) {
        let dir = tempfile::tempdir().unwrap();
        tokio_test::block_on(async {
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            check_monotonic_ids(&store, &ops).await
        })?;
    }

    #[test]
    fn sqlite_ids_strictly_increase_across_deletes(ops in arb_ops()) {
        tokio_test::block_on(async {
            let store = SqliteStore::connect("sqlite::memory:", 1).await.unwrap();
            check_monotonic_ids(&store, &ops).await
        })?;
    }

    #[test]
    fn duplicate_create_leaves_collection_unchanged(name in "[A-Za-z]{1,10}") {
        let dir = tempfile::tempdir().unwrap();
        tokio_test::block_on(async {
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            Repository::<Deal>::create(&store, DealDraft::new("DD1", "First"))
                .await
                .unwrap();
            let path = dir.path().join("deals.json");
            let before = std::fs::read(&path).unwrap();

            let err = Repository::<Deal>::create(&store, DealDraft::new("DD1", name))
                .await
                .unwrap_err();
            prop_assert!(err.is_duplicate());
            prop_assert_eq!(std::fs::read(&path).unwrap(), before);
            prop_assert_eq!(Repository::<Deal>::count(&store).await.unwrap(), 1);
            Ok(())
        })?;
    }
}
