mod common;

use common::{Item, init_tracing, seeded};
use futures::{StreamExt, TryStreamExt, poll};
use quarry::{memory::MemoryConfig, prelude::*};
use std::time::Duration;

fn items() -> Vec<Item> {
    (1..=6_u64)
        .map(|id| Item {
            id,
            size: u32::try_from(id % 3).unwrap_or_default(),
            label: format!("item-{id}"),
            weight: (id % 2 == 0).then_some(i64::try_from(id).unwrap_or_default()),
        })
        .collect()
}

#[tokio::test]
async fn every_discipline_sees_the_same_sequence() {
    init_tracing();
    let backend = seeded(&items());
    let sync = SyncRepository::<Item>::new(&backend);
    let future = AsyncRepository::<Item>::new(&backend);
    let reactive = ReactiveRepository::<Item>::new(&backend);
    let item = sync.criteria().clone();
    let criterion = item.size.at_least(1_u32);
    let order = || item.size.desc();

    let expected = sync.find(criterion.clone()).order_by(order()).fetch().expect("sync");
    let awaited = future
        .find(criterion.clone())
        .order_by(order())
        .fetch()
        .await
        .expect("async");
    let streamed: Vec<Item> = reactive
        .find(criterion)
        .order_by(order())
        .fetch()
        .try_collect()
        .await
        .expect("reactive");

    assert_eq!(expected.len(), 4);
    assert_eq!(expected, awaited);
    assert_eq!(expected, streamed);
}

#[tokio::test]
async fn cardinality_terminals_agree_across_disciplines() {
    let backend = seeded(&items());
    let sync = SyncRepository::<Item>::new(&backend);
    let future = AsyncRepository::<Item>::new(&backend);
    let item = sync.criteria().clone();

    assert_eq!(
        sync.find(item.weight.is_present()).count().expect("count"),
        future.find(item.weight.is_present()).count().await.expect("count")
    );
    assert_eq!(
        sync.find(item.id.is(2_u64)).one().expect("one"),
        future.find(item.id.is(2_u64)).one().await.expect("one")
    );
    assert!(
        future
            .find(item.size.is(0_u32))
            .one()
            .await
            .is_err_and(|err| err.is_non_unique())
    );
}

#[tokio::test]
async fn cancelled_async_fetch_is_interrupted() {
    let backend = seeded(&items());
    let repo = AsyncRepository::<Item>::new(&backend);

    let promise = repo.find_all().fetch();
    promise.cancel();

    assert!(matches!(promise.await, Err(Error::Interrupted)));
}

#[tokio::test]
async fn interrupt_stops_a_reactive_stream() {
    let backend = seeded(&items());
    let repo = ReactiveRepository::<Item>::new(&backend);
    let interrupt = Interrupt::new();

    let mut rows = repo.find_all().interruptible(&interrupt).fetch();
    let first = rows.next().await.expect("row").expect("ok");
    assert_eq!(first.id, 1);

    interrupt.trigger();
    assert!(matches!(rows.next().await, Some(Err(Error::Interrupted))));
    assert!(rows.next().await.is_none());
}

#[test]
fn zero_timeout_always_expires() {
    let backend = seeded(&items());
    let repo = SyncRepository::<Item>::new(&backend);

    let result = repo.find_all().timeout(Duration::ZERO).fetch();

    assert!(matches!(result, Err(Error::Timeout(_))));
}

#[test]
fn configured_default_timeout_applies() {
    let config = MemoryConfig::from_toml_str("default_timeout_ms = 0").expect("config");
    let backend = InMemoryBackend::with_config(config);
    let repo = SyncRepository::<Item>::new(&backend);

    assert!(matches!(repo.find_all().fetch(), Err(Error::Timeout(_))));
}

#[tokio::test]
async fn watch_follows_the_match_set() {
    init_tracing();
    let backend = seeded(&items());
    let sync = SyncRepository::<Item>::new(&backend);
    let reactive = ReactiveRepository::<Item>::new(&backend);
    let item = sync.criteria().clone();

    let mut events = reactive.watch(item.label.starts_with("new"));
    assert!(poll!(events.next()).is_pending());

    let fresh = Item {
        id: 10,
        size: 7,
        label: "new-10".to_string(),
        weight: None,
    };
    sync.insert(&fresh).expect("insert");
    sync.delete(item.id.is(1_u64)).expect("delete");
    sync.delete(item.id.is(10_u64)).expect("delete");

    let inserted = events.next().await.expect("event").expect("ok");
    assert_eq!(inserted.kind, ChangeKind::Insert);
    assert_eq!(inserted.new_value, Some(fresh.clone()));

    let deleted = events.next().await.expect("event").expect("ok");
    assert_eq!(deleted.kind, ChangeKind::Delete);
    assert_eq!(deleted.old_value, Some(fresh));

    drop(events);
    assert_eq!(sync.find_all().count().expect("count"), 5);
}

#[test]
fn facade_reports_its_version() {
    assert!(!quarry::VERSION.is_empty());
}
