mod common;

use common::{DATE_1, DATE_2, LocalDateHolder, holder_ids, init_tracing, seeded};
use quarry::prelude::*;
use time::macros::date;

fn two_dates() -> InMemoryBackend {
    seeded(&[
        LocalDateHolder::new("id1", DATE_1),
        LocalDateHolder::new("id2", DATE_2),
    ])
}

#[test]
fn empty_store_matches_nothing() {
    init_tracing();
    let backend = InMemoryBackend::new();
    let repo = SyncRepository::<LocalDateHolder>::new(&backend);
    let holder = repo.criteria().clone();

    assert!(holder_ids(&backend, holder.value.is(DATE_1)).is_empty());
    assert!(holder_ids(&backend, holder.value.at_least(DATE_1)).is_empty());
    assert!(holder_ids(&backend, holder.value.between(DATE_1, DATE_1)).is_empty());
    assert_eq!(repo.find_all().count().expect("count"), 0);
}

#[test]
fn ordering_comparisons() {
    init_tracing();
    let backend = two_dates();
    let holder = LocalDateHolder::criteria();

    assert!(holder_ids(&backend, holder.value.greater_than(DATE_2)).is_empty());
    assert_eq!(holder_ids(&backend, holder.value.greater_than(DATE_1)), ["id2"]);
    assert_eq!(
        holder_ids(&backend, holder.value.between(DATE_1, DATE_2)),
        ["id1", "id2"]
    );
    assert!(holder_ids(&backend, holder.value.between(DATE_2, DATE_1)).is_empty());
}

#[test]
fn nullable_attribute_presence() {
    init_tracing();
    let mut second = LocalDateHolder::new("id2", DATE_2);
    second.nullable = Some(DATE_1);
    let backend = seeded(&[LocalDateHolder::new("id1", DATE_2), second]);
    let holder = LocalDateHolder::criteria();

    assert_eq!(holder_ids(&backend, holder.nullable.is_present()), ["id2"]);
    assert_eq!(holder_ids(&backend, holder.nullable.is_absent()), ["id1"]);
    assert_eq!(holder_ids(&backend, holder.nullable.is(DATE_1)), ["id2"]);
}

#[test]
fn optional_attribute_presence() {
    init_tracing();
    let mut second = LocalDateHolder::new("id2", DATE_2);
    second.optional = Some(DATE_1);
    let backend = seeded(&[LocalDateHolder::new("id1", DATE_2), second]);
    let holder = LocalDateHolder::criteria();

    assert_eq!(holder_ids(&backend, holder.optional.is_present()), ["id2"]);
    assert_eq!(holder_ids(&backend, holder.optional.is_absent()), ["id1"]);
    assert_eq!(holder_ids(&backend, holder.optional.is(DATE_1)), ["id2"]);
}

#[test]
fn optional_and_nullable_store_differently() {
    let document = LocalDateHolder::new("id1", DATE_1).to_document();

    assert!(document.get("nullable").is_some_and(Value::is_null));
    assert!(!document.contains_key("optional"));
}

#[test]
fn membership() {
    init_tracing();
    let backend = two_dates();
    let holder = LocalDateHolder::criteria();

    assert_eq!(
        holder_ids(&backend, holder.value.in_([DATE_1, DATE_2])),
        ["id1", "id2"]
    );
    assert!(holder_ids(&backend, holder.value.not_in([DATE_1, DATE_2])).is_empty());
    assert_eq!(
        holder_ids(&backend, holder.value.not_in([date!(2010 - 05 - 02), DATE_2])),
        ["id1"]
    );
}

#[test]
fn one_requires_a_unique_match() {
    init_tracing();
    let backend = two_dates();
    let repo = SyncRepository::<LocalDateHolder>::new(&backend);
    let holder = repo.criteria().clone();
    let both = holder.value.at_least(DATE_1);

    assert!(repo.find(both.clone()).one().is_err_and(|err| err.is_non_unique()));
    assert!(repo.find(both).one_or_none().is_err_and(|err| err.is_non_unique()));
    assert_eq!(
        repo.find(holder.value.greater_than(DATE_2))
            .one_or_none()
            .expect("one_or_none"),
        None
    );
    assert_eq!(
        repo.find(holder.value.is(DATE_2)).one().expect("one").id,
        "id2"
    );
}
