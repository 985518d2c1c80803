#![allow(dead_code)]

use quarry::prelude::*;
use time::{Date, macros::date};

///
/// LocalDateHolder
///

#[derive(Clone, Debug, PartialEq, Record)]
pub struct LocalDateHolder {
    #[record(id)]
    pub id: String,
    pub value: Date,
    #[record(nullable)]
    pub nullable: Option<Date>,
    pub optional: Option<Date>,
}

impl LocalDateHolder {
    pub fn new(id: &str, value: Date) -> Self {
        Self {
            id: id.to_string(),
            value,
            nullable: None,
            optional: None,
        }
    }
}

///
/// Item
///

#[derive(Clone, Debug, PartialEq, Record)]
#[record(name = "Item", rename_all = "camelCase")]
pub struct Item {
    #[record(id)]
    pub id: u64,
    pub size: u32,
    pub label: String,
    pub weight: Option<i64>,
}

pub const DATE_1: Date = date!(2010 - 05 - 01);
pub const DATE_2: Date = date!(2010 - 10 - 02);

/// Route `RUST_LOG` output through the test harness; repeated calls are fine.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Backend holding `records` for their record type.
pub fn seeded<T: Record>(records: &[T]) -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    if let Err(err) = SyncRepository::<T>::new(&backend).insert_all(records) {
        panic!("seeding {} failed: {err}", T::model().name);
    }

    backend
}

/// Identities of every holder matching `criterion`, sorted.
pub fn holder_ids(backend: &InMemoryBackend, criterion: Criterion<LocalDateHolder>) -> Vec<String> {
    let mut ids: Vec<String> = SyncRepository::<LocalDateHolder>::new(backend)
        .find(criterion)
        .fetch()
        .expect("fetch")
        .into_iter()
        .map(|holder| holder.id)
        .collect();
    ids.sort();

    ids
}
