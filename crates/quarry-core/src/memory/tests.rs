use super::{ConfigError, InMemoryBackend, MemoryConfig};
use crate::{
    Error,
    backend::{Backend, BackendCategory, ChangeKind, Operation},
    criteria::Criterion,
    query::Query,
    repository::{ReactiveRepository, SyncRepository},
    test_fixtures::{D1, D2, LocalDateHolder, Person, people_backend, person, seeded},
    traits::Record,
};
use futures::{StreamExt, poll};
use regex::Regex;
use std::time::Duration;

fn holders() -> Vec<LocalDateHolder> {
    let first = LocalDateHolder::new("h1", D1);

    let mut second = LocalDateHolder::new("h2", D2);
    second.nullable = Some(D1);
    second.optional = Some(D2);
    second.list = vec![D1, D2];

    vec![first, second]
}

fn holder_ids(backend: &InMemoryBackend, criterion: Criterion<LocalDateHolder>) -> Vec<String> {
    SyncRepository::<LocalDateHolder>::new(backend)
        .find(criterion)
        .fetch()
        .expect("fetch")
        .into_iter()
        .map(|holder| holder.id)
        .collect()
}

fn person_names(backend: &InMemoryBackend, criterion: Criterion<Person>) -> Vec<String> {
    SyncRepository::<Person>::new(backend)
        .find(criterion)
        .fetch()
        .expect("fetch")
        .into_iter()
        .map(|person| person.first_name)
        .collect()
}

// ---------------------------------------------------------------------------
// presence and nulls
// ---------------------------------------------------------------------------

#[test]
fn nullable_presence_tests_stored_null() {
    let backend = seeded(&holders());
    let holder = LocalDateHolder::criteria();

    assert_eq!(holder_ids(&backend, holder.nullable.is_absent()), ["h1"]);
    assert_eq!(holder_ids(&backend, holder.nullable.is_present()), ["h2"]);
}

#[test]
fn optional_presence_tests_absence() {
    let backend = seeded(&holders());
    let holder = LocalDateHolder::criteria();

    assert_eq!(holder_ids(&backend, holder.optional.is_absent()), ["h1"]);
    assert_eq!(holder_ids(&backend, holder.optional.is_present()), ["h2"]);
}

#[test]
fn comparisons_with_null_or_absent_are_false() {
    let backend = seeded(&holders());
    let holder = LocalDateHolder::criteria();

    assert_eq!(holder_ids(&backend, holder.nullable.is_not(D2)), ["h2"]);
    assert_eq!(holder_ids(&backend, holder.optional.is_not(D1)), ["h2"]);
    assert!(holder_ids(&backend, holder.optional.less_than(D2)).is_empty());
    assert_eq!(
        holder_ids(&backend, holder.optional.less_than(D2).not()),
        ["h1", "h2"]
    );
}

#[test]
fn nulls_sort_smallest_by_default() {
    let backend = seeded(&holders());
    let repo = SyncRepository::<LocalDateHolder>::new(&backend);
    let holder = repo.criteria().clone();
    let ids = |key| -> Vec<String> {
        repo.find_all()
            .order_by(key)
            .fetch()
            .expect("fetch")
            .into_iter()
            .map(|h| h.id)
            .collect()
    };

    assert_eq!(ids(holder.nullable.asc()), ["h1", "h2"]);
    assert_eq!(ids(holder.nullable.desc()), ["h2", "h1"]);
    assert_eq!(ids(holder.optional.desc().nulls_first()), ["h1", "h2"]);
    assert_eq!(ids(holder.optional.asc().nulls_last()), ["h2", "h1"]);
}

// ---------------------------------------------------------------------------
// collections
// ---------------------------------------------------------------------------

#[test]
fn collection_quantifiers() {
    let backend = seeded(&holders());
    let holder = LocalDateHolder::criteria();

    assert_eq!(holder_ids(&backend, holder.list.contains(D2)), ["h2"]);
    assert_eq!(
        holder_ids(&backend, holder.list.all(|date| date.at_least(D1))),
        ["h1", "h2"]
    );
    assert_eq!(holder_ids(&backend, holder.list.any(|date| date.is(D2))), ["h2"]);
    assert_eq!(holder_ids(&backend, holder.list.none(|date| date.is(D1))), ["h1"]);
    assert_eq!(holder_ids(&backend, holder.list.has_size(2)), ["h2"]);
}

#[test]
fn indexed_paths_miss_quietly() {
    let backend = seeded(&holders());
    let holder = LocalDateHolder::criteria();

    assert_eq!(holder_ids(&backend, holder.list.at(1).is(D2)), ["h2"]);
    assert!(holder_ids(&backend, holder.list.at(5).is(D2)).is_empty());
}

#[test]
fn nested_record_lists() {
    let backend = people_backend();
    let person = Person::criteria();

    assert_eq!(
        person_names(&backend, person.previous.any(|a| a.city.starts_with("New"))),
        ["Grace"]
    );
    assert_eq!(
        person_names(&backend, person.previous.is_empty()),
        ["Ada", "Edsger", "Barbara"]
    );
}

// ---------------------------------------------------------------------------
// text and membership
// ---------------------------------------------------------------------------

#[test]
fn text_operators() {
    let backend = people_backend();
    let person = Person::criteria();
    let starts_with_a = Regex::new("^A").expect("valid pattern");

    assert_eq!(person_names(&backend, person.first_name.to_upper().is("ADA")), ["Ada"]);
    assert_eq!(
        person_names(&backend, person.first_name.matches(&starts_with_a)),
        ["Ada", "Alan"]
    );
    assert_eq!(person_names(&backend, person.first_name.has_length(4)), ["Alan"]);
    assert_eq!(
        person_names(&backend, person.first_name.contains("ar")),
        ["Barbara"]
    );
    assert_eq!(
        person_names(&backend, person.first_name.to_lower().ends_with("ce")),
        ["Grace"]
    );
}

#[test]
fn case_folded_sort_keys() {
    let backend = seeded(&[
        person(1, "ada", 30, "X"),
        person(2, "Bob", 30, "X"),
        person(3, "carl", 30, "X"),
    ]);
    let repo = SyncRepository::<Person>::new(&backend);
    let fields = repo.criteria().clone();
    let names = |key| -> Vec<String> {
        repo.find_all()
            .order_by(key)
            .fetch()
            .expect("fetch")
            .into_iter()
            .map(|p| p.first_name)
            .collect()
    };

    assert_eq!(names(fields.first_name.asc()), ["Bob", "ada", "carl"]);
    assert_eq!(names(fields.first_name.to_upper().asc()), ["ada", "Bob", "carl"]);
    assert_eq!(names(fields.first_name.to_lower().desc()), ["carl", "Bob", "ada"]);
}

#[test]
fn membership_skips_absent_targets() {
    let backend = people_backend();
    let person = Person::criteria();

    assert_eq!(
        person_names(&backend, person.first_name.in_(["Ada", "Zed"])),
        ["Ada"]
    );
    assert_eq!(
        person_names(&backend, person.nickname.not_in(["amazing"])),
        ["Ada"]
    );
    assert_eq!(
        person_names(&backend, person.nickname.is("amazing").not()),
        ["Ada", "Alan", "Edsger", "Barbara"]
    );
}

// ---------------------------------------------------------------------------
// projection, grouping, aggregates
// ---------------------------------------------------------------------------

#[test]
fn distinct_projection_keeps_first_occurrence() {
    let backend = people_backend();
    let repo = SyncRepository::<Person>::new(&backend);
    let person = repo.criteria().clone();

    let cities = repo
        .find_all()
        .select((person.address.city.clone(),))
        .distinct()
        .fetch()
        .expect("fetch");

    assert_eq!(
        cities,
        vec![
            ("London".to_string(),),
            ("Arlington".to_string(),),
            ("Austin".to_string(),),
        ]
    );
}

#[test]
fn global_aggregates_fold_every_match() {
    let backend = people_backend();
    let repo = SyncRepository::<Person>::new(&backend);
    let person = repo.criteria().clone();

    let row = repo
        .find_all()
        .select((person.score.sum(), person.age.avg(), person.age.min()))
        .one()
        .expect("one");

    assert_eq!(row, (Some(248), Some(52.8), Some(30)));
}

#[test]
fn aggregates_over_nothing_are_empty() {
    let backend = people_backend();
    let repo = SyncRepository::<Person>::new(&backend);
    let person = repo.criteria().clone();

    let row = repo
        .find(person.age.greater_than(200_u32))
        .select((person.age.count(), person.age.max()))
        .one()
        .expect("one");

    assert_eq!(row, (0, None));
}

#[test]
fn sum_overflow_is_a_constraint_error() {
    let mut first = person(1, "Max", 1, "Nowhere");
    first.score = i64::MAX;
    let mut second = person(2, "Maxine", 1, "Nowhere");
    second.score = 1;
    let backend = seeded(&[first, second]);
    let repo = SyncRepository::<Person>::new(&backend);

    let err = repo
        .find_all()
        .select((repo.criteria().score.sum(),))
        .fetch()
        .unwrap_err();

    assert_eq!(err.backend_category(), Some(BackendCategory::Constraint));
}

#[test]
fn count_applies_after_paging() {
    let backend = people_backend();
    let repo = SyncRepository::<Person>::new(&backend);

    assert_eq!(repo.find_all().count().expect("count"), 5);
    assert_eq!(repo.find_all().offset(3).count().expect("count"), 2);
    assert_eq!(repo.find_all().limit(1).count().expect("count"), 1);
}

// ---------------------------------------------------------------------------
// deadlines and config
// ---------------------------------------------------------------------------

#[test]
fn zero_timeout_always_times_out() {
    let backend = people_backend();
    let repo = SyncRepository::<Person>::new(&backend);

    let result = repo.find_all().timeout(Duration::ZERO).fetch();

    assert!(matches!(result, Err(Error::Timeout(budget)) if budget == Duration::ZERO));
}

#[test]
fn config_timeout_applies_to_untimed_queries() {
    let config = MemoryConfig {
        default_timeout_ms: Some(0),
        ..MemoryConfig::default()
    };
    let backend = InMemoryBackend::with_config(config);
    let repo = SyncRepository::<Person>::new(&backend);

    assert!(matches!(repo.find_all().fetch(), Err(Error::Timeout(_))));
    assert!(
        repo.find_all()
            .timeout(Duration::from_secs(60))
            .fetch()
            .is_ok()
    );
}

#[test]
fn config_parses_from_toml() {
    let config = MemoryConfig::from_toml_str("watch_capacity = 8\ndefault_timeout_ms = 250\n")
        .expect("valid config");

    assert_eq!(config.watch_capacity, 8);
    assert_eq!(config.default_timeout(), Some(Duration::from_millis(250)));
    assert!(!config.debug);
    assert_eq!(
        MemoryConfig::from_toml_str("").expect("empty config"),
        MemoryConfig::default()
    );
}

#[test]
fn config_rejects_bad_input() {
    assert!(matches!(
        MemoryConfig::from_toml_str("watch_capacity = 0"),
        Err(ConfigError::ZeroCapacity)
    ));
    assert!(matches!(
        MemoryConfig::from_toml_str("colour = \"blue\""),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn clones_share_collections() {
    let backend = people_backend();
    let clone = backend.clone();

    SyncRepository::<Person>::new(&clone)
        .insert(&person(6, "Tim", 60, "Geneva"))
        .expect("insert");

    assert_eq!(backend.stored(Person::model()), 6);
}

// ---------------------------------------------------------------------------
// watch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn watch_streams_matching_changes() {
    let backend = people_backend();
    let sync = SyncRepository::<Person>::new(&backend);
    let reactive = ReactiveRepository::<Person>::new(&backend);
    let fields = sync.criteria().clone();

    let mut events = reactive.watch(fields.address.city.is("London"));
    assert!(poll!(events.next()).is_pending());

    sync.insert(&person(6, "Tim", 60, "London")).expect("insert");
    sync.insert(&person(7, "Rosa", 50, "Paris")).expect("insert");
    sync.delete(fields.id.is(1_u64)).expect("delete");

    let inserted = events.next().await.expect("event").expect("ok");
    assert_eq!(inserted.kind, ChangeKind::Insert);
    assert_eq!(inserted.new_value.map(|p| p.first_name), Some("Tim".to_string()));

    let deleted = events.next().await.expect("event").expect("ok");
    assert_eq!(deleted.kind, ChangeKind::Delete);
    assert!(deleted.new_value.is_none());
    assert_eq!(deleted.old_value.map(|p| p.id), Some(1));
}

#[tokio::test]
async fn watch_sees_updates_leaving_the_match_set() {
    let backend = people_backend();
    let sync = SyncRepository::<Person>::new(&backend);
    let reactive = ReactiveRepository::<Person>::new(&backend);
    let person = sync.criteria().clone();

    let mut events = reactive.watch(person.address.city.is("Austin"));
    assert!(poll!(events.next()).is_pending());

    sync.update(person.id.is(4_u64))
        .set(&person.address.city, "Nuenen")
        .execute()
        .expect("update");

    let moved = events.next().await.expect("event").expect("ok");
    assert_eq!(moved.kind, ChangeKind::Update);
    assert_eq!(moved.old_value.map(|p| p.address.city), Some("Austin".to_string()));
    assert_eq!(moved.new_value.map(|p| p.address.city), Some("Nuenen".to_string()));
}

#[tokio::test]
async fn lagging_watcher_ends_with_connection_error() {
    let config = MemoryConfig {
        watch_capacity: 1,
        ..MemoryConfig::default()
    };
    let backend = InMemoryBackend::with_config(config);
    let sync = SyncRepository::<Person>::new(&backend);
    let reactive = ReactiveRepository::<Person>::new(&backend);

    let mut events = reactive.watch(Criterion::all());
    assert!(poll!(events.next()).is_pending());

    sync.insert_all([
        person(1, "A", 1, "X"),
        person(2, "B", 2, "X"),
        person(3, "C", 3, "X"),
    ])
    .expect("insert");

    let err = events.next().await.expect("event").unwrap_err();
    assert_eq!(err.backend_category(), Some(BackendCategory::Connection));
    assert!(events.next().await.is_none());
}

#[tokio::test]
async fn watch_refuses_counting_queries() {
    let backend = people_backend();
    let session = backend.open(Person::model());

    let mut replies = session.execute(Operation::Watch(Query::of::<Person>().count_only()));
    let err = replies.next().await.expect("reply").unwrap_err();

    assert!(err.is_unsupported());
}
