use crate::{
    expr::{Expression, InvalidExpression, Path},
    model::Kind,
    query::{Direction, Query, SortKey},
    test_fixtures::{Address, Person},
    traits::Record,
};
use std::time::Duration;

fn adults() -> Expression {
    Person::criteria().age.at_least(18_u32).into_expression()
}

#[test]
fn empty_query_has_no_predicate() {
    let query = Query::of::<Person>();

    assert!(query.predicate().is_none());
    assert!(query.validate().is_ok());
    assert_eq!(query.to_string(), "from Person");
}

#[test]
fn filter_ands_with_existing_predicate() {
    let person = Person::criteria();
    let named = person.first_name.is("Ada").into_expression();

    let query = Query::of::<Person>().filter(adults()).filter(named.clone());

    assert_eq!(query.predicate(), Some(&adults().and(named)));
}

#[test]
fn trivially_true_filter_is_dropped() {
    let query = Query::of::<Person>().filter(Expression::truth(true));

    assert!(query.predicate().is_none());
}

#[test]
fn cap_limit_lowers_only() {
    assert_eq!(Query::of::<Person>().limit(10).cap_limit(2).page().limit, Some(2));
    assert_eq!(Query::of::<Person>().limit(1).cap_limit(2).page().limit, Some(1));
    assert_eq!(Query::of::<Person>().cap_limit(2).page().limit, Some(2));
}

#[test]
fn validate_rejects_non_boolean_filter() {
    let query = Query::of::<Person>().filter(Person::criteria().age.expression());

    assert!(matches!(
        query.validate(),
        Err(InvalidExpression::NotPredicate { .. })
    ));
}

#[test]
fn validate_rejects_foreign_paths() {
    let foreign = Address::criteria().city.is("London").into_expression();
    let query = Query::of::<Person>().filter(foreign);

    assert_eq!(
        query.validate(),
        Err(InvalidExpression::ForeignPath {
            entity: "Person",
            path: "Address.city".to_string(),
        })
    );
}

#[test]
fn validate_rejects_boolean_projection() {
    let query = Query::of::<Person>().select(vec![adults()]);

    assert!(matches!(
        query.validate(),
        Err(InvalidExpression::NotProjectable { .. })
    ));
}

#[test]
fn validate_rejects_ungrouped_projection() {
    let person = Person::criteria();
    let query = Query::of::<Person>().select(vec![
        person.first_name.expression(),
        person.age.count().expression().clone(),
    ]);

    assert!(query.is_grouped());
    assert!(matches!(
        query.validate(),
        Err(InvalidExpression::Ungrouped { .. })
    ));
}

#[test]
fn validate_rejects_grouping_without_projection() {
    let person = Person::criteria();
    let query = Query::of::<Person>().group_by(person.address.city.path().clone());

    assert_eq!(
        query.validate(),
        Err(InvalidExpression::UnprojectedGrouping { entity: "Person" })
    );
}

#[test]
fn validate_accepts_grouped_projection() {
    let person = Person::criteria();
    let query = Query::of::<Person>()
        .select(vec![
            person.address.city.expression(),
            person.age.max().expression().clone(),
        ])
        .group_by(person.address.city.path().clone())
        .order_by(person.address.city.asc());

    assert!(query.validate().is_ok());
}

#[test]
fn validate_rejects_sort_outside_grouping() {
    let person = Person::criteria();
    let query = Query::of::<Person>()
        .select(vec![person.address.city.expression()])
        .group_by(person.address.city.path().clone())
        .order_by(person.age.asc());

    assert!(matches!(
        query.validate(),
        Err(InvalidExpression::UngroupedSort { .. })
    ));
}

#[test]
fn fingerprint_ignores_timeout() {
    let base = Query::of::<Person>().filter(adults()).limit(3);
    let timed = base.clone().timeout(Duration::from_millis(5));

    assert_eq!(base.fingerprint(), timed.fingerprint());
    assert_ne!(base.fingerprint(), base.clone().limit(4).fingerprint());
}

#[test]
fn fingerprint_tracks_sort_direction() {
    let age = Path::root(Person::model()).child("age", Kind::Uint);
    let asc = Query::of::<Person>().order_by(SortKey::new(age.clone(), Direction::Asc));
    let desc = Query::of::<Person>().order_by(SortKey::new(age, Direction::Desc));

    assert_ne!(asc.fingerprint(), desc.fingerprint());
}

#[test]
fn fingerprint_tracks_sort_transforms() {
    let person = Person::criteria();
    let plain = Query::of::<Person>().order_by(person.first_name.asc());
    let folded = Query::of::<Person>().order_by(person.first_name.to_lower().asc());

    assert_ne!(plain.fingerprint(), folded.fingerprint());
}

#[test]
fn display_lists_every_clause() {
    let person = Person::criteria();
    let query = Query::of::<Person>()
        .filter(adults())
        .order_by(person.age.desc().nulls_last())
        .offset(1)
        .limit(2)
        .distinct();

    assert_eq!(
        query.to_string(),
        "from Person where GREATER_EQUAL(Person.age, 18u) order by Person.age desc nulls last offset 1 limit 2 distinct"
    );
}
