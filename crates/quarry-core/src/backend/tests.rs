use crate::{
    backend::{
        BackendCategory, BackendError, ChangeEvent, ChangeKind, Operation, OperationKind,
        ProjectedTuple, Reply, TupleEntry, UnsupportedOperationExpression, WriteResult,
    },
    expr::{Expression, Operator},
    query::Query,
    test_fixtures::Person,
    traits::Record,
    value::{Document, Value},
};

#[test]
fn unsupported_check_names_the_operator() {
    let person = Person::criteria();
    let expression = person
        .age
        .greater_than(3_u32)
        .and(person.first_name.matches(&regex::Regex::new("^A").expect("valid pattern")))
        .into_expression();

    let err = UnsupportedOperationExpression::check(&expression, |op| op != Operator::Matches)
        .unwrap_err();

    assert_eq!(err.operator, Operator::Matches);
    assert_eq!(err.expression, expression.to_string());
    assert!(UnsupportedOperationExpression::check(&expression, |_| true).is_ok());
}

#[test]
fn backend_errors_carry_category() {
    let err = BackendError::constraint("duplicate key");

    assert_eq!(err.category, BackendCategory::Constraint);
    assert!(err.to_string().contains("duplicate key"));
}

#[test]
fn write_results_sum() {
    let total: WriteResult = [
        WriteResult::inserted(2),
        WriteResult::updated(3),
        WriteResult::deleted(1),
    ]
    .into_iter()
    .sum();

    assert_eq!(
        total,
        WriteResult {
            inserted: 2,
            updated: 3,
            deleted: 1,
        }
    );
    assert_eq!(total.total(), 6);
}

#[test]
fn change_event_maps_both_sides() {
    let event = ChangeEvent {
        kind: ChangeKind::Update,
        key: Value::Uint(1),
        new_value: Some(2_u64),
        old_value: Some(1_u64),
    };

    let mapped: ChangeEvent<String> = event
        .try_map(|n| Ok::<_, ()>(n.to_string()))
        .expect("mapping succeeds");

    assert_eq!(mapped.new_value.as_deref(), Some("2"));
    assert_eq!(mapped.old_value.as_deref(), Some("1"));
    assert_eq!(mapped.kind, ChangeKind::Update);
}

#[test]
fn change_event_map_stops_on_error() {
    let event: ChangeEvent<u64> = ChangeEvent {
        kind: ChangeKind::Delete,
        key: Value::Uint(1),
        new_value: None,
        old_value: Some(1),
    };

    assert_eq!(event.try_map(|_| Err::<u64, _>("boom")), Err("boom"));
}

#[test]
fn projected_tuple_reads_positions() {
    let tuple: ProjectedTuple = [
        TupleEntry {
            expression: Expression::truth(true),
            value: Some(Value::Uint(7)),
        },
        TupleEntry {
            expression: Expression::truth(false),
            value: None,
        },
    ]
    .into_iter()
    .collect();

    assert_eq!(tuple.arity(), 2);
    assert_eq!(tuple.value(0), Some(&Value::Uint(7)));
    assert_eq!(tuple.value(1), None);
    assert_eq!(tuple.value(2), None);
}

#[test]
fn operations_expose_kind_and_query() {
    let query = Query::of::<Person>();
    let select = Operation::Select(query.clone());
    let insert = Operation::Insert {
        documents: vec![Document::new()],
    };

    assert_eq!(select.kind(), OperationKind::Select);
    assert_eq!(select.query(), Some(&query));
    assert_eq!(insert.kind().to_string(), "insert");
    assert!(insert.query().is_none());
}

#[test]
fn reply_labels() {
    assert_eq!(Reply::Count(1).label(), "count");
    assert_eq!(Reply::Written(WriteResult::default()).label(), "write result");
}
