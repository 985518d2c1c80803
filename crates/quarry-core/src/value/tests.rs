use crate::value::{Document, Float64, Value, canonical_cmp, strict_order_cmp};
use std::cmp::Ordering;
use time::macros::{date, datetime};

// ---- helpers -----------------------------------------------------------

fn v_f64(x: f64) -> Value {
    Value::Float(Float64::try_new(x).expect("finite f64"))
}

fn v_txt(s: &str) -> Value {
    Value::Text(s.to_string())
}

// ---- float -------------------------------------------------------------

#[test]
fn float_rejects_non_finite_and_normalizes_negative_zero() {
    assert!(Float64::try_new(f64::NAN).is_none());
    assert!(Float64::try_new(f64::INFINITY).is_none());

    let neg = Float64::try_new(-0.0).expect("finite");
    let pos = Float64::try_new(0.0).expect("finite");
    assert_eq!(neg, pos);
    assert_eq!(neg.cmp(&pos), Ordering::Equal);
}

#[test]
fn float_deserializes_from_plain_number() {
    let ok: Float64 = serde_json::from_str("1.5").expect("finite float should decode");
    assert_eq!(ok.get(), 1.5);
}

// ---- ordering ----------------------------------------------------------

#[test]
fn strict_order_only_compares_same_variant() {
    assert_eq!(
        strict_order_cmp(&Value::Int(1), &Value::Int(2)),
        Some(Ordering::Less)
    );
    assert_eq!(strict_order_cmp(&Value::Int(1), &Value::Uint(2)), None);
    assert_eq!(strict_order_cmp(&Value::Null, &Value::Null), None);
    assert_eq!(
        strict_order_cmp(&date!(2010 - 05 - 01).into(), &date!(2010 - 05 - 02).into()),
        Some(Ordering::Less)
    );
}

#[test]
fn canonical_order_ranks_null_first() {
    let mut values = vec![v_txt("b"), Value::Int(3), Value::Null, v_f64(0.5), v_txt("a")];
    values.sort();

    assert_eq!(
        values,
        vec![Value::Null, Value::Int(3), v_f64(0.5), v_txt("a"), v_txt("b")]
    );
}

#[test]
fn canonical_order_is_lexicographic_for_lists() {
    let short = Value::List(vec![Value::Int(1)]);
    let long = Value::List(vec![Value::Int(1), Value::Int(0)]);

    assert_eq!(canonical_cmp(&short, &long), Ordering::Less);
}

// ---- display -----------------------------------------------------------

#[test]
fn display_renders_normal_form() {
    let mut doc = Document::new();
    doc.insert("a".to_string(), Value::Uint(1));
    doc.insert("b".to_string(), Value::List(vec![Value::Bool(true), Value::Null]));

    assert_eq!(Value::Record(doc).to_string(), "{a: 1u, b: [true, null]}");
    assert_eq!(v_txt("x\"y").to_string(), "\"x\\\"y\"");
    assert_eq!(
        Value::Date(date!(2010 - 05 - 01)).to_string(),
        "date(2010-05-01)"
    );
    assert_eq!(
        Value::Timestamp(datetime!(2010-05-01 12:00 UTC)).to_string(),
        "ts(2010-05-01T12:00:00Z)"
    );
}

#[test]
fn value_serde_round_trips_through_json() {
    let value = Value::List(vec![Value::Int(-4), v_txt("x"), Value::Null]);
    let json = serde_json::to_string(&value).expect("serialize should succeed");
    let back: Value = serde_json::from_str(&json).expect("deserialize should succeed");

    assert_eq!(back, value);
}

// ---- properties --------------------------------------------------------

fn arb_scalar() -> impl proptest::strategy::Strategy<Value = Value> {
    use proptest::prelude::*;

    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::Uint),
        (-1.0e6..1.0e6_f64).prop_map(v_f64),
        "[a-c]{0,3}".prop_map(Value::Text),
    ]
}

proptest::proptest! {
    #[test]
    fn canonical_order_is_antisymmetric(left in arb_scalar(), right in arb_scalar()) {
        let forward = canonical_cmp(&left, &right);
        let backward = canonical_cmp(&right, &left);

        proptest::prop_assert_eq!(forward, backward.reverse());
        proptest::prop_assert_eq!(forward == Ordering::Equal, left == right);
    }

    #[test]
    fn strict_order_only_within_a_variant(left in arb_scalar(), right in arb_scalar()) {
        if let Some(ordering) = strict_order_cmp(&left, &right) {
            proptest::prop_assert_eq!(ordering, canonical_cmp(&left, &right));
        }
    }
}
