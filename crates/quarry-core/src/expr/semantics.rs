use crate::{
    expr::Operator,
    value::{Value, strict_order_cmp},
};
use std::cmp::Ordering;

/// Two-valued comparison semantics shared by constant folding and the
/// in-memory evaluator.
///
/// Absent operands and stored nulls never compare: every comparison
/// involving them is false, including `NotEqual`. Ordering comparisons
/// require identical orderable variants.
#[must_use]
pub fn compare(operator: Operator, left: Option<&Value>, right: Option<&Value>) -> bool {
    let (Some(left), Some(right)) = (left, right) else {
        return false;
    };
    if left.is_null() || right.is_null() {
        return false;
    }

    match operator {
        Operator::Equal => left == right,
        Operator::NotEqual => left != right,
        Operator::Less => strict_order_cmp(left, right) == Some(Ordering::Less),
        Operator::LessEqual => matches!(
            strict_order_cmp(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::Greater => strict_order_cmp(left, right) == Some(Ordering::Greater),
        Operator::GreaterEqual => matches!(
            strict_order_cmp(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        _ => false,
    }
}
