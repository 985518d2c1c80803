use crate::{
    expr::{Expression, Operator},
    traits::{DecodeError, FieldValue, load_optional, load_required},
    value::Value,
};
use std::{fmt, marker::PhantomData};

///
/// AggregateOutput
/// Rust type an aggregate projection decodes into.
///

pub trait AggregateOutput: Send + Sized + 'static {
    fn decode(value: Option<&Value>) -> Result<Self, DecodeError>;
}

impl AggregateOutput for u64 {
    fn decode(value: Option<&Value>) -> Result<Self, DecodeError> {
        load_required(value)
    }
}

// empty groups aggregate to none
impl<T: FieldValue> AggregateOutput for Option<T> {
    fn decode(value: Option<&Value>) -> Result<Self, DecodeError> {
        load_optional(value)
    }
}

///
/// Aggregate
///
/// Aggregate projection over an attribute of `R`, decoding into `O`.
///

pub struct Aggregate<R, O> {
    expression: Expression,
    _marker: PhantomData<fn() -> (R, O)>,
}

impl<R, O> Aggregate<R, O> {
    pub(crate) fn new(operator: Operator, target: Expression) -> Self {
        Self {
            expression: Expression::typed(operator, vec![target]),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn expression(&self) -> &Expression {
        &self.expression
    }
}

impl<R, O> Clone for Aggregate<R, O> {
    fn clone(&self) -> Self {
        Self {
            expression: self.expression.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R, O> fmt::Debug for Aggregate<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Aggregate").field(&self.expression).finish()
    }
}
