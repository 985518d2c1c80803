use crate::{
    backend::ProjectedTuple,
    criteria::{Aggregate, AggregateOutput, Attribute},
    expr::Expression,
    mapper::ProjectionError,
    traits::AttributeType,
    value::Value,
};

///
/// Projectable
///
/// One projected column of record `R`: the expression sent to the backend
/// and the decoder for the value that comes back.
///

pub trait Projectable<R>: Clone + Send + Sync + 'static {
    type Output: Send + 'static;

    fn expression(&self) -> Expression;

    fn decode(&self, value: Option<&Value>) -> Result<Self::Output, ProjectionError>;
}

impl<R: 'static, A: AttributeType> Projectable<R> for Attribute<R, A> {
    type Output = A::Stored;

    fn expression(&self) -> Expression {
        Attribute::expression(self)
    }

    fn decode(&self, value: Option<&Value>) -> Result<A::Stored, ProjectionError> {
        A::load(value).map_err(|err| err.at(Attribute::expression(self), &A::kind()))
    }
}

impl<R: 'static, O: AggregateOutput> Projectable<R> for Aggregate<R, O> {
    type Output = O;

    fn expression(&self) -> Expression {
        Aggregate::expression(self).clone()
    }

    fn decode(&self, value: Option<&Value>) -> Result<O, ProjectionError> {
        let expression = Aggregate::expression(self);

        O::decode(value).map_err(|err| err.at(expression, &expression.kind()))
    }
}

///
/// Projection
///
/// Tuple of one to five projectables, decoded positionally.
///

pub trait Projection<R>: Clone + Send + Sync + 'static {
    type Output: Send + 'static;

    const ARITY: usize;

    fn expressions(&self) -> Vec<Expression>;

    fn decode(&self, tuple: &ProjectedTuple) -> Result<Self::Output, ProjectionError>;
}

// Arity and expression order must match before any value is decoded.
fn check_shape(expected: &[Expression], tuple: &ProjectedTuple) -> Result<(), ProjectionError> {
    if tuple.arity() != expected.len() {
        return Err(ProjectionError::Arity {
            expected: expected.len(),
            found: tuple.arity(),
        });
    }

    for (position, (entry, expected)) in tuple.iter().zip(expected).enumerate() {
        if &entry.expression != expected {
            return Err(ProjectionError::Shape {
                position,
                expected: expected.to_string(),
                found: entry.expression.to_string(),
            });
        }
    }

    Ok(())
}

macro_rules! impl_projection {
    ($arity:expr; $($P:ident $idx:tt),+) => {
        impl<R, $($P: Projectable<R>),+> Projection<R> for ($($P,)+) {
            type Output = ($($P::Output,)+);

            const ARITY: usize = $arity;

            fn expressions(&self) -> Vec<Expression> {
                vec![$(self.$idx.expression()),+]
            }

            fn decode(&self, tuple: &ProjectedTuple) -> Result<Self::Output, ProjectionError> {
                check_shape(&self.expressions(), tuple)?;

                Ok(($(self.$idx.decode(tuple.value($idx))?,)+))
            }
        }
    };
}

impl_projection!(1; P0 0);
impl_projection!(2; P0 0, P1 1);
impl_projection!(3; P0 0, P1 1, P2 2);
impl_projection!(4; P0 0, P1 1, P2 2, P3 3);
impl_projection!(5; P0 0, P1 1, P2 2, P3 3, P4 4);
