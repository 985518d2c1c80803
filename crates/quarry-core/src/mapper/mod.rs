mod error;
mod projection;


use crate::backend::ProjectedTuple;
use std::sync::Arc;

// re-exports
pub use error::ProjectionError;
pub use projection::{Projectable, Projection};

///
/// Mapper
/// Decoding function from a projected tuple to `O`.
///

pub type Mapper<O> = Arc<dyn Fn(&ProjectedTuple) -> Result<O, ProjectionError> + Send + Sync>;

///
/// MapperFn
///
/// A plain function of arity 1..5 applied positionally to a decoded tuple.
///

pub trait MapperFn<Args, O>: Send + Sync + 'static {
    fn apply(&self, args: Args) -> O;
}

macro_rules! impl_mapper_fn {
    ($($A:ident),+) => {
        impl<F, O, $($A),+> MapperFn<($($A,)+), O> for F
        where
            F: Fn($($A),+) -> O + Send + Sync + 'static,
        {
            #[allow(non_snake_case)]
            fn apply(&self, ($($A,)+): ($($A,)+)) -> O {
                self($($A),+)
            }
        }
    };
}

impl_mapper_fn!(A);
impl_mapper_fn!(A, B);
impl_mapper_fn!(A, B, C);
impl_mapper_fn!(A, B, C, D);
impl_mapper_fn!(A, B, C, D, E);

///
/// Mappers
///

pub struct Mappers;

impl Mappers {
    /// Decode a tuple against `projection` and apply `f` positionally.
    ///
    /// The tuple must carry the projection's expressions in order; each value
    /// is coerced to the declared attribute type.
    pub fn from_tuple<R, P, F, O>(projection: P, f: F) -> Mapper<O>
    where
        P: Projection<R>,
        F: MapperFn<P::Output, O>,
    {
        Arc::new(move |tuple| projection.decode(tuple).map(|args| f.apply(args)))
    }

    /// Decode a tuple into the projection's output tuple.
    pub fn tuple<R, P>(projection: P) -> Mapper<P::Output>
    where
        P: Projection<R>,
    {
        Arc::new(move |tuple| projection.decode(tuple))
    }
}
