mod aggregate;
mod attribute;
mod criterion;


use std::marker::PhantomData;

// re-exports
pub use aggregate::{Aggregate, AggregateOutput};
pub use attribute::Attribute;
pub use criterion::Criterion;

///
/// Nullable
///
/// Attribute marker for `#[record(nullable)] Option<T>` fields: `None` is
/// stored as an explicit null rather than omitted.
///

pub struct Nullable<T>(PhantomData<fn() -> T>);
