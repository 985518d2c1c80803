//! Core runtime for Quarry: the expression IR, typed criteria, queries, the
//! backend contract, fetchers for the three execution disciplines, mappers,
//! repositories, and the in-memory reference backend.
#![warn(unreachable_pub)]

extern crate self as quarry;

// public exports are one module level down
pub mod backend;
pub mod criteria;
pub mod error;
pub mod expr;
pub mod fetch;
pub mod mapper;
pub mod memory;
pub mod model;
pub mod query;
pub mod repository;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;

///
/// Prelude
///
/// Domain vocabulary needed to declare records, build criteria, and run them
/// through a repository.
///

pub mod prelude {
    pub use crate::{
        backend::{Backend, ChangeEvent, ChangeKind, Session, WriteResult},
        criteria::{Criterion, Nullable},
        error::Error,
        fetch::{Asynchronous, Discipline, Interrupt, Reactive, Synchronous},
        memory::InMemoryBackend,
        query::{Direction, NullOrdering, Query, SortKey},
        repository::{AsyncRepository, ReactiveRepository, Repository, SyncRepository},
        traits::{AttributeType, FieldValue, Record},
        value::{Document, Value},
    };
}
