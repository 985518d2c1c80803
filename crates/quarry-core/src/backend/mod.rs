mod error;
mod operation;
mod reply;

#[cfg(test)]
mod tests;

use crate::{Error, model::RecordModel};
use futures::stream::BoxStream;
use std::sync::Arc;

// re-exports
pub use error::{BackendCategory, BackendError, UnsupportedOperationExpression};
pub use operation::{Assignment, Change, Operation, OperationKind};
pub use reply::{ChangeEvent, ChangeKind, ProjectedTuple, Reply, TupleEntry, WriteResult};

///
/// ResultSequence
///
/// Lazy, cold, single-subscriber sequence of replies. Nothing runs until the
/// first poll; dropping the stream cancels the operation and releases any
/// backend cursor.
///

pub type ResultSequence = BoxStream<'static, Result<Reply, Error>>;

///
/// Session
///
/// Thread-safe handle to a backend, bound to one record model.
///

pub trait Session: Send + Sync {
    fn model(&self) -> &'static RecordModel;

    fn execute(&self, operation: Operation) -> ResultSequence;
}

///
/// Backend
///
/// Opens sessions per record type.
///

pub trait Backend: Send + Sync {
    fn open(&self, model: &'static RecordModel) -> Arc<dyn Session>;
}
