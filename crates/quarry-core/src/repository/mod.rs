mod reader;
mod updater;


use crate::{
    Error,
    backend::{Backend, ChangeEvent, Operation, Reply, Session, WriteResult},
    criteria::Criterion,
    fetch::{Asynchronous, Discipline, Publisher, Reactive, Synchronous, deferred, failed},
    mapper::ProjectionError,
    model::ValidateError,
    query::Query,
    traits::Record,
    value::Document,
};
use futures::{StreamExt, TryStreamExt, future, stream};
use std::{borrow::Borrow, marker::PhantomData, sync::Arc};

// re-exports
pub use reader::{Reader, Selected};
pub use updater::Updater;

pub type SyncRepository<T> = Repository<T, Synchronous>;
pub type AsyncRepository<T> = Repository<T, Asynchronous>;
pub type ReactiveRepository<T> = Repository<T, Reactive>;

///
/// Repository
///
/// Entry point for one record type over one session. Reads return readers
/// and fetchers shaped by the discipline `D`; writes return write counts.
///

pub struct Repository<T: Record, D> {
    session: Arc<dyn Session>,
    criteria: T::Criteria,
    _discipline: PhantomData<fn() -> D>,
}

impl<T: Record, D> Clone for Repository<T, D> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            criteria: self.criteria.clone(),
            _discipline: PhantomData,
        }
    }
}

impl<T: Record, D: Discipline> Repository<T, D> {
    /// Open a session for `T` on `backend`.
    #[must_use]
    pub fn new(backend: &dyn Backend) -> Self {
        Self::with_session(backend.open(T::model()))
    }

    #[must_use]
    pub fn with_session(session: Arc<dyn Session>) -> Self {
        Self {
            session,
            criteria: T::criteria(),
            _discipline: PhantomData,
        }
    }

    /// Typed accessors for building criteria over `T`.
    #[must_use]
    pub const fn criteria(&self) -> &T::Criteria {
        &self.criteria
    }

    #[must_use]
    pub const fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[must_use]
    pub fn find(&self, criterion: Criterion<T>) -> Reader<T, D> {
        Reader::new(Arc::clone(&self.session), Self::query(criterion))
    }

    #[must_use]
    pub fn find_all(&self) -> Reader<T, D> {
        self.find(Criterion::all())
    }

    /// Change events for records matching `criterion`, from subscription on.
    pub fn watch(&self, criterion: Criterion<T>) -> D::Stream<ChangeEvent<T>> {
        let query = Self::query(criterion);
        let events = match query.validate() {
            Ok(()) => {
                tracing::trace!(entity = T::model().name, query = %query, "watch");

                deferred(Arc::clone(&self.session), Operation::Watch(query))
                    .and_then(|reply| future::ready(decode_change::<T>(reply)))
                    .boxed()
            }
            Err(err) => failed(err.into()),
        };

        D::stream(events)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    pub fn insert(&self, record: &T) -> D::One<WriteResult> {
        self.insert_all([record])
    }

    /// Insert every record, or none of them.
    pub fn insert_all<I>(&self, records: I) -> D::One<WriteResult>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let documents = match records
            .into_iter()
            .map(|record| insert_document(record.borrow()))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(documents) => documents,
            Err(err) => return D::one(failed(err.into())),
        };

        D::one(written(&self.session, Operation::Insert { documents }))
    }

    #[must_use]
    pub fn update(&self, criterion: Criterion<T>) -> Updater<T, D> {
        Updater::new(Arc::clone(&self.session), Self::query(criterion))
    }

    pub fn delete(&self, criterion: Criterion<T>) -> D::One<WriteResult> {
        let query = Self::query(criterion);
        if let Err(err) = query.validate() {
            return D::one(failed(err.into()));
        }

        D::one(written(&self.session, Operation::Delete { query }))
    }

    fn query(criterion: Criterion<T>) -> Query {
        Query::of::<T>().filter(criterion.into_expression())
    }
}

// Writes need an identity and a document the model accepts.
fn insert_document<T: Record>(record: &T) -> Result<Document, ValidateError> {
    let model = T::model();
    if model.identity_field().is_none() {
        return Err(ValidateError::MissingIdentity { entity: model.name });
    }

    let document = record.to_document();
    model.validate_document(&document)?;

    Ok(document)
}

// Fold every `Written` reply of a write into one count.
pub(crate) fn written(
    session: &Arc<dyn Session>,
    operation: Operation,
) -> Publisher<WriteResult> {
    tracing::trace!(entity = session.model().name, operation = %operation.kind(), "write");
    let replies = deferred(Arc::clone(session), operation);

    stream::once(replies.try_fold(WriteResult::default(), |total, reply| {
        future::ready(match reply {
            Reply::Written(result) => Ok(total + result),
            other => Err(Error::from(ProjectionError::UnexpectedReply {
                expected: "write result",
                found: other.label(),
            })),
        })
    }))
    .boxed()
}

fn decode_change<T: Record>(reply: Reply) -> Result<ChangeEvent<T>, Error> {
    match reply {
        Reply::Change(event) => Ok(event.try_map(|doc| T::from_document(&doc))?),
        other => Err(ProjectionError::UnexpectedReply {
            expected: "change event",
            found: other.label(),
        }
        .into()),
    }
}
