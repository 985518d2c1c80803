use crate::{
    Error,
    backend::{Operation, Reply, ResultSequence, Session},
    fetch::{
        Interrupt, Interruptible, Publisher,
        response::{at_most_one, exactly_one},
    },
    mapper::ProjectionError,
    query::Query,
};
use futures::{StreamExt, TryStreamExt, future, stream};
use std::sync::Arc;

/// Publisher that fails on first poll.
pub(crate) fn failed<T: Send + 'static>(error: Error) -> Publisher<T> {
    stream::once(future::ready(Err(error))).boxed()
}

/// Sequence that hands `operation` to the session on first poll.
pub(crate) fn deferred(session: Arc<dyn Session>, operation: Operation) -> ResultSequence {
    stream::once(future::lazy(move |_| session.execute(operation)))
        .flatten()
        .boxed()
}

///
/// Decoder
/// Turns one backend reply into a typed result.
///

pub(crate) type Decoder<T> = Arc<dyn Fn(Reply) -> Result<T, Error> + Send + Sync>;

///
/// FetchCore
///
/// The single reactive implementation behind every discipline: a session,
/// a query, and a reply decoder. Terminals return cold publishers.
///

pub struct FetchCore<T> {
    session: Arc<dyn Session>,
    query: Query,
    decoder: Decoder<T>,
    interrupt: Option<Interrupt>,
}

impl<T> Clone for FetchCore<T> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            query: self.query.clone(),
            decoder: Arc::clone(&self.decoder),
            interrupt: self.interrupt.clone(),
        }
    }
}

impl<T: Send + 'static> FetchCore<T> {
    pub(crate) fn new(session: Arc<dyn Session>, query: Query, decoder: Decoder<T>) -> Self {
        Self {
            session,
            query,
            decoder,
            interrupt: None,
        }
    }

    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    pub(crate) fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    fn execute(&self, query: Query) -> ResultSequence {
        if let Err(err) = query.validate() {
            return failed(err.into());
        }

        tracing::trace!(entity = query.model().name, query = %query, "select");
        let replies = deferred(Arc::clone(&self.session), Operation::Select(query));

        match &self.interrupt {
            Some(interrupt) => Interruptible::new(replies, interrupt.clone()).boxed(),
            None => replies,
        }
    }

    fn decode(&self, query: Query) -> Publisher<T> {
        let decoder = Arc::clone(&self.decoder);

        self.execute(query)
            .and_then(move |reply| future::ready(decoder(reply)))
            .boxed()
    }

    // ------------------------------------------------------------------
    // Terminals
    // ------------------------------------------------------------------

    #[must_use]
    pub fn fetch(&self) -> Publisher<T> {
        self.decode(self.query.clone())
    }

    /// Exactly one result; zero or several fail with `NonUniqueResult`.
    #[must_use]
    pub fn one(&self) -> Publisher<T> {
        let entity = self.query.model().name;
        let rows = self.decode(self.query.clone().cap_limit(2));

        stream::once(async move {
            let rows: Vec<T> = rows.try_collect().await?;
            Ok::<_, Error>(exactly_one(rows, entity)?)
        })
        .boxed()
    }

    #[must_use]
    pub fn one_or_none(&self) -> Publisher<Option<T>> {
        let entity = self.query.model().name;
        let rows = self.decode(self.query.clone().cap_limit(2));

        stream::once(async move {
            let rows: Vec<T> = rows.try_collect().await?;
            Ok::<_, Error>(at_most_one(rows, entity)?)
        })
        .boxed()
    }

    #[must_use]
    pub fn first(&self) -> Publisher<Option<T>> {
        let mut rows = self.decode(self.query.clone().cap_limit(1));

        stream::once(async move { rows.try_next().await }).boxed()
    }

    /// `Select(limit = 1)` is non-empty.
    #[must_use]
    pub fn exists(&self) -> Publisher<bool> {
        let mut replies = self.execute(self.query.clone().cap_limit(1));

        stream::once(async move { Ok::<_, Error>(replies.try_next().await?.is_some()) }).boxed()
    }

    /// Number of results, computed by the backend.
    #[must_use]
    pub fn count(&self) -> Publisher<u64> {
        let mut replies = self.execute(self.query.clone().count_only());

        stream::once(async move {
            match replies.try_next().await? {
                Some(Reply::Count(n)) => Ok::<_, Error>(n),
                Some(other) => Err(ProjectionError::UnexpectedReply {
                    expected: "count",
                    found: other.label(),
                }
                .into()),
                None => Err(ProjectionError::UnexpectedReply {
                    expected: "count",
                    found: "end of sequence",
                }
                .into()),
            }
        })
        .boxed()
    }

    /// Compose `f` onto the decoder.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> FetchCore<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let decoder = self.decoder;

        FetchCore {
            session: self.session,
            query: self.query,
            decoder: Arc::new(move |reply| decoder(reply).map(&f)),
            interrupt: self.interrupt,
        }
    }

    /// Compose a fallible `f` onto the decoder.
    #[must_use]
    pub fn try_map<U, F>(self, f: F) -> FetchCore<U>
    where
        F: Fn(T) -> Result<U, Error> + Send + Sync + 'static,
    {
        let decoder = self.decoder;

        FetchCore {
            session: self.session,
            query: self.query,
            decoder: Arc::new(move |reply| decoder(reply).and_then(&f)),
            interrupt: self.interrupt,
        }
    }
}
