mod discipline;
mod interrupt;
mod pipeline;
mod promise;
mod response;


use crate::{Error, query::Query};
use futures::stream::BoxStream;
use std::marker::PhantomData;

// re-exports
pub use discipline::{Asynchronous, Discipline, Reactive, Synchronous};
pub use interrupt::{Interrupt, Interruptible};
pub use pipeline::FetchCore;
pub use promise::Promise;
pub use response::{Expected, Found, ResponseError};

pub(crate) use pipeline::{Decoder, deferred, failed};

///
/// Publisher
/// Lazy stream of decoded results; the reactive terminal shape.
///

pub type Publisher<T> = BoxStream<'static, Result<T, Error>>;

pub type SyncFetcher<T> = Fetcher<T, Synchronous>;
pub type AsyncFetcher<T> = Fetcher<T, Asynchronous>;
pub type ReactiveFetcher<T> = Fetcher<T, Reactive>;

///
/// Fetcher
///
/// Terminal operations over one query. Every terminal builds a fresh cold
/// publisher from the shared core; the discipline `D` only decides how the
/// caller receives it.
///

pub struct Fetcher<T, D> {
    core: FetchCore<T>,
    _discipline: PhantomData<fn() -> D>,
}

impl<T, D> Clone for Fetcher<T, D> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            _discipline: PhantomData,
        }
    }
}

impl<T: Send + 'static, D: Discipline> Fetcher<T, D> {
    #[must_use]
    pub const fn new(core: FetchCore<T>) -> Self {
        Self {
            core,
            _discipline: PhantomData,
        }
    }

    #[must_use]
    pub const fn query(&self) -> &Query {
        self.core.query()
    }

    /// Every result, in backend order.
    pub fn fetch(&self) -> D::Many<T> {
        D::many(self.core.fetch())
    }

    /// Exactly one result.
    pub fn one(&self) -> D::One<T> {
        D::one(self.core.one())
    }

    /// At most one result.
    pub fn one_or_none(&self) -> D::One<Option<T>> {
        D::one(self.core.one_or_none())
    }

    /// The first result, if any.
    pub fn first(&self) -> D::One<Option<T>> {
        D::one(self.core.first())
    }

    pub fn exists(&self) -> D::One<bool> {
        D::one(self.core.exists())
    }

    pub fn count(&self) -> D::One<u64> {
        D::one(self.core.count())
    }

    /// Rewrap every result through `f`.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Fetcher<U, D>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Fetcher::new(self.core.map(f))
    }

    /// Attach an interrupt; triggered publishers end with `Interrupted`.
    #[must_use]
    pub fn interruptible(self, interrupt: &Interrupt) -> Self {
        Self::new(self.core.with_interrupt(interrupt.clone()))
    }

    /// Raw reactive stream, regardless of discipline.
    #[must_use]
    pub fn publisher(&self) -> Publisher<T> {
        self.core.fetch()
    }
}
