use crate::{
    Error,
    backend::{Reply, Session},
    criteria::Attribute,
    fetch::{Decoder, Discipline, FetchCore, Fetcher, Interrupt},
    mapper::{Mapper, MapperFn, Mappers, Projection, ProjectionError},
    query::{Query, SortKey},
    traits::{AttributeType, Record},
};
use std::{marker::PhantomData, sync::Arc, time::Duration};

///
/// Reader
///
/// A filtered read over `T` that can still be sorted, paged, grouped, or
/// narrowed to a projection before a terminal runs it.
///

pub struct Reader<T, D> {
    session: Arc<dyn Session>,
    query: Query,
    interrupt: Option<Interrupt>,
    _marker: PhantomData<fn() -> (T, D)>,
}

impl<T, D> Clone for Reader<T, D> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            query: self.query.clone(),
            interrupt: self.interrupt.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Record, D: Discipline> Reader<T, D> {
    pub(crate) fn new(session: Arc<dyn Session>, query: Query) -> Self {
        Self {
            session,
            query,
            interrupt: None,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn order_by(mut self, key: SortKey) -> Self {
        self.query = self.query.order_by(key);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.query = self.query.offset(offset);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.query = self.query.distinct();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.query = self.query.timeout(timeout);
        self
    }

    /// Group by `attribute`; terminals fail unless `select` follows.
    #[must_use]
    pub fn group_by<A: AttributeType>(mut self, attribute: &Attribute<T, A>) -> Self {
        self.query = self.query.group_by(attribute.path().clone());
        self
    }

    #[must_use]
    pub fn interruptible(mut self, interrupt: &Interrupt) -> Self {
        self.interrupt = Some(interrupt.clone());
        self
    }

    /// Narrow every result to the expressions of `projection`.
    #[must_use]
    pub fn select<P: Projection<T>>(self, projection: P) -> Selected<T, P, D> {
        Selected {
            session: self.session,
            query: self.query.select(projection.expressions()),
            projection,
            interrupt: self.interrupt,
            _marker: PhantomData,
        }
    }

    /// Whole records, decoded from documents.
    #[must_use]
    pub fn fetcher(&self) -> Fetcher<T, D> {
        let decoder: Decoder<T> = Arc::new(|reply| match reply {
            Reply::Document(doc) => Ok(T::from_document(&doc)?),
            other => Err(unexpected("document", &other)),
        });

        build(&self.session, &self.query, self.interrupt.as_ref(), decoder)
    }

    #[must_use]
    pub fn map<U, F>(&self, f: F) -> Fetcher<U, D>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.fetcher().map(f)
    }

    pub fn fetch(&self) -> D::Many<T> {
        self.fetcher().fetch()
    }

    pub fn one(&self) -> D::One<T> {
        self.fetcher().one()
    }

    pub fn one_or_none(&self) -> D::One<Option<T>> {
        self.fetcher().one_or_none()
    }

    pub fn first(&self) -> D::One<Option<T>> {
        self.fetcher().first()
    }

    pub fn exists(&self) -> D::One<bool> {
        self.fetcher().exists()
    }

    pub fn count(&self) -> D::One<u64> {
        self.fetcher().count()
    }
}

///
/// Selected
///
/// A read narrowed to a projection; terminals yield the projection's typed
/// tuple, or the result of `map`.
///

pub struct Selected<T, P, D> {
    session: Arc<dyn Session>,
    query: Query,
    projection: P,
    interrupt: Option<Interrupt>,
    _marker: PhantomData<fn() -> (T, D)>,
}

impl<T, P: Clone, D> Clone for Selected<T, P, D> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            query: self.query.clone(),
            projection: self.projection.clone(),
            interrupt: self.interrupt.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Record, P: Projection<T>, D: Discipline> Selected<T, P, D> {
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn order_by(mut self, key: SortKey) -> Self {
        self.query = self.query.order_by(key);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.query = self.query.offset(offset);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.query = self.query.distinct();
        self
    }

    #[must_use]
    pub fn group_by<A: AttributeType>(mut self, attribute: &Attribute<T, A>) -> Self {
        self.query = self.query.group_by(attribute.path().clone());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.query = self.query.timeout(timeout);
        self
    }

    #[must_use]
    pub fn interruptible(mut self, interrupt: &Interrupt) -> Self {
        self.interrupt = Some(interrupt.clone());
        self
    }

    /// Apply `f` positionally to every decoded tuple.
    #[must_use]
    pub fn map<F, O>(&self, f: F) -> Fetcher<O, D>
    where
        O: Send + 'static,
        F: MapperFn<P::Output, O>,
    {
        self.mapped(Mappers::from_tuple::<T, _, _, _>(self.projection.clone(), f))
    }

    /// Decoded tuples.
    #[must_use]
    pub fn fetcher(&self) -> Fetcher<P::Output, D> {
        self.mapped(Mappers::tuple::<T, _>(self.projection.clone()))
    }

    pub fn fetch(&self) -> D::Many<P::Output> {
        self.fetcher().fetch()
    }

    pub fn one(&self) -> D::One<P::Output> {
        self.fetcher().one()
    }

    pub fn one_or_none(&self) -> D::One<Option<P::Output>> {
        self.fetcher().one_or_none()
    }

    pub fn first(&self) -> D::One<Option<P::Output>> {
        self.fetcher().first()
    }

    pub fn exists(&self) -> D::One<bool> {
        self.fetcher().exists()
    }

    /// Number of tuples, or of groups when grouped.
    pub fn count(&self) -> D::One<u64> {
        self.fetcher().count()
    }

    fn mapped<O: Send + 'static>(&self, mapper: Mapper<O>) -> Fetcher<O, D> {
        let decoder: Decoder<O> = Arc::new(move |reply| match reply {
            Reply::Tuple(tuple) => Ok(mapper(&tuple)?),
            other => Err(unexpected("tuple", &other)),
        });

        build(&self.session, &self.query, self.interrupt.as_ref(), decoder)
    }
}

fn unexpected(expected: &'static str, reply: &Reply) -> Error {
    ProjectionError::UnexpectedReply {
        expected,
        found: reply.label(),
    }
    .into()
}

fn build<T: Send + 'static, D: Discipline>(
    session: &Arc<dyn Session>,
    query: &Query,
    interrupt: Option<&Interrupt>,
    decoder: Decoder<T>,
) -> Fetcher<T, D> {
    let core = FetchCore::new(Arc::clone(session), query.clone(), decoder);

    match interrupt {
        Some(interrupt) => Fetcher::new(core.with_interrupt(interrupt.clone())),
        None => Fetcher::new(core),
    }
}
