use crate::{
    backend::{Assignment, Change, Operation, Session, WriteResult},
    criteria::Attribute,
    fetch::{Discipline, failed},
    model::ValidateError,
    query::{Query, SortKey},
    repository::written,
    traits::{AttributeType, Record},
    value::Document,
};
use std::{marker::PhantomData, sync::Arc};

///
/// Updater
///
/// Collects either attribute assignments or one full replacement for the
/// records matching a criterion. The first invalid assignment is kept and
/// reported by `execute`.
///

pub struct Updater<T, D> {
    session: Arc<dyn Session>,
    query: Query,
    assignments: Vec<Assignment>,
    replacement: Option<Document>,
    error: Option<ValidateError>,
    _marker: PhantomData<fn() -> (T, D)>,
}

impl<T: Record, D: Discipline> Updater<T, D> {
    pub(crate) fn new(session: Arc<dyn Session>, query: Query) -> Self {
        Self {
            session,
            query,
            assignments: Vec::new(),
            replacement: None,
            error: None,
            _marker: PhantomData,
        }
    }

    /// Assign `value` to `attribute`. `None` on an optional attribute
    /// removes it; on a nullable attribute it stores null.
    #[must_use]
    pub fn set<A: AttributeType>(
        mut self,
        attribute: &Attribute<T, A>,
        value: impl Into<A::Stored>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }

        let model = T::model();
        if attribute.is_transformed() {
            self.error = Some(ValidateError::UnknownPath {
                entity: model.name,
                path: attribute.expression().to_string(),
            });
            return self;
        }

        match model.validate_path(attribute.path()) {
            Ok(_) => self.assignments.push(Assignment {
                path: attribute.path().clone(),
                value: A::store(&value.into()),
            }),
            Err(err) => self.error = Some(err),
        }

        self
    }

    /// Replace each matching record wholesale; the identity must not change.
    #[must_use]
    pub fn replace(mut self, record: &T) -> Self {
        if self.error.is_none() {
            let document = record.to_document();
            match T::model().validate_document(&document) {
                Ok(()) => self.replacement = Some(document),
                Err(err) => self.error = Some(err),
            }
        }

        self
    }

    /// Restrict the update to the first matches in this order.
    #[must_use]
    pub fn order_by(mut self, key: SortKey) -> Self {
        self.query = self.query.order_by(key);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    pub fn execute(self) -> D::One<WriteResult> {
        let entity = T::model().name;
        let change = match (self.error, self.replacement, self.assignments.is_empty()) {
            (Some(err), _, _) => Err(err),
            (None, Some(_), false) => Err(ValidateError::MixedUpdate { entity }),
            (None, Some(document), true) => Ok(Change::Replace(document)),
            (None, None, false) => Ok(Change::Assign(self.assignments)),
            (None, None, true) => Err(ValidateError::EmptyUpdate { entity }),
        };

        let change = match change {
            Ok(change) => change,
            Err(err) => return D::one(failed(err.into())),
        };
        if let Err(err) = self.query.validate() {
            return D::one(failed(err.into()));
        }

        let operation = Operation::Update {
            query: self.query,
            change,
        };

        D::one(written(&self.session, operation))
    }
}
