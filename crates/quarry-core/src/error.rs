use crate::{
    backend::{BackendCategory, BackendError, UnsupportedOperationExpression},
    expr::InvalidExpression,
    fetch::ResponseError,
    mapper::ProjectionError,
    model::ValidateError,
};
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level error surfaced by every fetcher discipline.
/// Build-time failures (`InvalidExpression`, `Validate`) are produced before
/// any backend work; every other variant terminates a result sequence and is
/// delivered unchanged through sync, async, and reactive fetchers.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    InvalidExpression(#[from] InvalidExpression),

    #[error(transparent)]
    UnsupportedOperation(#[from] UnsupportedOperationExpression),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error("operation interrupted")]
    Interrupted,

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// True when `one` / `one_or_none` saw the wrong number of rows.
    #[must_use]
    pub const fn is_non_unique(&self) -> bool {
        matches!(self, Self::Response(ResponseError::NonUniqueResult { .. }))
    }

    /// True when an adapter refused an operator or an operation.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOperation(_)
                | Self::Backend(BackendError {
                    category: BackendCategory::NotSupported,
                    ..
                })
        )
    }

    /// Backend category, when the error came from an adapter.
    #[must_use]
    pub const fn backend_category(&self) -> Option<BackendCategory> {
        match self {
            Self::Backend(err) => Some(err.category),
            _ => None,
        }
    }
}
