use crate::expr::{Expression, Operator};
use std::fmt;
use thiserror::Error as ThisError;

///
/// BackendCategory
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BackendCategory {
    Connection,
    Syntax,
    Constraint,
    Timeout,
    NotSupported,
}

impl fmt::Display for BackendCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Connection => "connection",
            Self::Syntax => "syntax",
            Self::Constraint => "constraint",
            Self::Timeout => "timeout",
            Self::NotSupported => "not-supported",
        };

        f.write_str(label)
    }
}

///
/// BackendError
///
/// Failure reported by an adapter, classified by category.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{category} error: {message}")]
pub struct BackendError {
    pub category: BackendCategory,
    pub message: String,
}

impl BackendError {
    pub fn new(category: BackendCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(BackendCategory::Connection, message)
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(BackendCategory::Syntax, message)
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(BackendCategory::Constraint, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendCategory::Timeout, message)
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(BackendCategory::NotSupported, message)
    }
}

///
/// UnsupportedOperationExpression
///
/// An adapter met an operator it cannot translate.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("operator {operator} is not supported by this backend in '{expression}'")]
pub struct UnsupportedOperationExpression {
    pub operator: Operator,
    pub expression: String,
}

impl UnsupportedOperationExpression {
    /// Scan `expression` and report the first operator `supported` rejects.
    pub fn check(
        expression: &Expression,
        supported: impl Fn(Operator) -> bool,
    ) -> Result<(), Self> {
        match expression.first_unsupported(supported) {
            Some(operator) => Err(Self {
                operator,
                expression: expression.to_string(),
            }),
            None => Ok(()),
        }
    }
}
