use crate::model::Kind;
use thiserror::Error as ThisError;

///
/// ProjectionError
///
/// Shape or type mismatch while decoding a record or a projected tuple.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ProjectionError {
    #[error("projected tuple has arity {found}, expected {expected}")]
    Arity { expected: usize, found: usize },

    #[error("projection {position} is '{found}', expected '{expected}'")]
    Shape {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("value at '{path}' is absent but the attribute is required")]
    Missing { path: String },

    #[error("value at '{path}' expects {expected}, found {found}")]
    Type {
        path: String,
        expected: Kind,
        found: &'static str,
    },

    #[error("expected {expected} reply, found {found}")]
    UnexpectedReply {
        expected: &'static str,
        found: &'static str,
    },
}
