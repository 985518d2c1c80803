use crate::{
    expr::{Arity, Operator},
    model::Kind,
};
use thiserror::Error as ThisError;

///
/// InvalidExpression
///
/// Ill-typed operator application or invalid query shape, detected while
/// building.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum InvalidExpression {
    #[error("{operator} expects {expected} operands, found {found}")]
    Arity {
        operator: Operator,
        expected: Arity,
        found: usize,
    },

    #[error("operand {position} of {operator} must be {expected}, found {found}")]
    OperandKind {
        operator: Operator,
        position: usize,
        expected: &'static str,
        found: Kind,
    },

    #[error("operand {position} of {operator} must be a {expected}")]
    OperandShape {
        operator: Operator,
        position: usize,
        expected: &'static str,
    },

    #[error("operands of {operator} have mismatched kinds {left} and {right}")]
    KindMismatch {
        operator: Operator,
        left: Kind,
        right: Kind,
    },

    #[error("invalid regular expression '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("filter must be a boolean expression, found '{expression}'")]
    NotPredicate { expression: String },

    #[error("aggregate '{expression}' is not allowed in a filter")]
    AggregateInFilter { expression: String },

    #[error("projection '{expression}' is neither a path, a scalar call, nor an aggregate")]
    NotProjectable { expression: String },

    #[error("projection '{expression}' is neither grouped nor aggregated")]
    Ungrouped { expression: String },

    #[error("grouped query over {entity} selects nothing")]
    UnprojectedGrouping { entity: &'static str },

    #[error("sort key '{path}' is not a grouping path")]
    UngroupedSort { path: String },

    #[error("'{path}' is not an attribute of {entity}")]
    ForeignPath { entity: &'static str, path: String },
}
