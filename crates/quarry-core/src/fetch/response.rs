use std::fmt;
use thiserror::Error as ThisError;

///
/// Expected
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Expected {
    ExactlyOne,
    AtMostOne,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactlyOne => f.write_str("exactly one"),
            Self::AtMostOne => f.write_str("at most one"),
        }
    }
}

///
/// Found
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Found {
    None,
    Many,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Many => f.write_str("more than one"),
        }
    }
}

///
/// ResponseError
/// Errors related to interpreting a result cardinality.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResponseError {
    #[error("expected {expected} row, found {found} (entity {entity})")]
    NonUniqueResult {
        entity: &'static str,
        expected: Expected,
        found: Found,
    },
}

/// Require at most one row.
pub(super) fn at_most_one<T>(
    mut rows: Vec<T>,
    entity: &'static str,
) -> Result<Option<T>, ResponseError> {
    if rows.len() > 1 {
        return Err(ResponseError::NonUniqueResult {
            entity,
            expected: Expected::AtMostOne,
            found: Found::Many,
        });
    }

    Ok(rows.pop())
}

/// Require exactly one row.
pub(super) fn exactly_one<T>(rows: Vec<T>, entity: &'static str) -> Result<T, ResponseError> {
    let too_many = || ResponseError::NonUniqueResult {
        entity,
        expected: Expected::ExactlyOne,
        found: Found::Many,
    };

    match at_most_one(rows, entity) {
        Ok(Some(row)) => Ok(row),
        Ok(None) => Err(ResponseError::NonUniqueResult {
            entity,
            expected: Expected::ExactlyOne,
            found: Found::None,
        }),
        Err(_) => Err(too_many()),
    }
}
