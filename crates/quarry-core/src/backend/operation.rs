use crate::{
    expr::Path,
    query::Query,
    value::{Document, Value},
};
use std::fmt;

///
/// Assignment
/// Set the value at a path; `None` removes an optional attribute.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment {
    pub path: Path,
    pub value: Option<Value>,
}

///
/// Change
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Change {
    Assign(Vec<Assignment>),
    Replace(Document),
}

///
/// Operation
///
/// Typed request executed by a session.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    Insert { documents: Vec<Document> },
    Update { query: Query, change: Change },
    Delete { query: Query },
    Select(Query),
    Watch(Query),
}

///
/// OperationKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationKind {
    Insert,
    Update,
    Delete,
    Select,
    Watch,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Select => "select",
            Self::Watch => "watch",
        };

        f.write_str(label)
    }
}

impl Operation {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Insert { .. } => OperationKind::Insert,
            Self::Update { .. } => OperationKind::Update,
            Self::Delete { .. } => OperationKind::Delete,
            Self::Select(_) => OperationKind::Select,
            Self::Watch(_) => OperationKind::Watch,
        }
    }

    #[must_use]
    pub const fn query(&self) -> Option<&Query> {
        match self {
            Self::Insert { .. } => None,
            Self::Update { query, .. }
            | Self::Delete { query }
            | Self::Select(query)
            | Self::Watch(query) => Some(query),
        }
    }
}
