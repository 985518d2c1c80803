use crate::{
    expr::Expression,
    value::{Document, Value},
};
use derive_more::{Add, AddAssign, Deref, IntoIterator, Sum};
use serde::{Deserialize, Serialize};

///
/// Reply
/// One element of a result sequence.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reply {
    Document(Document),
    Tuple(ProjectedTuple),
    Count(u64),
    Written(WriteResult),
    Change(ChangeEvent),
}

impl Reply {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Tuple(_) => "tuple",
            Self::Count(_) => "count",
            Self::Written(_) => "write result",
            Self::Change(_) => "change event",
        }
    }
}

///
/// TupleEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TupleEntry {
    pub expression: Expression,
    pub value: Option<Value>,
}

///
/// ProjectedTuple
///
/// Ordered `(expression, value)` pairs produced for a projection; `None`
/// marks an absent value.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
pub struct ProjectedTuple {
    #[into_iterator(owned, ref)]
    entries: Vec<TupleEntry>,
}

impl ProjectedTuple {
    #[must_use]
    pub const fn new(entries: Vec<TupleEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn value(&self, position: usize) -> Option<&Value> {
        self.entries.get(position)?.value.as_ref()
    }
}

impl FromIterator<TupleEntry> for ProjectedTuple {
    fn from_iter<I: IntoIterator<Item = TupleEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

///
/// WriteResult
///

#[derive(
    Add, AddAssign, Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, Sum,
)]
pub struct WriteResult {
    pub inserted: u64,
    pub updated: u64,
    pub deleted: u64,
}

impl WriteResult {
    #[must_use]
    pub const fn inserted(n: u64) -> Self {
        Self {
            inserted: n,
            updated: 0,
            deleted: 0,
        }
    }

    #[must_use]
    pub const fn updated(n: u64) -> Self {
        Self {
            inserted: 0,
            updated: n,
            deleted: 0,
        }
    }

    #[must_use]
    pub const fn deleted(n: u64) -> Self {
        Self {
            inserted: 0,
            updated: 0,
            deleted: n,
        }
    }

    /// Records touched by the write.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.inserted + self.updated + self.deleted
    }
}

///
/// ChangeKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

///
/// ChangeEvent
///
/// `new_value` is present for inserts and updates, `old_value` for updates
/// and deletes.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChangeEvent<D = Document> {
    pub kind: ChangeKind,
    pub key: Value,
    pub new_value: Option<D>,
    pub old_value: Option<D>,
}

impl<D> ChangeEvent<D> {
    /// Decode both sides of the event.
    pub fn try_map<U, E>(self, mut f: impl FnMut(D) -> Result<U, E>) -> Result<ChangeEvent<U>, E> {
        Ok(ChangeEvent {
            kind: self.kind,
            key: self.key,
            new_value: self.new_value.map(&mut f).transpose()?,
            old_value: self.old_value.map(&mut f).transpose()?,
        })
    }
}
