use crate::{model::RecordModel, value::Value};
use std::fmt;

///
/// Kind
///
/// Static logical type of an attribute.
///

#[derive(Clone, Eq, Hash, PartialEq)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Date,
    Timestamp,
    Ulid,
    Optional(Box<Self>),
    Nullable(Box<Self>),
    List(Box<Self>),
    Record(&'static RecordModel),
}

impl Kind {
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    #[must_use]
    pub fn nullable(inner: Self) -> Self {
        Self::Nullable(Box::new(inner))
    }

    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    /// Strip `Optional` / `Nullable` wrappers.
    #[must_use]
    pub fn scalar(&self) -> &Self {
        match self {
            Self::Optional(inner) | Self::Nullable(inner) => inner.scalar(),
            other => other,
        }
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    #[must_use]
    pub fn is_comparable(&self) -> bool {
        matches!(
            self.scalar(),
            Self::Bool
                | Self::Int
                | Self::Uint
                | Self::Float
                | Self::Text
                | Self::Date
                | Self::Timestamp
                | Self::Ulid
        )
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.scalar(), Self::Int | Self::Uint | Self::Float)
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.scalar(), Self::Text)
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self.scalar(), Self::List(_))
    }

    /// Element kind of a collection.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self.scalar() {
            Self::List(element) => Some(element),
            _ => None,
        }
    }

    /// Two kinds share a logical type once wrappers are stripped.
    #[must_use]
    pub fn same_logical(&self, other: &Self) -> bool {
        self.scalar() == other.scalar()
    }

    /// Does `value` conform to this kind?
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Optional(_) | Self::Nullable(_), Value::Null) => true,
            (Self::Optional(inner) | Self::Nullable(inner), other) => inner.accepts(other),
            (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Uint, Value::Uint(_))
            | (Self::Float, Value::Float(_))
            | (Self::Text, Value::Text(_))
            | (Self::Date, Value::Date(_))
            | (Self::Timestamp, Value::Timestamp(_))
            | (Self::Ulid, Value::Ulid(_)) => true,
            (Self::List(element), Value::List(items)) => {
                items.iter().all(|item| element.accepts(item))
            }
            (Self::Record(model), Value::Record(doc)) => model.validate_document(doc).is_ok(),
            _ => false,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Uint => f.write_str("uint"),
            Self::Float => f.write_str("float"),
            Self::Text => f.write_str("text"),
            Self::Date => f.write_str("date"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Ulid => f.write_str("ulid"),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::Nullable(inner) => write!(f, "nullable<{inner}>"),
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Record(model) => write!(f, "record<{}>", model.name),
        }
    }
}
