mod scalar;


use crate::{
    criteria::Nullable,
    expr::Path,
    mapper::ProjectionError,
    model::{Kind, RecordModel},
    value::{Document, Value},
};
use std::fmt;

///
/// Accessor
///
/// Typed handle over a path of record `R`; built from the path it is rooted at.
///

pub trait Accessor<R>: Clone {
    fn rooted(path: Path) -> Self;
}

///
/// AttributeType
///
/// Binds the declared Rust type of an attribute to its stored kind, the
/// operand type its criteria accept, and its accessor.
///
/// `Stored` is the Rust representation held by the record; `store` returns
/// `None` when the attribute is absent from the document.
///

pub trait AttributeType: Sized + 'static {
    type Operand: FieldValue;
    type Stored: Clone + Send + Sync + 'static;
    type Accessor<R: 'static>: Accessor<R>;

    fn kind() -> Kind;

    fn store(stored: &Self::Stored) -> Option<Value>;

    fn load(value: Option<&Value>) -> Result<Self::Stored, DecodeError>;
}

///
/// FieldValue
///
/// A concrete value type convertible to and from the wire `Value`.
///

pub trait FieldValue: AttributeType + Clone + Send + Sync {
    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

///
/// Comparable
/// Marker for operand types with a natural order.
///

pub trait Comparable: FieldValue {}

///
/// Numeric
/// Marker for operand types that can be summed and averaged.
///

pub trait Numeric: Comparable {}

///
/// Record
///
/// A schema-declared record type. Implemented by `#[derive(Record)]`.
///

pub trait Record: FieldValue {
    type Criteria: Accessor<Self>;

    fn model() -> &'static RecordModel;

    fn to_document(&self) -> Document;

    fn from_document(document: &Document) -> Result<Self, ProjectionError>;

    /// Value of the identity attribute, if the record declares one.
    fn identity(&self) -> Option<Value>;

    /// Criteria accessors rooted at the record itself.
    #[must_use]
    fn criteria() -> Self::Criteria {
        Self::Criteria::rooted(Path::root(Self::model()))
    }
}

///
/// DecodeError
///
/// Value-level decode failure; callers attach the path.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    Missing,
    Mismatch { found: &'static str },
}

impl DecodeError {
    /// Lift into a `ProjectionError` at `path`.
    #[must_use]
    pub fn at(self, path: impl fmt::Display, expected: &Kind) -> ProjectionError {
        match self {
            Self::Missing => ProjectionError::Missing {
                path: path.to_string(),
            },
            Self::Mismatch { found } => ProjectionError::Type {
                path: path.to_string(),
                expected: expected.clone(),
                found,
            },
        }
    }
}

/// Decode a required attribute; absent and stored null are both missing.
pub fn load_required<T: FieldValue>(value: Option<&Value>) -> Result<T, DecodeError> {
    match value {
        None | Some(Value::Null) => Err(DecodeError::Missing),
        Some(value) => T::from_value(value).ok_or(DecodeError::Mismatch {
            found: value.label(),
        }),
    }
}

/// Decode an attribute where absent and null both mean `None`.
pub fn load_optional<T: FieldValue>(value: Option<&Value>) -> Result<Option<T>, DecodeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::from_value(value)
            .map(Some)
            .ok_or(DecodeError::Mismatch {
                found: value.label(),
            }),
    }
}

/// Decode the attribute `name` of `document` as `A`.
pub fn load_field<A: AttributeType>(
    document: &Document,
    name: &str,
) -> Result<A::Stored, ProjectionError> {
    A::load(document.get(name)).map_err(|err| err.at(name, &A::kind()))
}

///
/// Option<T>
/// Optional attribute: `None` is stored as absence.
///

impl<T: FieldValue> AttributeType for Option<T> {
    type Operand = T;
    type Stored = Self;
    type Accessor<R: 'static> = crate::criteria::Attribute<R, Self>;

    fn kind() -> Kind {
        Kind::optional(T::kind())
    }

    fn store(stored: &Self) -> Option<Value> {
        stored.as_ref().map(FieldValue::to_value)
    }

    fn load(value: Option<&Value>) -> Result<Self, DecodeError> {
        load_optional(value)
    }
}

///
/// Nullable<T>
/// Nullable attribute: `None` is stored as an explicit null.
///

impl<T: FieldValue> AttributeType for Nullable<T> {
    type Operand = T;
    type Stored = Option<T>;
    type Accessor<R: 'static> = crate::criteria::Attribute<R, Self>;

    fn kind() -> Kind {
        Kind::nullable(T::kind())
    }

    fn store(stored: &Option<T>) -> Option<Value> {
        Some(stored.as_ref().map_or(Value::Null, FieldValue::to_value))
    }

    fn load(value: Option<&Value>) -> Result<Option<T>, DecodeError> {
        load_optional(value)
    }
}

///
/// Vec<T>
/// Collection attribute.
///

impl<T: FieldValue> AttributeType for Vec<T> {
    type Operand = Self;
    type Stored = Self;
    type Accessor<R: 'static> = crate::criteria::Attribute<R, Self>;

    fn kind() -> Kind {
        Kind::list(T::kind())
    }

    fn store(stored: &Self) -> Option<Value> {
        Some(stored.to_value())
    }

    fn load(value: Option<&Value>) -> Result<Self, DecodeError> {
        load_required(value)
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}
