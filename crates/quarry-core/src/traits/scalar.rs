use crate::{
    criteria::Attribute,
    model::Kind,
    traits::{AttributeType, Comparable, DecodeError, FieldValue, Numeric, load_required},
    value::{Float64, Value},
};
use time::{Date, OffsetDateTime};
use ulid::Ulid;

// Required scalar attribute: the Rust type is both operand and storage.
macro_rules! impl_scalar {
    ($ty:ty, $kind:ident, |$v:ident| $to:expr, $from:pat => $out:expr) => {
        impl AttributeType for $ty {
            type Operand = Self;
            type Stored = Self;
            type Accessor<R: 'static> = Attribute<R, Self>;

            fn kind() -> Kind {
                Kind::$kind
            }

            fn store(stored: &Self) -> Option<Value> {
                Some(stored.to_value())
            }

            fn load(value: Option<&Value>) -> Result<Self, DecodeError> {
                load_required(value)
            }
        }

        impl FieldValue for $ty {
            fn to_value(&self) -> Value {
                let $v = self;
                $to
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    $from => $out,
                    _ => None,
                }
            }
        }

        impl Comparable for $ty {}
    };
}

impl_scalar!(bool, Bool, |v| Value::Bool(*v), Value::Bool(v) => Some(*v));
impl_scalar!(i32, Int, |v| Value::Int(i64::from(*v)), Value::Int(v) => Self::try_from(*v).ok());
impl_scalar!(i64, Int, |v| Value::Int(*v), Value::Int(v) => Some(*v));
impl_scalar!(u32, Uint, |v| Value::Uint(u64::from(*v)), Value::Uint(v) => Self::try_from(*v).ok());
impl_scalar!(u64, Uint, |v| Value::Uint(*v), Value::Uint(v) => Some(*v));
impl_scalar!(
    f64,
    Float,
    |v| Float64::try_new(*v).map_or(Value::Null, Value::Float),
    Value::Float(v) => Some(v.get())
);
impl_scalar!(Float64, Float, |v| Value::Float(*v), Value::Float(v) => Some(*v));
impl_scalar!(String, Text, |v| Value::Text(v.clone()), Value::Text(v) => Some(v.clone()));
impl_scalar!(Date, Date, |v| Value::Date(*v), Value::Date(v) => Some(*v));
impl_scalar!(OffsetDateTime, Timestamp, |v| Value::Timestamp(*v), Value::Timestamp(v) => Some(*v));
impl_scalar!(Ulid, Ulid, |v| Value::Ulid(*v), Value::Ulid(v) => Some(*v));

impl Numeric for i32 {}
impl Numeric for i64 {}
impl Numeric for u32 {}
impl Numeric for u64 {}
impl Numeric for f64 {}
impl Numeric for Float64 {}
