use crate::{
    criteria::{Aggregate, Criterion, Nullable},
    expr::{Expression, Operator, Path},
    query::{Direction, SortKey},
    traits::{Accessor, AttributeType, Comparable, FieldValue, Numeric},
    value::{Value, strict_order_cmp},
};
use regex::Regex;
use std::{cmp::Ordering, fmt, marker::PhantomData};

///
/// Attribute
///
/// Typed accessor for one attribute of record `R` whose declared type is `A`.
/// Operator methods are available according to `A`'s type class.
///

pub struct Attribute<R, A> {
    path: Path,
    transforms: Vec<Operator>,
    _marker: PhantomData<fn() -> (R, A)>,
}

impl<R, A> Clone for Attribute<R, A> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            transforms: self.transforms.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R, A> fmt::Debug for Attribute<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Attribute").field(&self.path).finish()
    }
}

impl<R: 'static, A: AttributeType> Accessor<R> for Attribute<R, A> {
    fn rooted(path: Path) -> Self {
        Self {
            path,
            transforms: Vec::new(),
            _marker: PhantomData,
        }
    }
}

// ---------------------------------------------------------------------
// Every attribute
// ---------------------------------------------------------------------

impl<R, A: AttributeType> Attribute<R, A> {
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// True once `to_upper` / `to_lower` has been applied.
    #[must_use]
    pub fn is_transformed(&self) -> bool {
        !self.transforms.is_empty()
    }

    /// The path wrapped in any applied transforms.
    #[must_use]
    pub fn expression(&self) -> Expression {
        self.transforms
            .iter()
            .fold(Expression::path(self.path.clone()), |inner, operator| {
                Expression::typed(*operator, vec![inner])
            })
    }

    fn operand(value: impl Into<A::Operand>) -> Expression {
        Expression::constant(
            value.into().to_value(),
            <A::Operand as AttributeType>::kind(),
        )
    }

    fn predicate(&self, operator: Operator, rest: Vec<Expression>) -> Criterion<R> {
        let mut args = Vec::with_capacity(rest.len() + 1);
        args.push(self.expression());
        args.extend(rest);

        Criterion::from_expression(Expression::typed(operator, args))
    }

    #[must_use]
    pub fn is(&self, value: impl Into<A::Operand>) -> Criterion<R> {
        self.predicate(Operator::Equal, vec![Self::operand(value)])
    }

    #[must_use]
    pub fn is_not(&self, value: impl Into<A::Operand>) -> Criterion<R> {
        self.predicate(Operator::NotEqual, vec![Self::operand(value)])
    }

    #[must_use]
    pub fn in_<V: Into<A::Operand>>(&self, values: impl IntoIterator<Item = V>) -> Criterion<R> {
        let values = values.into_iter().map(Self::operand).collect();

        self.predicate(Operator::In, values)
    }

    #[must_use]
    pub fn not_in<V: Into<A::Operand>>(&self, values: impl IntoIterator<Item = V>) -> Criterion<R> {
        let values = values.into_iter().map(Self::operand).collect();

        self.predicate(Operator::NotIn, values)
    }

    /// Number of present, non-null values (per group when grouped).
    #[must_use]
    pub fn count(&self) -> Aggregate<R, u64> {
        Aggregate::new(Operator::Count, self.expression())
    }
}

// ---------------------------------------------------------------------
// Comparable
// ---------------------------------------------------------------------

impl<R, A> Attribute<R, A>
where
    A: AttributeType,
    A::Operand: Comparable,
{
    #[must_use]
    pub fn greater_than(&self, value: impl Into<A::Operand>) -> Criterion<R> {
        self.predicate(Operator::Greater, vec![Self::operand(value)])
    }

    #[must_use]
    pub fn less_than(&self, value: impl Into<A::Operand>) -> Criterion<R> {
        self.predicate(Operator::Less, vec![Self::operand(value)])
    }

    #[must_use]
    pub fn at_least(&self, value: impl Into<A::Operand>) -> Criterion<R> {
        self.predicate(Operator::GreaterEqual, vec![Self::operand(value)])
    }

    #[must_use]
    pub fn at_most(&self, value: impl Into<A::Operand>) -> Criterion<R> {
        self.predicate(Operator::LessEqual, vec![Self::operand(value)])
    }

    /// Inclusive range; an inverted range matches nothing.
    #[must_use]
    pub fn between(
        &self,
        lower: impl Into<A::Operand>,
        upper: impl Into<A::Operand>,
    ) -> Criterion<R> {
        let (lower, upper) = (lower.into(), upper.into());
        if strict_order_cmp(&lower.to_value(), &upper.to_value()) == Some(Ordering::Greater) {
            return Criterion::none();
        }

        self.at_least(lower).and(self.at_most(upper))
    }

    /// Ascending; applied `to_upper` / `to_lower` carry into the key.
    #[must_use]
    pub fn asc(&self) -> SortKey {
        SortKey::new(self.path.clone(), Direction::Asc).with_transforms(self.transforms.clone())
    }

    #[must_use]
    pub fn desc(&self) -> SortKey {
        SortKey::new(self.path.clone(), Direction::Desc).with_transforms(self.transforms.clone())
    }

    #[must_use]
    pub fn min(&self) -> Aggregate<R, Option<A::Operand>> {
        Aggregate::new(Operator::Min, self.expression())
    }

    #[must_use]
    pub fn max(&self) -> Aggregate<R, Option<A::Operand>> {
        Aggregate::new(Operator::Max, self.expression())
    }
}

// ---------------------------------------------------------------------
// Numeric
// ---------------------------------------------------------------------

impl<R, A> Attribute<R, A>
where
    A: AttributeType,
    A::Operand: Numeric,
{
    #[must_use]
    pub fn sum(&self) -> Aggregate<R, Option<A::Operand>> {
        Aggregate::new(Operator::Sum, self.expression())
    }

    #[must_use]
    pub fn avg(&self) -> Aggregate<R, Option<f64>> {
        Aggregate::new(Operator::Avg, self.expression())
    }
}

// ---------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------

// Presence tests the stored attribute; case transforms never change it.
impl<R, A> Attribute<R, A> {
    fn presence(&self, operator: Operator) -> Criterion<R> {
        let path = Expression::path(self.path.clone());

        Criterion::from_expression(Expression::typed(operator, vec![path]))
    }
}

impl<R, T: FieldValue> Attribute<R, Option<T>> {
    /// The attribute is stored (missing semantics).
    #[must_use]
    pub fn is_present(&self) -> Criterion<R> {
        self.presence(Operator::IsPresent)
    }

    #[must_use]
    pub fn is_absent(&self) -> Criterion<R> {
        self.presence(Operator::IsAbsent)
    }
}

impl<R, T: FieldValue> Attribute<R, Nullable<T>> {
    /// The attribute holds a non-null value (stored-null semantics).
    #[must_use]
    pub fn is_present(&self) -> Criterion<R> {
        self.presence(Operator::IsNotNull)
    }

    #[must_use]
    pub fn is_absent(&self) -> Criterion<R> {
        self.presence(Operator::IsNull)
    }
}

// ---------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------

macro_rules! impl_text_attribute {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<R> Attribute<R, $ty> {
                #[must_use]
                pub fn contains(&self, text: impl Into<String>) -> Criterion<R> {
                    self.predicate(Operator::Contains, vec![text_operand(text)])
                }

                #[must_use]
                pub fn starts_with(&self, text: impl Into<String>) -> Criterion<R> {
                    self.predicate(Operator::StartsWith, vec![text_operand(text)])
                }

                #[must_use]
                pub fn ends_with(&self, text: impl Into<String>) -> Criterion<R> {
                    self.predicate(Operator::EndsWith, vec![text_operand(text)])
                }

                /// Unanchored regular-expression search.
                #[must_use]
                pub fn matches(&self, pattern: &Regex) -> Criterion<R> {
                    self.predicate(Operator::Matches, vec![text_operand(pattern.as_str())])
                }

                #[must_use]
                pub fn is_empty(&self) -> Criterion<R> {
                    self.has_length(0)
                }

                #[must_use]
                pub fn not_empty(&self) -> Criterion<R> {
                    self.predicate(Operator::Greater, vec![text_operand("")])
                }

                #[must_use]
                pub fn has_length(&self, length: usize) -> Criterion<R> {
                    self.predicate(Operator::HasLength, vec![uint_operand(length)])
                }

                #[must_use]
                pub fn to_upper(&self) -> Self {
                    self.transformed(Operator::ToUpper)
                }

                #[must_use]
                pub fn to_lower(&self) -> Self {
                    self.transformed(Operator::ToLower)
                }
            }
        )*
    };
}

impl_text_attribute!(String, Option<String>, Nullable<String>);

impl<R, A> Attribute<R, A> {
    fn transformed(&self, operator: Operator) -> Self {
        let mut next = self.clone();
        next.transforms.push(operator);

        next
    }
}

fn text_operand(text: impl Into<String>) -> Expression {
    Expression::constant(Value::Text(text.into()), <String as AttributeType>::kind())
}

fn uint_operand(n: usize) -> Expression {
    Expression::constant(
        Value::Uint(u64::try_from(n).unwrap_or(u64::MAX)),
        <u64 as AttributeType>::kind(),
    )
}

// ---------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------

impl<R, T: FieldValue> Attribute<R, Vec<T>> {
    #[must_use]
    pub fn is_empty(&self) -> Criterion<R> {
        self.has_size(0)
    }

    #[must_use]
    pub fn not_empty(&self) -> Criterion<R> {
        self.has_size(0).not()
    }

    #[must_use]
    pub fn has_size(&self, size: usize) -> Criterion<R> {
        self.predicate(Operator::HasSize, vec![uint_operand(size)])
    }

    /// The collection holds `element`.
    #[must_use]
    pub fn contains(&self, element: impl Into<T>) -> Criterion<R> {
        let element = Expression::constant(element.into().to_value(), T::kind());

        self.predicate(Operator::Contains, vec![element])
    }

    /// Every element satisfies `sub`; vacuously true when empty.
    #[must_use]
    pub fn all(&self, sub: impl FnOnce(T::Accessor<T>) -> Criterion<T>) -> Criterion<R> {
        self.scoped(Operator::All, sub)
    }

    /// At least one element satisfies `sub`.
    #[must_use]
    pub fn any(&self, sub: impl FnOnce(T::Accessor<T>) -> Criterion<T>) -> Criterion<R> {
        self.scoped(Operator::Any, sub)
    }

    /// No element satisfies `sub`.
    #[must_use]
    pub fn none(&self, sub: impl FnOnce(T::Accessor<T>) -> Criterion<T>) -> Criterion<R> {
        self.scoped(Operator::None, sub)
    }

    /// Accessor for the element at `index`.
    #[must_use]
    pub fn at(&self, index: usize) -> T::Accessor<R>
    where
        R: 'static,
    {
        <T::Accessor<R> as Accessor<R>>::rooted(self.path.index(index, T::kind()))
    }

    fn scoped(
        &self,
        operator: Operator,
        sub: impl FnOnce(T::Accessor<T>) -> Criterion<T>,
    ) -> Criterion<R> {
        let element = <T::Accessor<T> as Accessor<T>>::rooted(Path::element(T::kind()));
        let sub = sub(element).into_expression();

        self.predicate(operator, vec![sub])
    }
}
