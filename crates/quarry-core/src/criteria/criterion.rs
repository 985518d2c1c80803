use crate::expr::{Expression, InvalidExpression};
use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{BitAnd, BitOr, Not},
};

///
/// Criterion
///
/// Immutable typed predicate over record `R`.
/// Combinators return new criteria; the wrapped expression is always in
/// simplified form.
///

pub struct Criterion<R> {
    expression: Expression,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Criterion<R> {
    /// Always-true criterion.
    #[must_use]
    pub const fn all() -> Self {
        Self::from_expression(Expression::truth(true))
    }

    /// Always-false criterion.
    #[must_use]
    pub const fn none() -> Self {
        Self::from_expression(Expression::truth(false))
    }

    pub(crate) const fn from_expression(expression: Expression) -> Self {
        Self {
            expression,
            _marker: PhantomData,
        }
    }

    /// Wrap an untyped expression; it must be boolean.
    pub fn try_from_expression(expression: Expression) -> Result<Self, InvalidExpression> {
        if !expression.is_boolean() {
            return Err(InvalidExpression::NotPredicate {
                expression: expression.to_string(),
            });
        }

        Ok(Self::from_expression(expression))
    }

    #[must_use]
    pub const fn expression(&self) -> &Expression {
        &self.expression
    }

    #[must_use]
    pub fn into_expression(self) -> Expression {
        self.expression
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        self.expression.is_true()
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.expression.is_false()
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::from_expression(self.expression.and(other.expression))
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::from_expression(self.expression.or(other.expression))
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::from_expression(self.expression.negate())
    }
}

impl<R> Clone for Criterion<R> {
    fn clone(&self) -> Self {
        Self::from_expression(self.expression.clone())
    }
}

impl<R> fmt::Debug for Criterion<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Criterion").field(&self.expression).finish()
    }
}

impl<R> fmt::Display for Criterion<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expression, f)
    }
}

impl<R> Eq for Criterion<R> {}

impl<R> PartialEq for Criterion<R> {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}

impl<R> Hash for Criterion<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.expression.hash(state);
    }
}

impl<R> Default for Criterion<R> {
    fn default() -> Self {
        Self::all()
    }
}

impl<R> BitAnd for Criterion<R> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<R> BitOr for Criterion<R> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl<R> Not for Criterion<R> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::not(self)
    }
}
