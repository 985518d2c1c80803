mod error;
mod fingerprint;
mod operator;
mod path;
mod semantics;
mod simplify;
mod validate;


use crate::{model::Kind, value::Value};
use std::fmt;

// re-exports
pub use error::InvalidExpression;
pub use fingerprint::Fingerprint;
pub use operator::{Arity, Operator, ResultKind};
pub use path::{Path, PathRoot, Segment, Step};
pub use semantics::compare;

pub(crate) use fingerprint::{
    hash_expression, hash_path, write_len_u32, write_str, write_tag, write_u64,
};

///
/// Constant
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Constant {
    pub value: Value,
    pub kind: Kind,
}

///
/// Expression
///
/// Language-neutral IR of predicates, projections, and aggregations.
/// Expressions are immutable and value-equal; every constructor returns the
/// simplified form.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Expression {
    Constant(Constant),
    Path(Path),
    Call { operator: Operator, args: Vec<Self> },
}

impl Expression {
    #[must_use]
    pub const fn truth(value: bool) -> Self {
        Self::Constant(Constant {
            value: Value::Bool(value),
            kind: Kind::Bool,
        })
    }

    #[must_use]
    pub const fn constant(value: Value, kind: Kind) -> Self {
        Self::Constant(Constant { value, kind })
    }

    #[must_use]
    pub const fn path(path: Path) -> Self {
        Self::Path(path)
    }

    /// Validate and build an operator application.
    pub fn call(operator: Operator, args: Vec<Self>) -> Result<Self, InvalidExpression> {
        validate::check_call(operator, &args)?;

        Ok(simplify::simplify(operator, args))
    }

    // Typed DSL entry point; the accessor's trait bounds already guarantee
    // the operands are well-kinded.
    pub(crate) fn typed(operator: Operator, args: Vec<Self>) -> Self {
        debug_assert!(
            validate::check_call(operator, &args).is_ok(),
            "typed call {operator} should be well-kinded"
        );

        simplify::simplify(operator, args)
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::typed(Operator::And, vec![self, other])
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::typed(Operator::Or, vec![self, other])
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::typed(Operator::Not, vec![self])
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Constant(Constant {
                value: Value::Bool(value),
                ..
            }) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_true(&self) -> bool {
        matches!(self.as_bool(), Some(true))
    }

    #[must_use]
    pub const fn is_false(&self) -> bool {
        matches!(self.as_bool(), Some(false))
    }

    #[must_use]
    pub const fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_constant(&self) -> Option<&Constant> {
        match self {
            Self::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    /// Static kind of the expression result.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Constant(constant) => constant.kind.clone(),
            Self::Path(path) => path.kind(),
            Self::Call { operator, args } => call_kind(*operator, args),
        }
    }

    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.kind().scalar() == &Kind::Bool
    }

    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        matches!(self, Self::Call { operator, .. } if operator.is_aggregate())
    }

    /// Depth-first search for the first operator rejected by `supported`.
    #[must_use]
    pub fn first_unsupported(&self, supported: impl Fn(Operator) -> bool) -> Option<Operator> {
        self.find_operator(&supported)
    }

    fn find_operator(&self, supported: &dyn Fn(Operator) -> bool) -> Option<Operator> {
        match self {
            Self::Constant(_) | Self::Path(_) => None,
            Self::Call { operator, args } => {
                if !supported(*operator) {
                    return Some(*operator);
                }

                args.iter().find_map(|arg| arg.find_operator(supported))
            }
        }
    }

    /// Paths rooted outside collection sub-criteria, in visit order.
    #[must_use]
    pub fn rooted_paths(&self) -> Vec<&Path> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);

        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a Path>) {
        match self {
            Self::Constant(_) => {}
            Self::Path(path) => out.push(path),
            Self::Call { operator, args } => {
                let scoped = matches!(operator, Operator::All | Operator::Any | Operator::None);
                for (position, arg) in args.iter().enumerate() {
                    // sub-criteria paths are element-rooted
                    if scoped && position == 1 {
                        continue;
                    }
                    arg.collect_paths(out);
                }
            }
        }
    }

    /// SHA-256 of the structural form.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(|hasher| hash_expression(hasher, self))
    }
}

fn call_kind(operator: Operator, args: &[Expression]) -> Kind {
    let first = args.first().map(Expression::kind);

    match operator {
        Operator::ToUpper | Operator::ToLower => Kind::Text,
        Operator::At => {
            let element = first
                .as_ref()
                .and_then(Kind::element)
                .cloned()
                .unwrap_or(Kind::Bool);
            Kind::optional(element)
        }
        Operator::Count => Kind::Uint,
        Operator::Avg => Kind::optional(Kind::Float),
        Operator::Sum | Operator::Min | Operator::Max => {
            Kind::optional(first.map_or(Kind::Bool, |kind| kind.scalar().clone()))
        }
        _ => Kind::Bool,
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(constant) => write!(f, "{}", constant.value),
            Self::Path(path) => write!(f, "{path}"),
            Self::Call { operator, args } => {
                write!(f, "{operator}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}
