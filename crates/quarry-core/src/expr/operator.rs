use std::fmt;

///
/// Operator
///
/// Closed operator set of the expression IR. Adapters match exhaustively.
///

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Operator {
    // logical
    And = 0x01,
    Or = 0x02,
    Not = 0x03,

    // equality / comparison
    Equal = 0x10,
    NotEqual = 0x11,
    Less = 0x12,
    LessEqual = 0x13,
    Greater = 0x14,
    GreaterEqual = 0x15,

    // membership
    In = 0x20,
    NotIn = 0x21,

    // presence
    IsPresent = 0x30,
    IsAbsent = 0x31,
    IsNotNull = 0x32,
    IsNull = 0x33,

    // string
    Contains = 0x40,
    StartsWith = 0x41,
    EndsWith = 0x42,
    Matches = 0x43,
    HasLength = 0x44,
    ToUpper = 0x45,
    ToLower = 0x46,

    // collection
    HasSize = 0x50,
    All = 0x51,
    Any = 0x52,
    None = 0x53,
    At = 0x54,

    // aggregation
    Sum = 0x60,
    Avg = 0x61,
    Min = 0x62,
    Max = 0x63,
    Count = 0x64,
}

///
/// Arity
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    #[must_use]
    pub const fn admits(self, count: usize) -> bool {
        match self {
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "exactly {n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

///
/// ResultKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResultKind {
    Boolean,
    Scalar,
    Aggregate,
}

impl Operator {
    pub const ALL: [Self; 32] = [
        Self::And,
        Self::Or,
        Self::Not,
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessEqual,
        Self::Greater,
        Self::GreaterEqual,
        Self::In,
        Self::NotIn,
        Self::IsPresent,
        Self::IsAbsent,
        Self::IsNotNull,
        Self::IsNull,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::Matches,
        Self::HasLength,
        Self::ToUpper,
        Self::ToLower,
        Self::HasSize,
        Self::All,
        Self::Any,
        Self::None,
        Self::At,
        Self::Sum,
        Self::Avg,
        Self::Min,
        Self::Max,
        Self::Count,
    ];

    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::And | Self::Or | Self::In | Self::NotIn => Arity::AtLeast(1),
            Self::Not
            | Self::IsPresent
            | Self::IsAbsent
            | Self::IsNotNull
            | Self::IsNull
            | Self::ToUpper
            | Self::ToLower
            | Self::Sum
            | Self::Avg
            | Self::Min
            | Self::Max
            | Self::Count => Arity::Exactly(1),
            Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::LessEqual
            | Self::Greater
            | Self::GreaterEqual
            | Self::Contains
            | Self::StartsWith
            | Self::EndsWith
            | Self::Matches
            | Self::HasLength
            | Self::HasSize
            | Self::All
            | Self::Any
            | Self::None
            | Self::At => Arity::Exactly(2),
        }
    }

    #[must_use]
    pub const fn result(self) -> ResultKind {
        match self {
            Self::ToUpper | Self::ToLower | Self::At => ResultKind::Scalar,
            Self::Sum | Self::Avg | Self::Min | Self::Max | Self::Count => ResultKind::Aggregate,
            _ => ResultKind::Boolean,
        }
    }

    #[must_use]
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Not)
    }

    #[must_use]
    pub const fn is_aggregate(self) -> bool {
        matches!(self.result(), ResultKind::Aggregate)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::Less => "LESS",
            Self::LessEqual => "LESS_EQUAL",
            Self::Greater => "GREATER",
            Self::GreaterEqual => "GREATER_EQUAL",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
            Self::IsPresent => "IS_PRESENT",
            Self::IsAbsent => "IS_ABSENT",
            Self::IsNotNull => "IS_NOT_NULL",
            Self::IsNull => "IS_NULL",
            Self::Contains => "CONTAINS",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::Matches => "MATCHES",
            Self::HasLength => "HAS_LENGTH",
            Self::ToUpper => "TO_UPPER",
            Self::ToLower => "TO_LOWER",
            Self::HasSize => "HAS_SIZE",
            Self::All => "ALL",
            Self::Any => "ANY",
            Self::None => "NONE",
            Self::At => "AT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Count => "COUNT",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
