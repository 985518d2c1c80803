use crate::expr::{Operator, Path};
use std::fmt;

///
/// Direction
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Asc => 0x01,
            Self::Desc => 0x02,
        }
    }
}

///
/// NullOrdering
///
/// Placement of absent and null values. `Default` sorts them as the
/// smallest value, so first ascending and last descending.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum NullOrdering {
    #[default]
    Default,
    First,
    Last,
}

impl NullOrdering {
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Default => 0x01,
            Self::First => 0x02,
            Self::Last => 0x03,
        }
    }
}

///
/// SortKey
///
/// Orders by the value at `path`, after applying `transforms` (text case
/// folds) innermost first.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SortKey {
    pub path: Path,
    pub transforms: Vec<Operator>,
    pub direction: Direction,
    pub nulls: NullOrdering,
}

impl SortKey {
    #[must_use]
    pub const fn new(path: Path, direction: Direction) -> Self {
        Self {
            path,
            transforms: Vec::new(),
            direction,
            nulls: NullOrdering::Default,
        }
    }

    #[must_use]
    pub(crate) fn with_transforms(mut self, transforms: Vec<Operator>) -> Self {
        self.transforms = transforms;
        self
    }

    #[must_use]
    pub const fn nulls_first(mut self) -> Self {
        self.nulls = NullOrdering::First;
        self
    }

    #[must_use]
    pub const fn nulls_last(mut self) -> Self {
        self.nulls = NullOrdering::Last;
        self
    }

    /// Resolved placement: `true` when nulls come before values.
    #[must_use]
    pub const fn nulls_come_first(&self) -> bool {
        match (self.nulls, self.direction) {
            (NullOrdering::First, _) | (NullOrdering::Default, Direction::Asc) => true,
            (NullOrdering::Last, _) | (NullOrdering::Default, Direction::Desc) => false,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        for operator in self.transforms.iter().rev() {
            write!(f, "{operator}(")?;
        }
        write!(f, "{}", self.path)?;
        for _ in &self.transforms {
            f.write_str(")")?;
        }
        write!(f, " {direction}")?;

        match self.nulls {
            NullOrdering::Default => Ok(()),
            NullOrdering::First => f.write_str(" nulls first"),
            NullOrdering::Last => f.write_str(" nulls last"),
        }
    }
}
