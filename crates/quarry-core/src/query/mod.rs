mod sort;
mod validate;

#[cfg(test)]
mod tests;

use crate::{
    expr::{
        Expression, Fingerprint, Path, hash_expression, hash_path, write_len_u32, write_str,
        write_tag, write_u64,
    },
    model::RecordModel,
    traits::Record,
};
use std::{fmt, time::Duration};

// re-exports
pub use sort::{Direction, NullOrdering, SortKey};

///
/// Page
/// Optional offset/limit window.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Page {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

///
/// Query
///
/// Compiled, immutable request handed to a backend. Every fluent mutator
/// consumes the query and returns the next value.
///
/// An absent predicate matches every record.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Query {
    model: &'static RecordModel,
    predicate: Option<Expression>,
    projections: Vec<Expression>,
    sort: Vec<SortKey>,
    page: Page,
    grouping: Vec<Path>,
    count: bool,
    distinct: bool,
    timeout: Option<Duration>,
}

impl Query {
    #[must_use]
    pub const fn new(model: &'static RecordModel) -> Self {
        Self {
            model,
            predicate: None,
            projections: Vec::new(),
            sort: Vec::new(),
            page: Page {
                offset: None,
                limit: None,
            },
            grouping: Vec::new(),
            count: false,
            distinct: false,
            timeout: None,
        }
    }

    #[must_use]
    pub fn of<R: Record>() -> Self {
        Self::new(R::model())
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Add a predicate, implicitly AND-ing with any existing predicate.
    #[must_use]
    pub fn filter(mut self, predicate: Expression) -> Self {
        let combined = match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        };
        self.predicate = (!combined.is_true()).then_some(combined);

        self
    }

    /// Replace the projection list.
    #[must_use]
    pub fn select(mut self, projections: Vec<Expression>) -> Self {
        self.projections = projections;
        self
    }

    /// Append a sort key.
    #[must_use]
    pub fn order_by(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.page.offset = Some(offset);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.page.limit = Some(limit);
        self
    }

    /// Lower the limit to at most `cap`.
    #[must_use]
    pub fn cap_limit(mut self, cap: u64) -> Self {
        self.page.limit = Some(self.page.limit.map_or(cap, |limit| limit.min(cap)));
        self
    }

    /// Append a grouping path.
    #[must_use]
    pub fn group_by(mut self, path: Path) -> Self {
        self.grouping.push(path);
        self
    }

    /// Ask the backend for the number of results instead of the results.
    #[must_use]
    pub const fn count_only(mut self) -> Self {
        self.count = true;
        self
    }

    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn model(&self) -> &'static RecordModel {
        self.model
    }

    #[must_use]
    pub const fn predicate(&self) -> Option<&Expression> {
        self.predicate.as_ref()
    }

    #[must_use]
    pub fn projections(&self) -> &[Expression] {
        &self.projections
    }

    #[must_use]
    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }

    #[must_use]
    pub const fn page(&self) -> Page {
        self.page
    }

    #[must_use]
    pub fn grouping(&self) -> &[Path] {
        &self.grouping
    }

    #[must_use]
    pub const fn is_count(&self) -> bool {
        self.count
    }

    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn is_projected(&self) -> bool {
        !self.projections.is_empty()
    }

    /// Grouped or aggregating queries evaluate projections per group.
    #[must_use]
    pub fn is_grouped(&self) -> bool {
        !self.grouping.is_empty() || self.projections.iter().any(Expression::is_aggregate)
    }

    /// Expressions whose operators an adapter must be able to translate.
    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.predicate.iter().chain(self.projections.iter())
    }

    /// SHA-256 over the query structure, for plan caches.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(|hasher| {
            write_tag(hasher, 0x40);
            write_str(hasher, self.model.name);

            match &self.predicate {
                Some(predicate) => {
                    write_tag(hasher, 0x41);
                    hash_expression(hasher, predicate);
                }
                None => write_tag(hasher, 0x42),
            }

            write_len_u32(hasher, self.projections.len());
            for projection in &self.projections {
                hash_expression(hasher, projection);
            }

            write_len_u32(hasher, self.sort.len());
            for key in &self.sort {
                hash_path(hasher, &key.path);
                write_len_u32(hasher, key.transforms.len());
                for operator in &key.transforms {
                    write_tag(hasher, operator.tag());
                }
                write_tag(hasher, key.direction.tag());
                write_tag(hasher, key.nulls.tag());
            }

            write_len_u32(hasher, self.grouping.len());
            for path in &self.grouping {
                hash_path(hasher, path);
            }

            for bound in [self.page.offset, self.page.limit] {
                match bound {
                    Some(n) => {
                        write_tag(hasher, 0x43);
                        write_u64(hasher, n);
                    }
                    None => write_tag(hasher, 0x44),
                }
            }

            write_tag(hasher, u8::from(self.count));
            write_tag(hasher, u8::from(self.distinct));
        })
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "from {}", self.model.name)?;

        if let Some(predicate) = &self.predicate {
            write!(f, " where {predicate}")?;
        }
        write_list(f, " select ", &self.projections)?;
        write_list(f, " group by ", &self.grouping)?;
        write_list(f, " order by ", &self.sort)?;

        if let Some(offset) = self.page.offset {
            write!(f, " offset {offset}")?;
        }
        if let Some(limit) = self.page.limit {
            write!(f, " limit {limit}")?;
        }
        if self.distinct {
            f.write_str(" distinct")?;
        }
        if self.count {
            f.write_str(" count")?;
        }
        if let Some(timeout) = self.timeout {
            write!(f, " timeout {timeout:?}")?;
        }

        Ok(())
    }
}

fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    items: &[T],
) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }

    f.write_str(label)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }

    Ok(())
}
