use super::eval::{Program, Scope, resolve};
use crate::{
    Error,
    backend::{BackendError, ProjectedTuple, Reply, TupleEntry},
    expr::{Expression, Operator, Path},
    query::{Direction, Page, Query, SortKey},
    value::{Document, Float64, Value, canonical_cmp},
};
use std::{
    borrow::Cow,
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
    time::{Duration, Instant},
};

/// Stored documents keyed by identity.
pub(super) type Rows = BTreeMap<Value, Document>;

///
/// Deadline
/// Per-operation time budget, started at first poll.
///

#[derive(Clone, Copy, Debug)]
pub(super) struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub(super) fn start(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub(super) fn check(&self) -> Result<(), Error> {
        match self.budget {
            Some(budget) if self.started.elapsed() >= budget => Err(Error::Timeout(budget)),
            _ => Ok(()),
        }
    }
}

/// Run a select query over `rows`.
///
/// Pipeline: filter, then group or sort, then project, then distinct, then
/// offset and limit, then count.
pub(super) fn select(
    rows: &Rows,
    query: &Query,
    program: &Program,
    deadline: Deadline,
) -> Result<Vec<Reply>, Error> {
    let mut replies = if query.is_grouped() {
        grouped(&filtered(rows, query, program, deadline)?, query, program)?
    } else {
        sorted(rows, query, program, deadline)?
            .into_iter()
            .map(|(_, document)| project(document, query, program))
            .collect()
    };

    if query.is_distinct() {
        let mut seen = HashSet::new();
        replies.retain(|reply| seen.insert(distinct_key(reply)));
    }

    let replies = paginate(replies, query.page());
    if query.is_count() {
        let count = u64::try_from(replies.len()).unwrap_or(u64::MAX);
        return Ok(vec![Reply::Count(count)]);
    }

    Ok(replies)
}

/// Matching rows in query order, paged; the write path's view of a query.
pub(super) fn targets<'a>(
    rows: &'a Rows,
    query: &Query,
    program: &Program,
    deadline: Deadline,
) -> Result<Vec<(&'a Value, &'a Document)>, Error> {
    Ok(paginate(sorted(rows, query, program, deadline)?, query.page()))
}

fn filtered<'a>(
    rows: &'a Rows,
    query: &Query,
    program: &Program,
    deadline: Deadline,
) -> Result<Vec<(&'a Value, &'a Document)>, Error> {
    let mut out = Vec::new();
    for (key, document) in rows {
        deadline.check()?;
        if program.matches(query.predicate(), document) {
            out.push((key, document));
        }
    }

    Ok(out)
}

fn sorted<'a>(
    rows: &'a Rows,
    query: &Query,
    program: &Program,
    deadline: Deadline,
) -> Result<Vec<(&'a Value, &'a Document)>, Error> {
    let mut matched = filtered(rows, query, program, deadline)?;

    // stable: ties keep identity order
    if !query.sort().is_empty() {
        matched.sort_by(|&(_, left), &(_, right)| {
            compare_keys(query.sort(), |path| resolve(path, Scope::Document(left)), |path| {
                resolve(path, Scope::Document(right))
            })
        });
    }

    Ok(matched)
}

fn compare_keys<'a>(
    keys: &[SortKey],
    left: impl Fn(&Path) -> Option<&'a Value>,
    right: impl Fn(&Path) -> Option<&'a Value>,
) -> Ordering {
    keys.iter()
        .map(|key| {
            let left = folded(key, left(&key.path));
            let right = folded(key, right(&key.path));

            order(key, left.as_deref(), right.as_deref())
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

// Apply the key's case transforms; non-text values pass through.
fn folded<'a>(key: &SortKey, value: Option<&'a Value>) -> Option<Cow<'a, Value>> {
    key.transforms
        .iter()
        .fold(value.map(Cow::Borrowed), |value, operator| {
            let value = value?;
            let text = match operator {
                Operator::ToUpper => value.as_text().map(str::to_uppercase),
                Operator::ToLower => value.as_text().map(str::to_lowercase),
                _ => None,
            };

            Some(text.map_or(value, |text| Cow::Owned(Value::Text(text))))
        })
}

// Absent and null sort together, placed by the key's null ordering.
fn order(key: &SortKey, left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let left = left.filter(|value| !value.is_null());
    let right = right.filter(|value| !value.is_null());
    let nulls = if key.nulls_come_first() {
        Ordering::Less
    } else {
        Ordering::Greater
    };

    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => nulls,
        (Some(_), None) => nulls.reverse(),
        (Some(left), Some(right)) => match key.direction {
            Direction::Asc => canonical_cmp(left, right),
            Direction::Desc => canonical_cmp(left, right).reverse(),
        },
    }
}

fn project(document: &Document, query: &Query, program: &Program) -> Reply {
    if !query.is_projected() {
        return Reply::Document(document.clone());
    }

    Reply::Tuple(
        query
            .projections()
            .iter()
            .map(|expression| TupleEntry {
                expression: expression.clone(),
                value: program
                    .value(expression, Scope::Document(document))
                    .map(Cow::into_owned),
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------

type GroupKey = Vec<Option<Value>>;

fn grouped(
    matched: &[(&Value, &Document)],
    query: &Query,
    program: &Program,
) -> Result<Vec<Reply>, Error> {
    let grouping = query.grouping();
    let mut groups: BTreeMap<GroupKey, Vec<&Document>> = BTreeMap::new();

    // aggregates without grouping fold every match into one group
    if grouping.is_empty() {
        groups.insert(Vec::new(), Vec::new());
    }
    for &(_, document) in matched {
        let key = grouping
            .iter()
            .map(|path| resolve(path, Scope::Document(document)).cloned())
            .collect();
        groups.entry(key).or_default().push(document);
    }

    let mut groups: Vec<_> = groups.into_iter().collect();
    if !grouping.is_empty() && !query.sort().is_empty() {
        groups.sort_by(|(left, _), (right, _)| {
            compare_keys(
                query.sort(),
                |path| group_value(grouping, left, path),
                |path| group_value(grouping, right, path),
            )
        });
    }

    groups
        .iter()
        .map(|(key, documents)| {
            let entries = query
                .projections()
                .iter()
                .map(|expression| {
                    let value = if expression.is_aggregate() {
                        aggregate(expression, documents, program)?
                    } else {
                        expression
                            .as_path()
                            .and_then(|path| group_value(grouping, key, path))
                            .cloned()
                    };

                    Ok(TupleEntry {
                        expression: expression.clone(),
                        value,
                    })
                })
                .collect::<Result<ProjectedTuple, Error>>()?;

            Ok(Reply::Tuple(entries))
        })
        .collect()
}

fn group_value<'a>(grouping: &[Path], key: &'a GroupKey, path: &Path) -> Option<&'a Value> {
    let position = grouping.iter().position(|group| group == path)?;

    key.get(position)?.as_ref()
}

fn aggregate(
    expression: &Expression,
    documents: &[&Document],
    program: &Program,
) -> Result<Option<Value>, Error> {
    let Expression::Call { operator, args } = expression else {
        return Ok(None);
    };
    let Some(target) = args.first() else {
        return Ok(None);
    };

    // absent and null values never take part
    let values: Vec<Cow<'_, Value>> = documents
        .iter()
        .filter_map(|document| program.value(target, Scope::Document(document)))
        .filter(|value| !value.is_null())
        .collect();

    let result = match operator {
        Operator::Count => Some(Value::Uint(u64::try_from(values.len()).unwrap_or(u64::MAX))),
        Operator::Sum => sum(&values)?,
        Operator::Avg => average(&values)?,
        Operator::Min => values
            .iter()
            .min_by(|a, b| canonical_cmp(a, b))
            .map(|value| value.as_ref().clone()),
        Operator::Max => values
            .iter()
            .max_by(|a, b| canonical_cmp(a, b))
            .map(|value| value.as_ref().clone()),
        _ => None,
    };

    Ok(result)
}

fn sum(values: &[Cow<'_, Value>]) -> Result<Option<Value>, Error> {
    let overflow = || BackendError::constraint("sum overflows its attribute type");
    let mut total: Option<Value> = None;

    for value in values {
        total = Some(match (total, value.as_ref()) {
            (None, first @ (Value::Int(_) | Value::Uint(_) | Value::Float(_))) => first.clone(),
            (Some(Value::Int(a)), Value::Int(b)) => {
                Value::Int(a.checked_add(*b).ok_or_else(overflow)?)
            }
            (Some(Value::Uint(a)), Value::Uint(b)) => {
                Value::Uint(a.checked_add(*b).ok_or_else(overflow)?)
            }
            (Some(Value::Float(a)), Value::Float(b)) => {
                Value::Float(Float64::try_new(a.get() + b.get()).ok_or_else(overflow)?)
            }
            (_, other) => {
                return Err(BackendError::constraint(format!(
                    "cannot sum a {} value",
                    other.label()
                ))
                .into());
            }
        });
    }

    Ok(total)
}

#[allow(clippy::cast_precision_loss)]
fn average(values: &[Cow<'_, Value>]) -> Result<Option<Value>, Error> {
    if values.is_empty() {
        return Ok(None);
    }

    let mut total = 0.0_f64;
    for value in values {
        total += match value.as_ref() {
            Value::Int(v) => *v as f64,
            Value::Uint(v) => *v as f64,
            Value::Float(v) => v.get(),
            other => {
                return Err(BackendError::constraint(format!(
                    "cannot average a {} value",
                    other.label()
                ))
                .into());
            }
        };
    }

    Ok(Float64::try_new(total / values.len() as f64).map(Value::Float))
}

// ---------------------------------------------------------------------
// Distinct and paging
// ---------------------------------------------------------------------

fn distinct_key(reply: &Reply) -> Vec<Option<Value>> {
    match reply {
        Reply::Tuple(tuple) => tuple.iter().map(|entry| entry.value.clone()).collect(),
        Reply::Document(document) => vec![Some(Value::Record(document.clone()))],
        _ => Vec::new(),
    }
}

fn paginate<T>(rows: Vec<T>, page: Page) -> Vec<T> {
    let offset = page
        .offset
        .map_or(0, |offset| usize::try_from(offset).unwrap_or(usize::MAX));
    let limit = page
        .limit
        .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

    rows.into_iter().skip(offset).take(limit).collect()
}
