use crate::{
    backend::BackendError,
    expr::{Expression, Operator, Path, PathRoot, Step, compare},
    query::Query,
    value::{Document, Value},
};
use regex::Regex;
use std::{borrow::Cow, collections::HashMap};

///
/// Scope
///
/// What a path is resolved against: the stored document, or one list element
/// inside a collection sub-criterion.
///

#[derive(Clone, Copy)]
pub(super) enum Scope<'a> {
    Document(&'a Document),
    Element(&'a Value),
}

///
/// Program
///
/// A query prepared for evaluation: every `Matches` pattern is compiled once.
///

#[derive(Debug, Default)]
pub(super) struct Program {
    patterns: HashMap<String, Regex>,
}

impl Program {
    pub(super) fn compile(query: &Query) -> Result<Self, BackendError> {
        let mut program = Self::default();
        for expression in query.expressions() {
            program.collect(expression)?;
        }

        Ok(program)
    }

    fn collect(&mut self, expression: &Expression) -> Result<(), BackendError> {
        let Expression::Call { operator, args } = expression else {
            return Ok(());
        };

        if *operator == Operator::Matches
            && let Some(pattern) = args.get(1).and_then(|arg| arg.as_constant())
            && let Some(source) = pattern.value.as_text()
            && !self.patterns.contains_key(source)
        {
            let regex = Regex::new(source)
                .map_err(|err| BackendError::syntax(format!("pattern {source:?}: {err}")))?;
            self.patterns.insert(source.to_string(), regex);
        }

        args.iter().try_for_each(|arg| self.collect(arg))
    }

    /// True when `document` satisfies `predicate`; no predicate matches all.
    pub(super) fn matches(&self, predicate: Option<&Expression>, document: &Document) -> bool {
        predicate.is_none_or(|predicate| self.test(predicate, Scope::Document(document)))
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Value of `expression` in `scope`; `None` is absent.
    pub(super) fn value<'a>(
        &self,
        expression: &'a Expression,
        scope: Scope<'a>,
    ) -> Option<Cow<'a, Value>> {
        match expression {
            Expression::Constant(constant) => Some(Cow::Borrowed(&constant.value)),
            Expression::Path(path) => resolve(path, scope).map(Cow::Borrowed),
            Expression::Call { operator, args } => match operator {
                Operator::ToUpper | Operator::ToLower => {
                    let value = self.value(args.first()?, scope)?;
                    match value.as_text() {
                        Some(text) if *operator == Operator::ToUpper => {
                            Some(Cow::Owned(Value::Text(text.to_uppercase())))
                        }
                        Some(text) => Some(Cow::Owned(Value::Text(text.to_lowercase()))),
                        None => Some(value),
                    }
                }
                Operator::At => {
                    let index = uint_arg(args.get(1)?)?;
                    match self.value(args.first()?, scope)? {
                        Cow::Borrowed(Value::List(items)) => items.get(index).map(Cow::Borrowed),
                        Cow::Owned(Value::List(mut items)) if index < items.len() => {
                            Some(Cow::Owned(items.swap_remove(index)))
                        }
                        _ => None,
                    }
                }
                _ if operator.is_aggregate() => None,
                _ => Some(Cow::Owned(Value::Bool(self.test(expression, scope)))),
            },
        }
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    /// Two-valued predicate evaluation; absent operands make comparisons false.
    pub(super) fn test(&self, expression: &Expression, scope: Scope<'_>) -> bool {
        let (operator, args) = match expression {
            Expression::Call { operator, args } => (*operator, args.as_slice()),
            other => return matches!(self.value(other, scope).as_deref(), Some(Value::Bool(true))),
        };

        match operator {
            Operator::And => args.iter().all(|arg| self.test(arg, scope)),
            Operator::Or => args.iter().any(|arg| self.test(arg, scope)),
            Operator::Not => !args.iter().all(|arg| self.test(arg, scope)),

            Operator::Equal
            | Operator::NotEqual
            | Operator::Less
            | Operator::LessEqual
            | Operator::Greater
            | Operator::GreaterEqual => {
                let [left, right] = args else { return false };
                compare(
                    operator,
                    self.value(left, scope).as_deref(),
                    self.value(right, scope).as_deref(),
                )
            }

            Operator::In | Operator::NotIn => {
                let Some((target, candidates)) = args.split_first() else {
                    return false;
                };
                let Some(target) = self.value(target, scope) else {
                    return false;
                };
                if target.is_null() {
                    return false;
                }
                let found = candidates.iter().any(|candidate| {
                    compare(
                        Operator::Equal,
                        Some(&*target),
                        self.value(candidate, scope).as_deref(),
                    )
                });

                found == (operator == Operator::In)
            }

            Operator::IsPresent => self.arg(args, 0, scope).is_some(),
            Operator::IsAbsent => self.arg(args, 0, scope).is_none(),
            Operator::IsNotNull => self.arg(args, 0, scope).is_some_and(|v| !v.is_null()),
            Operator::IsNull => self.arg(args, 0, scope).is_some_and(|v| v.is_null()),

            Operator::Contains => {
                let (Some(target), Some(needle)) =
                    (self.arg(args, 0, scope), self.arg(args, 1, scope))
                else {
                    return false;
                };
                match (&*target, &*needle) {
                    (Value::Text(text), Value::Text(needle)) => text.contains(needle.as_str()),
                    (Value::List(items), needle) => items
                        .iter()
                        .any(|item| compare(Operator::Equal, Some(item), Some(needle))),
                    _ => false,
                }
            }
            Operator::StartsWith => self.texts(args, scope, |text, affix| text.starts_with(affix)),
            Operator::EndsWith => self.texts(args, scope, |text, affix| text.ends_with(affix)),
            Operator::Matches => self.texts(args, scope, |text, pattern| {
                self.patterns
                    .get(pattern)
                    .is_some_and(|regex| regex.is_match(text))
            }),
            Operator::HasLength => {
                let expected = args.get(1).and_then(uint_arg);
                self.arg(args, 0, scope)
                    .as_deref()
                    .and_then(Value::as_text)
                    .is_some_and(|text| Some(text.chars().count()) == expected)
            }

            Operator::HasSize => {
                let expected = args.get(1).and_then(uint_arg);
                self.arg(args, 0, scope)
                    .as_deref()
                    .and_then(Value::as_list)
                    .is_some_and(|items| Some(items.len()) == expected)
            }
            Operator::All | Operator::Any | Operator::None => {
                let [target, sub] = args else { return false };
                let Some(list) = self.value(target, scope) else {
                    return false;
                };
                let Some(items) = list.as_list() else {
                    return false;
                };
                let mut hits = items.iter().map(|item| self.test(sub, Scope::Element(item)));

                match operator {
                    Operator::All => hits.all(|hit| hit),
                    Operator::Any => hits.any(|hit| hit),
                    _ => !hits.any(|hit| hit),
                }
            }

            Operator::ToUpper
            | Operator::ToLower
            | Operator::At
            | Operator::Sum
            | Operator::Avg
            | Operator::Min
            | Operator::Max
            | Operator::Count => false,
        }
    }

    fn arg<'a>(
        &self,
        args: &'a [Expression],
        position: usize,
        scope: Scope<'a>,
    ) -> Option<Cow<'a, Value>> {
        self.value(args.get(position)?, scope)
    }

    fn texts(
        &self,
        args: &[Expression],
        scope: Scope<'_>,
        test: impl Fn(&str, &str) -> bool,
    ) -> bool {
        let (Some(left), Some(right)) = (self.arg(args, 0, scope), self.arg(args, 1, scope)) else {
            return false;
        };

        match (left.as_text(), right.as_text()) {
            (Some(text), Some(other)) => test(text, other),
            _ => false,
        }
    }
}

fn uint_arg(expression: &Expression) -> Option<usize> {
    let value = expression.as_constant()?.value.as_uint()?;

    usize::try_from(value).ok()
}

/// Walk `path` from `scope`; `None` when any step is missing.
pub(super) fn resolve<'a>(path: &Path, scope: Scope<'a>) -> Option<&'a Value> {
    let mut current = match (path.path_root(), scope) {
        (PathRoot::Record(_), Scope::Document(document)) => Cursor::Document(document),
        (PathRoot::Element(_), Scope::Element(value)) => Cursor::Value(value),
        _ => return None,
    };

    for segment in path.segments() {
        current = match (segment.step(), current) {
            (Step::Field(name), Cursor::Document(document))
            | (Step::Field(name), Cursor::Value(Value::Record(document))) => {
                Cursor::Value(document.get(*name)?)
            }
            (Step::Index(index), Cursor::Value(Value::List(items))) => {
                Cursor::Value(items.get(*index)?)
            }
            _ => return None,
        };
    }

    match current {
        Cursor::Value(value) => Some(value),
        Cursor::Document(_) => None,
    }
}

#[derive(Clone, Copy)]
enum Cursor<'a> {
    Document(&'a Document),
    Value(&'a Value),
}
