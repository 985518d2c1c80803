use crate::{
    expr::{Expression, InvalidExpression, Path, ResultKind},
    query::Query,
};

impl Query {
    /// Check the query shape against its record model.
    ///
    /// - the predicate is boolean, aggregate-free, and rooted in the model
    /// - projections are paths, scalar calls, or aggregates
    /// - a grouped query selects something, and its projections and sort
    ///   keys reference grouping paths
    pub fn validate(&self) -> Result<(), InvalidExpression> {
        if let Some(predicate) = self.predicate() {
            if !predicate.is_boolean() {
                return Err(InvalidExpression::NotPredicate {
                    expression: predicate.to_string(),
                });
            }
            if predicate
                .first_unsupported(|operator| !operator.is_aggregate())
                .is_some()
            {
                return Err(InvalidExpression::AggregateInFilter {
                    expression: predicate.to_string(),
                });
            }
            self.check_rooted(predicate.rooted_paths())?;
        }

        for projection in self.projections() {
            let projectable = match projection {
                Expression::Path(_) => true,
                Expression::Call { operator, .. } => operator.result() != ResultKind::Boolean,
                Expression::Constant(_) => false,
            };
            if !projectable {
                return Err(InvalidExpression::NotProjectable {
                    expression: projection.to_string(),
                });
            }
            self.check_rooted(projection.rooted_paths())?;
        }

        self.check_rooted(self.grouping().iter())?;
        self.check_rooted(self.sort().iter().map(|key| &key.path))?;

        if self.is_grouped() {
            self.check_grouping()?;
        }

        Ok(())
    }

    fn check_grouping(&self) -> Result<(), InvalidExpression> {
        if !self.is_projected() {
            return Err(InvalidExpression::UnprojectedGrouping {
                entity: self.model().name,
            });
        }

        let grouped = |expression: &Expression| {
            self.grouping()
                .iter()
                .any(|path| expression.as_path() == Some(path))
        };

        for projection in self.projections() {
            let aggregated = matches!(
                projection,
                Expression::Call { operator, .. } if operator.is_aggregate()
            );
            if !aggregated && !grouped(projection) {
                return Err(InvalidExpression::Ungrouped {
                    expression: projection.to_string(),
                });
            }
        }

        if !self.grouping().is_empty() {
            for key in self.sort() {
                if !self.grouping().contains(&key.path) {
                    return Err(InvalidExpression::UngroupedSort {
                        path: key.path.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn check_rooted<'a>(
        &self,
        paths: impl IntoIterator<Item = &'a Path>,
    ) -> Result<(), InvalidExpression> {
        let model = self.model();

        for path in paths {
            if model.resolve(path).is_none() {
                return Err(InvalidExpression::ForeignPath {
                    entity: model.name,
                    path: path.to_string(),
                });
            }
        }

        Ok(())
    }
}
