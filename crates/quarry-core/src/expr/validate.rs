use crate::{
    expr::{Expression, InvalidExpression, Operator},
    value::Value,
};
use regex::Regex;

/// Check arity and operand kinds of one operator application.
pub(super) fn check_call(operator: Operator, args: &[Expression]) -> Result<(), InvalidExpression> {
    let arity = operator.arity();
    if !arity.admits(args.len()) {
        return Err(InvalidExpression::Arity {
            operator,
            expected: arity,
            found: args.len(),
        });
    }

    // aggregates only appear as projections
    if let Some(position) = args.iter().position(Expression::is_aggregate) {
        return Err(InvalidExpression::OperandShape {
            operator,
            position,
            expected: "non-aggregate expression",
        });
    }

    match operator {
        Operator::And | Operator::Or | Operator::Not => {
            for (position, arg) in args.iter().enumerate() {
                expect_kind(operator, position, arg, "boolean", Expression::is_boolean)?;
            }
        }

        Operator::Equal | Operator::NotEqual => same_logical(operator, &args[0], &args[1])?,

        Operator::Less | Operator::LessEqual | Operator::Greater | Operator::GreaterEqual => {
            expect_kind(operator, 0, &args[0], "comparable", |e| {
                e.kind().is_comparable()
            })?;
            same_logical(operator, &args[0], &args[1])?;
        }

        Operator::In | Operator::NotIn => {
            for (offset, arg) in args[1..].iter().enumerate() {
                expect_constant(operator, offset + 1, arg)?;
                same_logical(operator, &args[0], arg)?;
            }
        }

        Operator::IsPresent | Operator::IsAbsent | Operator::IsNotNull | Operator::IsNull => {
            if args[0].as_path().is_none() {
                return Err(InvalidExpression::OperandShape {
                    operator,
                    position: 0,
                    expected: "path",
                });
            }
        }

        Operator::Contains => {
            let target = args[0].kind();
            if let Some(element) = target.element() {
                let found = args[1].kind();
                if !element.same_logical(&found) {
                    return Err(InvalidExpression::KindMismatch {
                        operator,
                        left: element.clone(),
                        right: found,
                    });
                }
            } else {
                expect_kind(operator, 0, &args[0], "text or collection", |e| {
                    e.kind().is_text()
                })?;
                expect_kind(operator, 1, &args[1], "text", |e| e.kind().is_text())?;
            }
        }

        Operator::StartsWith | Operator::EndsWith => {
            expect_kind(operator, 0, &args[0], "text", |e| e.kind().is_text())?;
            expect_kind(operator, 1, &args[1], "text", |e| e.kind().is_text())?;
        }

        Operator::Matches => {
            expect_kind(operator, 0, &args[0], "text", |e| e.kind().is_text())?;
            let pattern = expect_constant(operator, 1, &args[1])?;
            let Value::Text(pattern) = pattern else {
                return Err(InvalidExpression::OperandKind {
                    operator,
                    position: 1,
                    expected: "text",
                    found: args[1].kind(),
                });
            };
            Regex::new(pattern).map_err(|err| InvalidExpression::Pattern {
                pattern: pattern.clone(),
                message: err.to_string(),
            })?;
        }

        Operator::HasLength => {
            expect_kind(operator, 0, &args[0], "text", |e| e.kind().is_text())?;
            expect_uint(operator, 1, &args[1])?;
        }

        Operator::ToUpper | Operator::ToLower => {
            expect_kind(operator, 0, &args[0], "text", |e| e.kind().is_text())?;
        }

        Operator::HasSize | Operator::At => {
            expect_kind(operator, 0, &args[0], "collection", |e| {
                e.kind().is_collection()
            })?;
            expect_uint(operator, 1, &args[1])?;
        }

        Operator::All | Operator::Any | Operator::None => {
            expect_kind(operator, 0, &args[0], "collection", |e| {
                e.kind().is_collection()
            })?;
            expect_kind(operator, 1, &args[1], "boolean", Expression::is_boolean)?;
        }

        Operator::Sum | Operator::Avg => {
            expect_kind(operator, 0, &args[0], "numeric", |e| e.kind().is_numeric())?;
        }

        Operator::Min | Operator::Max => {
            expect_kind(operator, 0, &args[0], "comparable", |e| {
                e.kind().is_comparable()
            })?;
        }

        Operator::Count => {}
    }

    Ok(())
}

fn expect_kind(
    operator: Operator,
    position: usize,
    arg: &Expression,
    expected: &'static str,
    accepts: impl Fn(&Expression) -> bool,
) -> Result<(), InvalidExpression> {
    if accepts(arg) {
        Ok(())
    } else {
        Err(InvalidExpression::OperandKind {
            operator,
            position,
            expected,
            found: arg.kind(),
        })
    }
}

fn expect_constant(
    operator: Operator,
    position: usize,
    arg: &Expression,
) -> Result<&Value, InvalidExpression> {
    arg.as_constant()
        .map(|constant| &constant.value)
        .ok_or(InvalidExpression::OperandShape {
            operator,
            position,
            expected: "constant",
        })
}

fn expect_uint(
    operator: Operator,
    position: usize,
    arg: &Expression,
) -> Result<(), InvalidExpression> {
    match expect_constant(operator, position, arg)? {
        Value::Uint(_) => Ok(()),
        _ => Err(InvalidExpression::OperandKind {
            operator,
            position,
            expected: "uint constant",
            found: arg.kind(),
        }),
    }
}

fn same_logical(
    operator: Operator,
    left: &Expression,
    right: &Expression,
) -> Result<(), InvalidExpression> {
    let (left_kind, right_kind) = (left.kind(), right.kind());
    if left_kind.same_logical(&right_kind) || is_null_constant(left) || is_null_constant(right) {
        return Ok(());
    }

    Err(InvalidExpression::KindMismatch {
        operator,
        left: left_kind,
        right: right_kind,
    })
}

fn is_null_constant(expr: &Expression) -> bool {
    matches!(expr.as_constant(), Some(constant) if constant.value.is_null())
}
