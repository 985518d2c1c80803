use crate::expr::{Expression, Operator, compare};

///
/// Simplify one operator application whose arguments are already simple.
///
/// Guarantees:
/// - nested AND / OR nodes are flattened
/// - neutral elements are removed, absorbing elements short-circuit
/// - duplicate junction children are dropped
/// - double negation is eliminated
/// - comparisons and membership tests between constants are folded
///
pub(super) fn simplify(operator: Operator, args: Vec<Expression>) -> Expression {
    match operator {
        Operator::And | Operator::Or => simplify_junction(operator, args),
        Operator::Not => simplify_not(args),
        Operator::Equal
        | Operator::NotEqual
        | Operator::Less
        | Operator::LessEqual
        | Operator::Greater
        | Operator::GreaterEqual => fold_compare(operator, args),
        Operator::In | Operator::NotIn => fold_membership(operator, args),
        _ => Expression::Call { operator, args },
    }
}

fn simplify_junction(operator: Operator, args: Vec<Expression>) -> Expression {
    let neutral = operator == Operator::And;
    let mut out: Vec<Expression> = Vec::with_capacity(args.len());

    for arg in args {
        match arg.as_bool() {
            Some(value) if value == neutral => continue,
            Some(_) => return Expression::truth(!neutral),
            None => {}
        }

        match arg {
            Expression::Call {
                operator: inner,
                args: children,
            } if inner == operator => {
                for child in children {
                    push_unique(&mut out, child);
                }
            }
            other => push_unique(&mut out, other),
        }
    }

    match out.len() {
        0 => Expression::truth(neutral),
        1 => out.pop().unwrap_or(Expression::truth(neutral)),
        _ => Expression::Call { operator, args: out },
    }
}

fn push_unique(out: &mut Vec<Expression>, child: Expression) {
    if !out.contains(&child) {
        out.push(child);
    }
}

fn simplify_not(mut args: Vec<Expression>) -> Expression {
    let Some(inner) = args.pop() else {
        return Expression::Call {
            operator: Operator::Not,
            args,
        };
    };

    if let Some(value) = inner.as_bool() {
        return Expression::truth(!value);
    }

    match inner {
        Expression::Call {
            operator: Operator::Not,
            args: mut nested,
        } if nested.len() == 1 => nested.pop().unwrap_or(Expression::truth(true)),
        other => Expression::Call {
            operator: Operator::Not,
            args: vec![other],
        },
    }
}

fn fold_compare(operator: Operator, args: Vec<Expression>) -> Expression {
    match (args.first(), args.get(1)) {
        (Some(Expression::Constant(left)), Some(Expression::Constant(right))) => {
            Expression::truth(compare(operator, Some(&left.value), Some(&right.value)))
        }
        _ => Expression::Call { operator, args },
    }
}

fn fold_membership(operator: Operator, args: Vec<Expression>) -> Expression {
    let Some(Expression::Constant(target)) = args.first() else {
        return Expression::Call { operator, args };
    };

    let found = args[1..].iter().any(|candidate| {
        candidate.as_constant().is_some_and(|candidate| {
            compare(Operator::Equal, Some(&target.value), Some(&candidate.value))
        })
    });
    let present = !target.value.is_null();

    Expression::truth(match operator {
        Operator::In => found,
        _ => present && !found,
    })
}
