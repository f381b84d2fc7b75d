use super::ast::{BinOp, Expr, FuncType, UnOp};
use super::polynomial::{EvaluationError, Symbolic};

/// Evaluates an expression tree bottom-up into its canonical [`Symbolic`] value.
/// For instance, `(x + 1) * (x - 1) / 2` becomes `x**2/2 - 1/2`.
pub fn evaluate(expr: &Expr) -> Result<Symbolic, EvaluationError> {
    match expr {
        Expr::Number(value) => Ok(Symbolic::from_rational(value.clone())),
        Expr::ImaginaryUnit => Ok(Symbolic::imaginary_unit()),
        Expr::Symbol(name) => Ok(Symbolic::symbol(name.as_str())),
        Expr::Unary(UnOp::Neg, inner) => Ok(-evaluate(inner)?),
        Expr::Binary(op, lhs, rhs) => {
            let lhs = evaluate(lhs)?;
            let rhs = evaluate(rhs)?;
            match op {
                BinOp::Add => Ok(lhs + rhs),
                BinOp::Sub => Ok(lhs - rhs),
                BinOp::Mul => lhs.checked_mul(&rhs),
                BinOp::Div => lhs.checked_div(&rhs),
                BinOp::Pow => lhs.checked_pow(&rhs),
            }
        }
        Expr::Function(FuncType::Sqrt, inner) => evaluate(inner)?.checked_sqrt(),
    }
}
