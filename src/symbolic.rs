//! Exact symbolic arithmetic for signature entries and transform matrices.
//!
//! Text is parsed into an [`ast::Expr`] by [`parser::parse_expression`] and
//! evaluated into a canonical [`Symbolic`] value by [`evaluate::evaluate`].

pub mod ast;
pub mod coefficient;
pub mod evaluate;
pub mod parser;
pub mod polynomial;

pub use evaluate::evaluate;
pub use parser::{parse_expression, ExprParseError};
pub use polynomial::{EvaluationError, Monomial, Symbolic};

/// Parses and evaluates `text` in one step.
///
/// # Examples
/// ```
/// # use holocontract::symbolic::{parse_symbolic, Symbolic};
/// let aliases = vec![String::from("I")];
/// let value = parse_symbolic("(a + b)^2 - 2*a*b", &aliases).unwrap();
/// assert_eq!(value.to_string(), "a**2 + b**2");
/// ```
pub fn parse_symbolic(
    text: &str,
    imaginary_aliases: &[String],
) -> Result<Symbolic, crate::error::ContractionError> {
    let expr = parse_expression(text, imaginary_aliases)?;
    Ok(evaluate(&expr)?)
}
