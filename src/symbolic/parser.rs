//! Tokenizer and recursive-descent parser for signature entries and matrix cells.
use std::iter::Peekable;
use std::str::CharIndices;

use num_bigint::BigInt;
use num_rational::BigRational;

use super::ast::{BinOp, Expr, FuncType, UnOp};

/// Largest power of ten a literal may be scaled by.
const MAX_DECIMAL_SHIFT: u64 = 4096;

/// Deepest expression tree the parser builds. Parentheses, function calls,
/// unary signs, powers and every operator of a `+`/`*` chain each add a level.
pub const MAX_DEPTH: usize = 256;

/// Error raised when an expression text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse `{text}` at position {position}: {message}")]
pub struct ExprParseError {
    pub text: String,
    pub position: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(BigRational),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

struct Lexer<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
        }
    }

    fn error(&self, position: usize, message: impl Into<String>) -> ExprParseError {
        ExprParseError {
            text: self.text.to_owned(),
            position,
            message: message.into(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<(usize, Token)>, ExprParseError> {
        let mut tokens = Vec::new();
        while let Some(&(pos, c)) = self.chars.peek() {
            let token = match c {
                c if c.is_whitespace() => {
                    self.chars.next();
                    continue;
                }
                '0'..='9' | '.' => self.number(pos)?,
                c if c.is_alphabetic() || c == '_' => self.ident(),
                '+' => self.single(Token::Plus),
                '-' => self.single(Token::Minus),
                '/' => self.single(Token::Slash),
                '^' => self.single(Token::Caret),
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                '*' => {
                    self.chars.next();
                    if matches!(self.chars.peek(), Some((_, '*'))) {
                        self.chars.next();
                        Token::Caret
                    } else {
                        Token::Star
                    }
                }
                other => return Err(self.error(pos, format!("unexpected character `{other}`"))),
            };
            tokens.push((pos, token));
        }
        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.chars.next();
        token
    }

    fn ident(&mut self) -> Token {
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Ident(name)
    }

    /// Reads an integer, decimal or scientific literal as an exact rational.
    fn number(&mut self, start: usize) -> Result<Token, ExprParseError> {
        let mut digits = String::new();
        let mut fraction_digits = 0usize;
        let mut seen_point = false;
        while let Some(&(_, c)) = self.chars.peek() {
            match c {
                '0'..='9' => {
                    digits.push(c);
                    if seen_point {
                        fraction_digits += 1;
                    }
                }
                '.' if !seen_point => seen_point = true,
                _ => break,
            }
            self.chars.next();
        }
        if digits.is_empty() {
            return Err(self.error(start, "a number needs at least one digit"));
        }

        let mut exponent: i64 = 0;
        if let Some(&(epos, 'e' | 'E')) = self.chars.peek() {
            self.chars.next();
            let mut text = String::new();
            if let Some(&(_, sign @ ('+' | '-'))) = self.chars.peek() {
                text.push(sign);
                self.chars.next();
            }
            while let Some(&(_, c @ '0'..='9')) = self.chars.peek() {
                text.push(c);
                self.chars.next();
            }
            exponent = text
                .parse()
                .map_err(|_| self.error(epos, "malformed exponent"))?;
        }

        let mantissa: BigInt = digits
            .parse()
            .map_err(|_| self.error(start, "malformed number"))?;
        let shift = exponent.saturating_sub(fraction_digits as i64);
        if shift.unsigned_abs() > MAX_DECIMAL_SHIFT {
            return Err(self.error(start, "exponent out of range"));
        }
        let scale: BigInt = num_traits::pow(BigInt::from(10), shift.unsigned_abs() as usize);
        let value = if shift >= 0 {
            BigRational::from_integer(mantissa * scale)
        } else {
            BigRational::new(mantissa, scale)
        };
        Ok(Token::Number(value))
    }
}

/// Recursive descent over the token stream. Precedence, loosest first:
/// `+ -`, `* /`, unary `-`, `^`/`**` (right associative), atoms.
struct Parser<'a> {
    text: &'a str,
    tokens: Vec<(usize, Token)>,
    cursor: usize,
    imaginary_aliases: &'a [String],
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> ExprParseError {
        let position = self
            .tokens
            .get(self.cursor)
            .map_or(self.text.len(), |(pos, _)| *pos);
        ExprParseError {
            text: self.text.to_owned(),
            position,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(_, token)| token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).map(|(_, token)| token.clone());
        self.cursor += 1;
        token
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ExprParseError> {
        if self.peek() == Some(expected) {
            self.cursor += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    /// Enters one more level of the tree below `depth`.
    fn descend(&self, depth: usize) -> Result<usize, ExprParseError> {
        if depth >= MAX_DEPTH {
            return Err(self.error(format!("expression is nested deeper than {MAX_DEPTH} levels")));
        }
        Ok(depth + 1)
    }

    fn sum(&mut self, mut depth: usize) -> Result<Expr, ExprParseError> {
        let mut lhs = self.product(depth)?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            depth = self.descend(depth)?;
            self.cursor += 1;
            let rhs = self.product(depth)?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn product(&mut self, mut depth: usize) -> Result<Expr, ExprParseError> {
        let mut lhs = self.unary(depth)?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            depth = self.descend(depth)?;
            self.cursor += 1;
            let rhs = self.unary(depth)?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self, depth: usize) -> Result<Expr, ExprParseError> {
        match self.peek() {
            Some(Token::Minus) => {
                let depth = self.descend(depth)?;
                self.cursor += 1;
                Ok(Expr::unary(UnOp::Neg, self.unary(depth)?))
            }
            Some(Token::Plus) => {
                let depth = self.descend(depth)?;
                self.cursor += 1;
                self.unary(depth)
            }
            _ => self.power(depth),
        }
    }

    fn power(&mut self, depth: usize) -> Result<Expr, ExprParseError> {
        let base = self.atom(depth)?;
        if self.peek() == Some(&Token::Caret) {
            let depth = self.descend(depth)?;
            self.cursor += 1;
            let exponent = self.unary(depth)?;
            return Ok(Expr::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn atom(&mut self, depth: usize) -> Result<Expr, ExprParseError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::LParen) => {
                let depth = self.descend(depth)?;
                let inner = self.sum(depth)?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    let Some(ftype) = FuncType::from_name(&name) else {
                        self.cursor -= 1;
                        return Err(self.error(format!("unknown function `{name}`")));
                    };
                    let depth = self.descend(depth)?;
                    self.cursor += 1;
                    let inner = self.sum(depth)?;
                    self.expect(&Token::RParen, "`)` after function argument")?;
                    Ok(Expr::function(ftype, inner))
                } else if self.imaginary_aliases.iter().any(|alias| *alias == name) {
                    Ok(Expr::ImaginaryUnit)
                } else {
                    Ok(Expr::Symbol(name))
                }
            }
            Some(_) => {
                self.cursor -= 1;
                Err(self.error("expected a number, symbol or `(`"))
            }
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

/// Parses `text` into an [`Expr`]. Identifiers that appear in
/// `imaginary_aliases` are read as the imaginary unit; aliasing only applies to
/// whole identifiers, so a symbol like `pi` is never touched by an alias `i`.
///
/// # Examples
/// ```
/// # use holocontract::symbolic::parser::parse_expression;
/// # use holocontract::symbolic::ast::Expr;
/// let aliases = vec![String::from("I"), String::from("i")];
/// assert_eq!(parse_expression("i", &aliases).unwrap(), Expr::ImaginaryUnit);
/// assert_eq!(parse_expression("pi", &aliases).unwrap(), Expr::symbol("pi"));
/// ```
pub fn parse_expression(text: &str, imaginary_aliases: &[String]) -> Result<Expr, ExprParseError> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser {
        text,
        tokens,
        cursor: 0,
        imaginary_aliases,
    };
    if parser.tokens.is_empty() {
        return Err(parser.error("empty expression"));
    }
    let expr = parser.sum(0)?;
    if parser.cursor < parser.tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> Vec<String> {
        vec![String::from("I"), String::from("i")]
    }

    fn rational(n: i64, d: i64) -> Expr {
        Expr::Number(BigRational::new(n.into(), d.into()))
    }

    #[test]
    fn precedence() {
        // a + b * c
        let expr = parse_expression("a + b * c", &aliases()).unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinOp::Add,
                Expr::symbol("a"),
                Expr::binary(BinOp::Mul, Expr::symbol("b"), Expr::symbol("c"))
            )
        );
    }

    #[test]
    fn power_binds_tighter_than_negation() {
        // -2**2 = -(2**2)
        let expr = parse_expression("-2**2", &aliases()).unwrap();
        assert_eq!(
            expr,
            Expr::unary(
                UnOp::Neg,
                Expr::binary(BinOp::Pow, Expr::integer(2), Expr::integer(2))
            )
        );
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse_expression("x^2^3", &aliases()).unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinOp::Pow,
                Expr::symbol("x"),
                Expr::binary(BinOp::Pow, Expr::integer(2), Expr::integer(3))
            )
        );
    }

    #[test]
    fn decimals_are_exact() {
        assert_eq!(parse_expression("0.25", &aliases()).unwrap(), rational(1, 4));
        assert_eq!(parse_expression("1.5e2", &aliases()).unwrap(), Expr::integer(150));
        assert_eq!(parse_expression("2E-3", &aliases()).unwrap(), rational(1, 500));
        assert_eq!(parse_expression(".5", &aliases()).unwrap(), rational(1, 2));
    }

    #[test]
    fn imaginary_aliases_are_whole_identifiers() {
        let expr = parse_expression("i*pi + I", &aliases()).unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinOp::Add,
                Expr::binary(BinOp::Mul, Expr::ImaginaryUnit, Expr::symbol("pi")),
                Expr::ImaginaryUnit
            )
        );
        // without the alias `i` is an ordinary symbol
        let expr = parse_expression("i", &[String::from("I")]).unwrap();
        assert_eq!(expr, Expr::symbol("i"));
    }

    #[test]
    fn sqrt_call() {
        let expr = parse_expression("1/sqrt(2)", &aliases()).unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinOp::Div,
                Expr::integer(1),
                Expr::function(FuncType::Sqrt, Expr::integer(2))
            )
        );
    }

    #[test]
    fn errors_report_position() {
        let err = parse_expression("1 + ", &aliases()).unwrap_err();
        assert_eq!(err.position, 4);

        let err = parse_expression("2 $ 3", &aliases()).unwrap_err();
        assert_eq!(err.position, 2);

        let err = parse_expression("sin(x)", &aliases()).unwrap_err();
        assert_eq!(err.message, "unknown function `sin`");

        let err = parse_expression("(a + b", &aliases()).unwrap_err();
        assert_eq!(err.message, "expected `)`");

        assert!(parse_expression("", &aliases()).is_err());
        assert!(parse_expression("a b", &aliases()).is_err());
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        let err = parse_expression(&deep, &aliases()).unwrap_err();
        assert_eq!(err.message, format!("expression is nested deeper than {MAX_DEPTH} levels"));

        let signs = format!("{}x", "-".repeat(100_000));
        assert!(parse_expression(&signs, &aliases()).is_err());

        let chain = vec!["1"; 100_000].join(" + ");
        assert!(parse_expression(&chain, &aliases()).is_err());

        let shallow = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_expression(&shallow, &aliases()).unwrap(), Expr::symbol("x"));
        let sum = vec!["x"; 200].join(" + ");
        assert!(parse_expression(&sum, &aliases()).is_ok());
    }
}
