use num_rational::BigRational;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncType {
    Sqrt,
}

impl FuncType {
    /// Resolves a function name as written in an expression.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Self::Sqrt),
            _ => None,
        }
    }
}

/// Parsed (but not yet evaluated) expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// An exact literal; decimals are stored as the rational they denote.
    Number(BigRational),
    ImaginaryUnit,
    Symbol(String),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Function(FuncType, Box<Expr>),
}

impl Expr {
    pub fn integer(value: i64) -> Self {
        Expr::Number(BigRational::from_integer(value.into()))
    }

    pub fn symbol<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Expr::Symbol(name.into())
    }

    pub fn unary(op: UnOp, inner: Expr) -> Self {
        Expr::Unary(op, Box::new(inner))
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn function(ftype: FuncType, inner: Expr) -> Self {
        Expr::Function(ftype, Box::new(inner))
    }
}
