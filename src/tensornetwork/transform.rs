use std::fmt;

use itertools::Itertools;
use log::{debug, trace};
use serde::Deserialize;

use crate::error::ContractionError;
use crate::symbolic::{parse_symbolic, Symbolic};
use crate::tensornetwork::signature::check_signature_len;
use crate::types::NodeId;

/// Dense row-major matrix of symbolic values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Symbolic>,
}

impl Matrix {
    /// Builds a matrix from its rows. Returns `None` if the rows are of
    /// unequal length.
    pub fn from_rows(rows: Vec<Vec<Symbolic>>) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn identity(n: usize) -> Self {
        let data = (0..n)
            .cartesian_product(0..n)
            .map(|(i, j)| {
                if i == j {
                    Symbolic::one()
                } else {
                    Symbolic::zero()
                }
            })
            .collect();
        Self {
            rows: n,
            cols: n,
            data,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> &Symbolic {
        &self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[Symbolic] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Matrix product `self * vector`. The caller guarantees
    /// `vector.len() == self.cols()`.
    pub fn mul_vector(&self, vector: &[Symbolic]) -> Vec<Symbolic> {
        (0..self.rows)
            .map(|i| {
                self.row(i)
                    .iter()
                    .zip(vector)
                    .filter(|(m, v)| !m.is_zero() && !v.is_zero())
                    .map(|(m, v)| m * v)
                    .sum::<Symbolic>()
                    .simplify()
            })
            .collect()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]",
            (0..self.rows)
                .map(|i| format!("[{}]", self.row(i).iter().join(", ")))
                .join(", ")
        )
    }
}

/// Kronecker product `a ⊗ b`: block `(i, j)` is `a[i][j] * b`.
pub fn kronecker_product(a: &Matrix, b: &Matrix) -> Matrix {
    let rows = a.rows * b.rows;
    let cols = a.cols * b.cols;
    let data = (0..rows)
        .cartesian_product(0..cols)
        .map(|(i, j)| {
            let outer = a.get(i / b.rows, j / b.cols);
            let inner = b.get(i % b.rows, j % b.cols);
            (outer * inner).simplify()
        })
        .collect();
    Matrix { rows, cols, data }
}

/// `n`-fold Kronecker power of `matrix`. The 0-fold power is the 1×1
/// identity.
pub fn kronecker_power(matrix: &Matrix, n: usize) -> Matrix {
    if n == 0 {
        return Matrix::identity(1);
    }
    let mut acc = matrix.clone();
    for _ in 1..n {
        acc = kronecker_product(&acc, matrix);
    }
    acc
}

/// A cell of a transform written as JSON: a number or an expression string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Number(serde_json::Number),
    Text(String),
}

impl Cell {
    fn into_text(self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }
}

/// A 2×2 basis change applied to every leg of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformMatrix(Matrix);

impl TransformMatrix {
    /// Parses a matrix written as a JSON list of rows, e.g.
    /// `[[1, 1], [1, "-1"]]`. Single quotes are accepted in place of double
    /// quotes.
    ///
    /// # Errors
    /// Text that is not a list of lists of numbers and strings, or cells
    /// that are not valid expressions, are parse errors. Any shape other
    /// than 2×2 is a validation error.
    ///
    /// # Examples
    /// ```
    /// # use holocontract::tensornetwork::transform::TransformMatrix;
    /// let aliases = vec![String::from("j")];
    /// let m = TransformMatrix::parse("[['1', 'j'], [0, '1/sqrt(2)']]", &aliases).unwrap();
    /// assert_eq!(m.to_string(), "[[1, I], [0, sqrt(2)/2]]");
    /// ```
    pub fn parse(text: &str, imaginary_aliases: &[String]) -> Result<Self, ContractionError> {
        let normalized = text.replace('\'', "\"");
        let cells: Vec<Vec<Cell>> = serde_json::from_str(&normalized).map_err(|err| {
            ContractionError::parse(format!("transform is not a list of rows: {err}"))
        })?;

        let rows = cells
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.into_text();
                        parse_symbolic(&cell, imaginary_aliases).map_err(|err| {
                            ContractionError::parse(format!("transform entry {cell:?}: {err}"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let shape = rows.iter().map(Vec::len).join(", ");
        let height = rows.len();
        match Matrix::from_rows(rows) {
            Some(matrix) if matrix.rows() == 2 && matrix.cols() == 2 => Ok(Self(matrix)),
            Some(matrix) => Err(ContractionError::validation(format!(
                "transform must be a 2x2 matrix, got {}x{}",
                matrix.rows(),
                matrix.cols()
            ))),
            None => Err(ContractionError::validation(format!(
                "transform must be a 2x2 matrix, got {height} rows of lengths [{shape}]"
            ))),
        }
    }

    pub fn identity() -> Self {
        Self(Matrix::identity(2))
    }

    pub fn as_matrix(&self) -> &Matrix {
        &self.0
    }

    /// Kronecker power acting on a signature of `arity` legs.
    pub fn power(&self, arity: usize) -> Matrix {
        kronecker_power(&self.0, arity)
    }
}

impl fmt::Display for TransformMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Applies the transform given by `matrix_spec` to every leg of a node's
/// signature. An absent or blank spec leaves the signature unchanged.
///
/// # Errors
/// Fails if the spec does not parse, is not 2×2, or if the signature does not
/// hold `2^arity` entries. Messages name `node`.
pub fn apply_transform(
    signature: Vec<Symbolic>,
    arity: usize,
    matrix_spec: Option<&str>,
    node: &NodeId,
    imaginary_aliases: &[String],
) -> Result<Vec<Symbolic>, ContractionError> {
    let Some(spec) = matrix_spec.filter(|spec| !spec.trim().is_empty()) else {
        return Ok(signature);
    };
    let matrix =
        TransformMatrix::parse(spec, imaginary_aliases).map_err(|err| err.in_node(node))?;
    apply_transform_matrix(&signature, arity, &matrix, node)
}

/// Like [`apply_transform`], with an already parsed matrix.
pub fn apply_transform_matrix(
    signature: &[Symbolic],
    arity: usize,
    matrix: &TransformMatrix,
    node: &NodeId,
) -> Result<Vec<Symbolic>, ContractionError> {
    check_signature_len(arity, signature.len()).map_err(|err| err.in_node(node))?;
    debug!(node:% = node, arity; "Applying holographic transform");
    let power = matrix.power(arity);
    trace!(node:% = node, rows = power.rows(); "Kronecker power built");
    let transformed = power.mul_vector(signature);
    check_signature_len(arity, transformed.len()).map_err(|err| err.in_node(node))?;
    Ok(transformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    use float_cmp::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn aliases() -> Vec<String> {
        vec![String::from("I"), String::from("i"), String::from("j")]
    }

    fn values(texts: &[&str]) -> Vec<Symbolic> {
        texts
            .iter()
            .map(|text| parse_symbolic(text, &aliases()).unwrap())
            .collect()
    }

    fn node() -> NodeId {
        NodeId::from("n")
    }

    fn matrix(text: &str) -> Matrix {
        TransformMatrix::parse(text, &aliases()).unwrap().as_matrix().clone()
    }

    #[test]
    fn kronecker_of_small_matrices() {
        let a = matrix("[[1, 2], [3, 4]]");
        let b = matrix("[[0, 1], [1, 0]]");
        let k = kronecker_product(&a, &b);
        assert_eq!(k.rows(), 4);
        assert_eq!(k.cols(), 4);
        assert_eq!(
            k.to_string(),
            "[[0, 1, 0, 2], [1, 0, 2, 0], [0, 3, 0, 4], [3, 0, 4, 0]]"
        );
    }

    #[test]
    fn kronecker_powers() {
        let m = matrix("[['a', 'b'], ['c', 'd']]");
        assert_eq!(kronecker_power(&m, 0), Matrix::identity(1));
        assert_eq!(kronecker_power(&m, 1), m);
        let cube = kronecker_power(&m, 3);
        assert_eq!(cube.rows(), 8);
        // row 0b101, column 0b011 picks m[1][0] * m[0][1] * m[1][1]
        assert_eq!(cube.get(0b101, 0b011).to_string(), "b*c*d");
        assert_eq!(cube.get(0, 0).to_string(), "a**3");
    }

    #[test]
    fn identity_keeps_signature() {
        let identity = TransformMatrix::identity();
        for arity in 1..=4 {
            let signature: Vec<_> = (0..1 << arity)
                .map(|k| Symbolic::symbol(format!("s{k}")))
                .collect();
            let out = apply_transform_matrix(&signature, arity, &identity, &node()).unwrap();
            assert_eq!(out, signature);
        }
    }

    #[test]
    fn transform_then_inverse() {
        let pairs = [
            ("[[1, 1], [1, -1]]", "[[0.5, 0.5], [0.5, -0.5]]"),
            (
                "[['1/sqrt(2)', '1/sqrt(2)'], ['1/sqrt(2)', '-1/sqrt(2)']]",
                "[['sqrt(2)/2', 'sqrt(2)/2'], ['sqrt(2)/2', '-sqrt(2)/2']]",
            ),
            ("[[1, 'i'], [0, 2]]", "[[1, '-i/2'], [0, 0.5]]"),
        ];
        let signature = values(&["x", "1", "y*z", "-3/7", "I", "0", "sqrt(3)", "x - y"]);
        for (forward, backward) in pairs {
            let there =
                apply_transform(signature.clone(), 3, Some(forward), &node(), &aliases()).unwrap();
            let back = apply_transform(there, 3, Some(backward), &node(), &aliases()).unwrap();
            assert_eq!(back, signature, "{forward}");
        }
    }

    #[test]
    fn transform_one_leg() {
        let hadamard = Some("[[1, 1], [1, -1]]");
        let out = apply_transform(values(&["a", "b"]), 1, hadamard, &node(), &aliases()).unwrap();
        assert_eq!(out, values(&["a + b", "a - b"]));
    }

    #[test]
    fn arity_zero_uses_scalar_identity() {
        let doubling = Some("[[2, 0], [0, 2]]");
        let out = apply_transform(values(&["5"]), 0, doubling, &node(), &aliases()).unwrap();
        assert_eq!(out, values(&["5"]));
    }

    #[test]
    fn blank_spec_is_noop() {
        let signature = values(&["1", "I"]);
        for spec in [None, Some(""), Some("  ")] {
            let out = apply_transform(signature.clone(), 1, spec, &node(), &aliases()).unwrap();
            assert_eq!(out, signature);
        }
    }

    #[test]
    fn not_two_by_two() {
        let err = apply_transform(
            values(&["1", "0"]),
            1,
            Some("[[1, 0, 0], [0, 1, 0], [0, 0, 1]]"),
            &NodeId::from("gate7"),
            &aliases(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ContractionError::Validation(String::from(
                "node `gate7`: transform must be a 2x2 matrix, got 3x3"
            ))
        );

        let ragged = Some("[[1, 0], [1]]");
        let err = apply_transform(values(&["1", "0"]), 1, ragged, &node(), &aliases()).unwrap_err();
        assert!(matches!(err, ContractionError::Validation(ref m) if m.contains("node `n`")));
    }

    #[test]
    fn malformed_spec() {
        for spec in [
            "not a matrix",
            r#"{"a": 1}"#,
            "[1, 2]",
            "[[1, 2], [3, [4]]]",
            "[['sin(x)', 0], [0, 1]]",
        ] {
            let err = apply_transform(values(&["1", "0"]), 1, Some(spec), &node(), &aliases())
                .unwrap_err();
            assert!(matches!(err, ContractionError::Parse(_)), "{spec}: {err:?}");
        }
    }

    #[test]
    fn length_mismatch() {
        let identity = Some("[[1, 0], [0, 1]]");
        let err = apply_transform(values(&["1", "0", "1"]), 1, identity, &node(), &aliases())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error: node `n`: signature has 3 entries, expected 2 (2^1)"
        );
    }

    #[test]
    fn numeric_transform_agrees_with_floating_point() {
        let mut rng = StdRng::seed_from_u64(23);
        let cells: Vec<i64> = (0..4).map(|_| rng.gen_range(-5..=5)).collect();
        let spec = format!("[[{}, {}], [{}, {}]]", cells[0], cells[1], cells[2], cells[3]);
        let signature: Vec<i64> = (0..4).map(|_| rng.gen_range(-9..=9)).collect();
        let symbolic: Vec<_> = signature.iter().map(|&v| Symbolic::from_integer(v)).collect();

        let out = apply_transform(symbolic, 2, Some(&spec), &node(), &aliases()).unwrap();
        for (row, value) in out.iter().enumerate() {
            let expected: f64 = (0..4)
                .map(|col| {
                    let m0 = cells[(row >> 1) * 2 + (col >> 1)];
                    let m1 = cells[(row & 1) * 2 + (col & 1)];
                    (m0 * m1 * signature[col]) as f64
                })
                .sum();
            let actual = value.to_complex64().unwrap();
            assert_approx_eq!(f64, actual.re, expected);
            assert_approx_eq!(f64, actual.im, 0.0);
        }
    }
}
