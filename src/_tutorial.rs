//! # Tutorial
//!
//! Explanations of the conventions the library follows. Code examples live in
//! the docstrings of the functions they describe, where they are executed as
//! doc tests.
pub mod holographic_transforms;
pub mod signatures_and_variables;
