//! # Holographic transforms
//!
//! A holographic transform is a 2×2 matrix `M` applied to every leg of a node.
//! A node of arity `n` is transformed by the `n`-fold Kronecker power of `M`,
//! a `2^n × 2^n` matrix multiplied with the signature column vector. Arity 0
//! nodes are scalars and stay unchanged.
//!
//! A transform is written as a JSON list of rows whose cells are numbers or
//! expression strings, e.g. `[[1, 1], [1, "-1"]]`. Single quotes may be used
//! in place of double quotes, and the identifiers in
//! [`transform_imaginary_aliases`](ContractionConfig::transform_imaginary_aliases)
//! (by default `I`, `i` and `j`) denote the imaginary unit.
//!
//! A request may carry one transform for the whole network; a node may carry
//! its own, which then replaces the network-wide one for that node. A node
//! without a transform, or with a blank one, gets the network-wide transform;
//! to leave a single node untouched give it the identity `[[1, 0], [0, 1]]`.
//!
//! When the two sides of every edge are transformed by `M` and `(M^T)^-1`, the
//! contraction value does not change, which is the basis of holographic
//! reductions.
//!
//! See [`apply_transform`] and [`kronecker_power`].
//!
//! [`apply_transform`]: crate::tensornetwork::transform::apply_transform
//! [`kronecker_power`]: crate::tensornetwork::transform::kronecker_power
#![allow(unused_imports)]
use crate::config::ContractionConfig;

pub use crate::_tutorial as table_of_contents;
