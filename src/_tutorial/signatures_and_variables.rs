//! # Signatures and variables
//!
//! Every leg of a node is binary. A node of arity `n` therefore has `2^n`
//! signature entries, indexed by the bits of its legs with leg 0 as the most
//! significant bit. For a node of arity 2 the entries are listed in the order
//! `(0, 0)`, `(0, 1)`, `(1, 0)`, `(1, 1)`.
//!
//! Entries are expressions such as `1/2`, `a*b - I` or `sqrt(2)/2`. They are
//! evaluated exactly by the [`symbolic`](crate::symbolic) module; the
//! identifiers listed in
//! [`signature_imaginary_aliases`](ContractionConfig::signature_imaginary_aliases)
//! stand for the imaginary unit.
//!
//! ## Variables
//! An edge joins two legs under one internal variable named
//! `e_{A}_{B}_{a}_{b}`, where `(A, a)` is the smaller of the two endpoints
//! `(node, leg)`. Naming does not depend on which endpoint is the source.
//! Internal variables are summed over and do not appear in the result.
//!
//! A leg no edge claims is dangling and gets the variable `v_{node}_{leg}`.
//! Dangling variables are ordered by node declaration and then by ascending
//! leg index. The result of [`contract_network`] has one entry per assignment
//! of these variables, the first one being the most significant bit.
//!
//! ## Cost
//! Contraction enumerates all `2^(E + I)` assignments of the `E` dangling and
//! `I` internal variables. [`max_enumeration_bits`] bounds `E + I`.
//!
//! [`contract_network`]: crate::contract_network
//! [`max_enumeration_bits`]: ContractionConfig::max_enumeration_bits
#![allow(unused_imports)]
use crate::config::ContractionConfig;

pub use crate::_tutorial as table_of_contents;
