//! Brute-force contraction of binary tensor networks.
//!
//! A contraction runs in four stages: edges are mapped to internal variables
//! ([`variables`]), signatures are parsed ([`signature`]) and optionally
//! transformed ([`transform`]), and the assignments of all variables are
//! enumerated ([`contraction`]).

pub mod contraction;
pub mod signature;
pub mod transform;
pub mod variables;

pub use contraction::{contract_network, ContractionResult};
