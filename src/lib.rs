//! Brute-force contraction of binary tensor networks with holographic
//! transforms and exact symbolic arithmetic.
//!
//! A network consists of [`Node`](types::Node)s whose binary legs are
//! connected by [`Edge`](types::Edge)s. Each node carries a signature, one value
//! per assignment of its legs. Contracting the network sums the product of all
//! signatures over the edge variables and leaves a signature over the
//! unconnected legs. See [`_tutorial`] for the conventions used throughout.
//!
//! The main entry points are [`contract_network`] for typed input and
//! [`io::handle_request`] for JSON documents.

pub mod _tutorial;
pub mod config;
pub mod error;
pub mod io;
pub mod symbolic;
pub mod tensornetwork;
pub mod types;
mod utils;

pub use config::{ContractionConfig, UnparsableEntryPolicy};
pub use error::ContractionError;
pub use tensornetwork::{contract_network, ContractionResult};
