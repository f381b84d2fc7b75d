//! Settings that shape how requests are interpreted.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ContractionError;

/// What to do with a signature entry that cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnparsableEntryPolicy {
    /// Replace the entry by zero and log a warning.
    #[default]
    Zero,
    /// Fail the contraction with a validation error.
    Reject,
}

/// Configuration of a contraction call.
///
/// # Examples
/// ```
/// # use holocontract::config::{ContractionConfig, UnparsableEntryPolicy};
/// let config: ContractionConfig =
///     serde_json::from_str(r#"{"unparsable_entry": "reject", "max_enumeration_bits": 20}"#)
///         .unwrap();
/// assert_eq!(config.unparsable_entry, UnparsableEntryPolicy::Reject);
/// assert_eq!(config.max_enumeration_bits, Some(20));
/// assert_eq!(config.transform_imaginary_aliases, ["I", "i", "j"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractionConfig {
    pub unparsable_entry: UnparsableEntryPolicy,
    /// Upper bound on the number of enumerated binary variables (dangling plus
    /// internal). `None` means unbounded.
    pub max_enumeration_bits: Option<u32>,
    /// Identifiers read as the imaginary unit inside signature entries.
    pub signature_imaginary_aliases: Vec<String>,
    /// Identifiers read as the imaginary unit inside transform matrices.
    pub transform_imaginary_aliases: Vec<String>,
}

impl Default for ContractionConfig {
    fn default() -> Self {
        Self {
            unparsable_entry: UnparsableEntryPolicy::default(),
            max_enumeration_bits: None,
            signature_imaginary_aliases: vec![String::from("I"), String::from("i")],
            transform_imaginary_aliases: vec![
                String::from("I"),
                String::from("i"),
                String::from("j"),
            ],
        }
    }
}

impl ContractionConfig {
    /// Reads a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file<P>(path: P) -> Result<Self, ContractionError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            ContractionError::parse(format!("cannot open config {}: {err}", path.display()))
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
