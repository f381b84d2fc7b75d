use std::path::PathBuf;

use clap::Parser;
use holocontract::config::{ContractionConfig, UnparsableEntryPolicy};
use holocontract::ContractionError;
use log::LevelFilter;

/// Enumeration bound used when neither the configuration file nor the command
/// line sets one.
pub const DEFAULT_MAX_BITS: u32 = 24;

/// Contracts the binary tensor network described by a JSON request and prints
/// the JSON response.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Request file; `-` or no argument reads standard input.
    pub request: Option<PathBuf>,
    /// JSON file with a contraction configuration.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Reject unparsable signature entries instead of reading them as 0.
    #[arg(long)]
    pub strict: bool,
    /// Largest number of binary variables to enumerate; 0 removes the bound.
    /// Defaults to the configuration file's bound, or 24.
    #[arg(short = 'b', long)]
    pub max_bits: Option<u32>,
    /// Pretty-print the response.
    #[arg(short, long)]
    pub pretty: bool,
    /// Level of the log records written to stderr.
    #[arg(short, long, default_value_t = LevelFilter::Warn)]
    pub log_level: LevelFilter,
    /// Write log records as JSON.
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// The request path, `None` for standard input.
    pub fn request_path(&self) -> Option<&PathBuf> {
        self.request
            .as_ref()
            .filter(|path| path.as_os_str() != "-")
    }

    /// Configuration file values, overridden by command line flags.
    pub fn contraction_config(&self) -> Result<ContractionConfig, ContractionError> {
        let mut config = match &self.config {
            Some(path) => ContractionConfig::from_json_file(path)?,
            None => ContractionConfig::default(),
        };
        if self.strict {
            config.unparsable_entry = UnparsableEntryPolicy::Reject;
        }
        config.max_enumeration_bits = match self.max_bits {
            Some(0) => None,
            Some(bits) => Some(bits),
            None => config.max_enumeration_bits.or(Some(DEFAULT_MAX_BITS)),
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::{self, File};
    use std::io::Write;

    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["holocontract"]);
        assert_eq!(cli.max_bits, None);
        assert_eq!(
            cli.contraction_config().unwrap().max_enumeration_bits,
            Some(DEFAULT_MAX_BITS)
        );
        assert_eq!(cli.log_level, LevelFilter::Warn);
        assert!(cli.request_path().is_none());
        assert!(!cli.strict);
    }

    #[test]
    fn dash_reads_stdin() {
        let cli = Cli::parse_from(["holocontract", "-", "--strict", "-b", "0"]);
        assert!(cli.request_path().is_none());
        assert!(cli.strict);
        assert_eq!(cli.max_bits, Some(0));
        let config = cli.contraction_config().unwrap();
        assert_eq!(config.max_enumeration_bits, None);
        assert_eq!(config.unparsable_entry, UnparsableEntryPolicy::Reject);

        let cli = Cli::parse_from(["holocontract", "request.json", "--log-level", "debug"]);
        assert_eq!(cli.request_path(), Some(&PathBuf::from("request.json")));
        assert_eq!(cli.log_level, LevelFilter::Debug);
    }

    #[test]
    fn config_file_bound_survives_without_flag() {
        let path = std::env::temp_dir().join("holocontract_cli_bound_test.json");
        let mut file = File::create(&path).unwrap();
        write!(file, r#"{{"max_enumeration_bits": 10}}"#).unwrap();
        drop(file);
        let config_arg = path.to_str().unwrap();

        let cli = Cli::parse_from(["holocontract", "--config", config_arg]);
        assert_eq!(cli.contraction_config().unwrap().max_enumeration_bits, Some(10));

        let cli = Cli::parse_from(["holocontract", "--config", config_arg, "-b", "30"]);
        assert_eq!(cli.contraction_config().unwrap().max_enumeration_bits, Some(30));

        let cli = Cli::parse_from(["holocontract", "--config", config_arg, "-b", "0"]);
        assert_eq!(cli.contraction_config().unwrap().max_enumeration_bits, None);
        fs::remove_file(path).unwrap();
    }
}
