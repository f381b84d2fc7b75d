mod cli;

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use flexi_logger::{default_format, json_format, FlexiLoggerError, Logger, LoggerHandle};
use holocontract::io::handle_request;
use log::{error, info};

use crate::cli::Cli;

/// Sets up logging to stderr, keeping stdout for the response.
fn setup_logging(cli: &Cli) -> Result<LoggerHandle, FlexiLoggerError> {
    let format = if cli.log_json {
        json_format
    } else {
        default_format
    };
    Logger::with(cli.log_level).format(format).start()
}

fn read_request(cli: &Cli) -> io::Result<String> {
    match cli.request_path() {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut body = String::new();
            io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _logger = match setup_logging(&cli) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("cannot set up logging: {err}");
            None
        }
    };

    let config = match cli.contraction_config() {
        Ok(config) => config,
        Err(err) => {
            error!(error:% = err; "Invalid configuration");
            return ExitCode::from(2);
        }
    };
    info!(config:?; "Configuration set");

    let body = match read_request(&cli) {
        Ok(body) => body,
        Err(err) => {
            error!(error:% = err; "Cannot read request");
            return ExitCode::from(2);
        }
    };

    let response = handle_request(&body, &config);
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(err) => {
            error!(error:% = err; "Cannot render response");
            return ExitCode::from(2);
        }
    }

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
