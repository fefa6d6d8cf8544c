//! Config validation CLI tool
//!
//! Validates a parkwise configuration file and reports any errors.

use parkwise_config::{ConfigError, IdStrategy, CURRENT_CONFIG_VERSION};
use parkwise_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a parkwise configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match parkwise_config::load_config(&config_path) {
        Ok(config) => {
            let strategy = match config.facility.id_strategy {
                IdStrategy::Uuid => "uuid",
                IdStrategy::Sequential => "sequential",
            };

            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", CURRENT_CONFIG_VERSION);
            println!("  Facility: {}", config.facility.name);
            println!("  Data dir: {}", config.facility.data_dir.display());
            println!("  ID strategy: {}", strategy);
            println!(
                "  Duplicate entries: {}",
                if config.facility.reject_duplicate_entries { "rejected" } else { "allowed" }
            );
            println!();
            println!("Day rates:");
            println!("  two_wheeler:   {}", config.pricing.two_wheeler);
            println!("  three_wheeler: {}", config.pricing.three_wheeler);
            println!("  four_wheeler:  {}", config.pricing.four_wheeler);

            if !config.guards.is_empty() {
                println!();
                println!("Guards:");
                for guard in &config.guards {
                    println!(
                        "  - {} [{} shift, {}]: {} <{}>",
                        guard.id,
                        guard.shift.as_str(),
                        guard.status.as_str(),
                        guard.name,
                        guard.email
                    );
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
