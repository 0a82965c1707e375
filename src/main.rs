//! az-prom-rules-converter - Prometheus rule groups to ARM template
//!
//! Reads a Prometheus rules file, converts it, and writes the ARM template
//! to a file or stdout. Conversion failures are reported on stderr.

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;

use az_prom_rules_converter::cli::Cli;
use az_prom_rules_converter::pipeline;

fn read_input(cli: &Cli, json: bool) -> Result<String> {
    if json {
        return Ok(cli.input.clone());
    }
    if cli.input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read input from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input file '{}'", cli.input))
}

fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse_normalized();

    // Initialize logging
    az_prom_rules_converter::init_logging(&cli.log_level.to_string())?;

    let options = cli.to_options()?;
    let input = read_input(&cli, options.json)?;

    let template = match pipeline::convert(&input, &options) {
        Ok(template) => template,
        Err(error) => {
            eprintln!("{}", error.title);
            eprintln!("{}", serde_json::to_string_pretty(&error.details)?);
            return Ok(ExitCode::FAILURE);
        }
    };

    let rendered = serde_json::to_string_pretty(&template)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output file '{}'", path.display()))?;
            info!(path = %path.display(), "Wrote ARM template");
        }
        None => println!("{}", rendered),
    }

    Ok(ExitCode::SUCCESS)
}
