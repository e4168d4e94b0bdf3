// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! csv2influx - Write CSV data into InfluxDB using the Line Protocol.
//!
//! Input files must have a header row so tag and field labels can be
//! matched. All inputs of one run are expected to share the same column
//! roles, but each file is encoded with a schema built from its own header.
//! Tags are written in the order given; pass a sorted `--tag-columns` list
//! if sorted tags are wanted.
//!
//! # Usage
//!
//! ```bash
//! # One output file per input, in output/
//! csv2influx 'fixtures/*.csv' --output-path=output/ --field-columns=speed:int \
//!     --timestamp=2016-09-26T02:00:00+00:00
//!
//! # Everything appended to one file and posted to InfluxDB
//! csv2influx fixtures/sample.csv --output-path=output/result.out \
//!     --field-columns=speed:int,strength:float --tag-columns=name,class \
//!     --timestamp=2016-09-26 --load-url='http://localhost:8086/write?db=mydb'
//!
//! # Settings from a YAML job file, overridden on the command line
//! csv2influx data/*.csv --config job.yaml --measurement=trucks
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use csv2influx::columns::split_list;
use csv2influx::job::expand_inputs;
use csv2influx::{Job, JobConfig};
use log::{debug, error, info};
use std::path::PathBuf;

/// Write CSV data into InfluxDB using the Line Protocol
#[derive(Parser, Debug)]
#[command(name = "csv2influx")]
#[command(about = "Convert CSV files into InfluxDB Line Protocol")]
#[command(version)]
struct Args {
    /// Input file(s); file names may contain * and ? wildcards
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<String>,

    /// Output file, or directory (ending with a path separator) for one file per input
    #[arg(long, value_name = "PATH")]
    output_path: Option<String>,

    /// Measurement name [default: sample_measurement]
    #[arg(long, value_name = "NAME")]
    measurement: Option<String>,

    /// Comma-separated tag columns; * selects every column not used as a field
    #[arg(long, value_name = "TAGS")]
    tag_columns: Option<String>,

    /// Comma-separated field columns as name or name:type (float, int, str, bool)
    #[arg(long, value_name = "FIELDS")]
    field_columns: Option<String>,

    /// Timestamp for every line: RFC 3339, YYYY-MM-DD[ HH:MM:SS] or epoch nanoseconds
    #[arg(long, value_name = "TIME")]
    timestamp: Option<String>,

    /// InfluxDB write endpoint (e.g. http://localhost:8086/write?db=mydb)
    #[arg(long, value_name = "URL")]
    load_url: Option<String>,

    /// CSV delimiter [default: ,]
    #[arg(long)]
    delimiter: Option<char>,

    /// YAML job file; command-line options take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Attempts per file when posting to the write endpoint
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Continue with the next file when one fails
    #[arg(long)]
    keep_going: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .format_timestamp_millis()
        .init();

    let config = build_config(&args)?;
    let mut job = Job::from_config(&config).context("invalid job configuration")?;

    let inputs = expand_inputs(&args.paths)?;
    info!("Found {} input file(s)", inputs.len());

    for (i, input) in inputs.iter().enumerate() {
        info!(
            "-- Processing file {}/{}: {} --",
            i + 1,
            inputs.len(),
            input.display()
        );
        match job.process_file(input) {
            Ok(report) => debug!("{:?}", report),
            Err(e) if args.keep_going => error!("{:#}", anyhow::Error::new(e)),
            Err(e) => return Err(e.into()),
        }
    }

    let stats = job.stats();
    info!(
        "Processed {} file(s), {} line(s) written",
        stats.files_processed, stats.lines_written
    );
    if stats.files_failed > 0 {
        bail!("{} of {} file(s) failed", stats.files_failed, inputs.len());
    }
    Ok(())
}

/// Merge the optional job file with command-line options.
fn build_config(args: &Args) -> anyhow::Result<JobConfig> {
    let mut config = match &args.config {
        Some(path) => JobConfig::from_file(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => JobConfig::default(),
    };

    if let Some(measurement) = &args.measurement {
        config.measurement = measurement.clone();
    }
    if let Some(tags) = &args.tag_columns {
        config.tags = split_list(tags).collect();
    }
    if let Some(fields) = &args.field_columns {
        config.fields = split_list(fields).collect();
    }
    if let Some(timestamp) = &args.timestamp {
        config.timestamp = Some(timestamp.clone());
    }
    if let Some(url) = &args.load_url {
        config.load_url = Some(url.clone());
    }
    if let Some(path) = &args.output_path {
        config.output_path = Some(path.clone());
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = Some(delimiter);
    }
    if let Some(attempts) = args.max_attempts {
        config.max_attempts = Some(attempts);
    }

    if config.fields.is_empty() {
        bail!("--field-columns is required (or `fields` in the config file)");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv.iter().copied()).expect("parse args")
    }

    #[test]
    fn test_args_build_config() {
        let args = parse(&[
            "csv2influx",
            "fixtures/*.csv",
            "--field-columns=speed:int,strength",
            "--tag-columns=name, class,",
            "--measurement=cars",
            "--timestamp=2016-09-26",
            "--output-path=output/",
        ]);
        let config = build_config(&args).expect("config");

        assert_eq!(config.measurement, "cars");
        assert_eq!(config.tags, vec!["name", "class"]);
        assert_eq!(config.fields, vec!["speed:int", "strength"]);
        assert_eq!(config.timestamp.as_deref(), Some("2016-09-26"));
        assert_eq!(config.output_path.as_deref(), Some("output/"));
        assert!(config.load_url.is_none());
    }

    #[test]
    fn test_fields_required() {
        let args = parse(&["csv2influx", "a.csv"]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_command_line_overrides_config_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("job.yaml");
        fs::write(
            &path,
            "measurement: cars\ntags: [name]\nfields: [\"speed:int\"]\ndelimiter: \";\"\n",
        )
        .expect("write config");

        let config_arg = format!("--config={}", path.display());
        let args = parse(&["csv2influx", "a.csv", config_arg.as_str(), "--measurement=trucks"]);
        let config = build_config(&args).expect("config");

        assert_eq!(config.measurement, "trucks");
        assert_eq!(config.tags, vec!["name"]);
        assert_eq!(config.fields, vec!["speed:int"]);
        assert_eq!(config.delimiter, Some(';'));
    }
}
