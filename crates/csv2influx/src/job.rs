// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion job orchestrator.
//!
//! Connects configuration, column selection, timestamp normalisation, CSV
//! conversion, file output and HTTP delivery into a single entry point.
//! Run-wide settings are validated once; every input file then gets its own
//! schema, built from its own header.

use crate::columns::{ColumnError, ColumnSelection};
use crate::config::JobConfig;
use crate::convert::{ConvertError, ConvertOptions, Converter, DEFAULT_DELIMITER};
use crate::delivery::{DeliveryError, WriteEndpoint};
use crate::error::SchemaProblem;
use crate::influx::FieldType;
use crate::inputs;
use crate::output::OutputTarget;
use crate::timestamp::{self, TimestampError};
use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while setting up or running a job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid column selection: {0}")]
    Columns(#[from] ColumnError),

    #[error("invalid field columns: {0}")]
    FieldTypes(#[from] SchemaProblem),

    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] TimestampError),

    #[error("delimiter '{0}' must be a single ASCII character")]
    InvalidDelimiter(char),

    #[error("cannot set up write endpoint: {0}")]
    Endpoint(#[source] DeliveryError),

    #[error("no input file matches '{0}'")]
    NoInputs(String),

    #[error("cannot list inputs for '{pattern}': {source}")]
    Inputs {
        pattern: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Convert {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },

    #[error("{}: cannot write output: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: cannot load into {url}: {source}", .path.display())]
    Delivery {
        path: PathBuf,
        url: String,
        #[source]
        source: DeliveryError,
    },
}

/// Outcome of one processed input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    pub lines: u64,
    /// File the lines were appended to, if any.
    pub output: Option<PathBuf>,
    /// Whether the payload was posted to the write endpoint.
    pub delivered: bool,
}

/// Running totals for a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    pub files_processed: u64,
    pub files_failed: u64,
    pub lines_written: u64,
}

/// A configured conversion job.
#[derive(Debug)]
pub struct Job {
    converter: Converter,
    output: OutputTarget,
    endpoint: Option<WriteEndpoint>,
    stats: JobStats,
}

impl Job {
    /// Validate run-wide settings and build the job.
    pub fn from_config(config: &JobConfig) -> Result<Self, JobError> {
        let columns = ColumnSelection::from_lists(&config.tags, &config.fields)?;
        let unknown_types: Vec<String> = columns
            .fields()
            .iter()
            .filter(|f| f.field_type.parse::<FieldType>().is_err())
            .map(|f| f.field_type.clone())
            .collect();
        if !unknown_types.is_empty() {
            return Err(SchemaProblem::UnknownFieldType {
                types: unknown_types,
            }
            .into());
        }
        let timestamp = config
            .timestamp
            .as_deref()
            .map(timestamp::to_nanos)
            .transpose()?;
        let delimiter = match config.delimiter {
            None => DEFAULT_DELIMITER,
            Some(c) if c.is_ascii() => c as u8,
            Some(c) => return Err(JobError::InvalidDelimiter(c)),
        };

        let endpoint = config
            .load_url
            .as_deref()
            .map(|url| {
                WriteEndpoint::new(url)
                    .map(|e| e.max_attempts(config.attempts()))
                    .map_err(JobError::Endpoint)
            })
            .transpose()?;

        if let Some(ts) = &timestamp {
            info!("Timestamp applied to every line: {}", ts);
        }

        Ok(Self {
            converter: Converter::new(ConvertOptions {
                measurement: config.measurement.clone(),
                columns,
                timestamp,
                delimiter,
            }),
            output: OutputTarget::from_arg(config.output_path.as_deref()),
            endpoint,
            stats: JobStats::default(),
        })
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    pub fn stats(&self) -> JobStats {
        self.stats
    }

    /// Convert one file, write its lines and post them if configured.
    pub fn process_file(&mut self, path: &Path) -> Result<FileReport, JobError> {
        let result = self.run_file(path);
        match &result {
            Ok(report) => {
                self.stats.files_processed += 1;
                self.stats.lines_written += report.lines;
            }
            Err(_) => self.stats.files_failed += 1,
        }
        result
    }

    fn run_file(&self, path: &Path) -> Result<FileReport, JobError> {
        let converted = self
            .converter
            .convert_file(path)
            .map_err(|source| JobError::Convert {
                path: path.to_path_buf(),
                source,
            })?;

        let output = self
            .output
            .write(path, &converted.payload)
            .map_err(|source| JobError::Output {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(out) = &output {
            info!("Wrote {} lines to file {}", converted.lines, out.display());
        }

        let mut delivered = false;
        if let Some(endpoint) = &self.endpoint {
            if converted.lines > 0 {
                endpoint
                    .post(&converted.payload)
                    .map_err(|source| JobError::Delivery {
                        path: path.to_path_buf(),
                        url: endpoint.url().to_string(),
                        source,
                    })?;
                delivered = true;
                info!(
                    "Wrote {} lines to database {}",
                    converted.lines,
                    endpoint.url()
                );
            }
        }

        Ok(FileReport {
            input: path.to_path_buf(),
            lines: converted.lines,
            output,
            delivered,
        })
    }
}

/// Expand input arguments (which may contain wildcards) into file paths.
///
/// Fails if an argument with wildcards matches nothing.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>, JobError> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matched = inputs::expand(pattern).map_err(|source| JobError::Inputs {
            pattern: pattern.clone(),
            source,
        })?;
        if matched.is_empty() {
            return Err(JobError::NoInputs(pattern.clone()));
        }
        paths.extend(matched);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn cars_config() -> JobConfig {
        JobConfig {
            measurement: "cars".into(),
            tags: vec!["name".into(), "class".into()],
            fields: vec!["speed:int".into()],
            timestamp: Some("2016-09-26T02:00:00+00:00".into()),
            ..JobConfig::default()
        }
    }

    #[test]
    fn test_from_config_normalises_timestamp() {
        let job = Job::from_config(&cars_config()).expect("job");
        assert_eq!(
            job.converter().options().timestamp.as_deref(),
            Some("1474855200000000000")
        );
        assert_eq!(job.output(), &OutputTarget::Discard);
    }

    #[test]
    fn test_from_config_rejects_bad_settings() {
        let mut config = cars_config();
        config.fields.clear();
        assert!(matches!(
            Job::from_config(&config).unwrap_err(),
            JobError::Columns(ColumnError::NoFields)
        ));

        let mut config = cars_config();
        config.timestamp = Some("soon".into());
        assert!(matches!(
            Job::from_config(&config).unwrap_err(),
            JobError::Timestamp(_)
        ));

        let mut config = cars_config();
        config.delimiter = Some('é');
        assert!(matches!(
            Job::from_config(&config).unwrap_err(),
            JobError::InvalidDelimiter('é')
        ));
    }

    #[test]
    fn test_from_config_rejects_unknown_field_types() {
        let mut config = cars_config();
        config.fields = vec!["speed:integer".into(), "strength".into(), "name:date".into()];
        let err = Job::from_config(&config).unwrap_err();
        assert!(matches!(
            &err,
            JobError::FieldTypes(SchemaProblem::UnknownFieldType { types })
                if types == &["integer".to_string(), "date".to_string()]
        ));
    }

    #[test]
    fn test_from_config_rejects_invalid_load_url() {
        let mut config = cars_config();
        config.load_url = Some("localhost:8086/write?db=x".into());
        assert!(matches!(
            Job::from_config(&config).unwrap_err(),
            JobError::Endpoint(DeliveryError::InvalidUrl { .. })
        ));

        config.load_url = Some("http://localhost:8086/write?db=x".into());
        assert!(Job::from_config(&config).is_ok());
    }

    #[test]
    fn test_process_file_writes_directory_output() {
        let dir = tempdir().expect("tempdir");
        let input = dir.path().join("sample.csv");
        fs::write(
            &input,
            "time,speed,name,class\n2016-09-26,55,Model T,vintage\n",
        )
        .expect("write csv");

        let mut config = cars_config();
        config.output_path = Some(format!("{}/", dir.path().join("out").display()));
        let mut job = Job::from_config(&config).expect("job");

        let report = job.process_file(&input).expect("process");
        assert_eq!(report.lines, 1);
        assert!(!report.delivered);

        let output = report.output.expect("output path");
        assert_eq!(output.file_name().and_then(|n| n.to_str()), Some("sample.csv.out"));
        assert_eq!(
            fs::read_to_string(output).expect("read output"),
            "cars,name=model\\ t,class=vintage speed=55i 1474855200000000000\n"
        );
        assert_eq!(
            job.stats(),
            JobStats {
                files_processed: 1,
                files_failed: 0,
                lines_written: 1
            }
        );
    }

    #[test]
    fn test_process_file_counts_failures() {
        let dir = tempdir().expect("tempdir");
        let input = dir.path().join("short.csv");
        fs::write(&input, "time,speed,name,class\n2016-09-26,55\n").expect("write csv");

        let mut job = Job::from_config(&cars_config()).expect("job");
        let err = job.process_file(&input).unwrap_err();
        assert!(matches!(
            err,
            JobError::Convert {
                source: ConvertError::Row { line: 2, .. },
                ..
            }
        ));
        assert_eq!(job.stats().files_failed, 1);
    }

    #[test]
    fn test_expand_inputs_requires_matches() {
        let dir = tempdir().expect("tempdir");
        let pattern = format!("{}/*.csv", dir.path().display());
        assert!(matches!(
            expand_inputs(&[pattern]).unwrap_err(),
            JobError::NoInputs(_)
        ));
    }
}
