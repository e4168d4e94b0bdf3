// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CSV to Line Protocol conversion.
//!
//! Reads one CSV source, builds a [`Schema`] from its header and the
//! configured column roles, and encodes every data row in order.

use crate::columns::ColumnSelection;
use crate::error::EncodeError;
use crate::influx::Schema;
use csv::{ReaderBuilder, StringRecord};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Default CSV delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Errors that abort the conversion of one file.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input has no header row; headers are needed to match tag and field labels")]
    MissingHeader,

    #[error("cannot build schema from header: {0}")]
    Schema(#[source] EncodeError),

    #[error("line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: EncodeError,
    },
}

/// Run-wide conversion settings shared by every input file.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Measurement name (raw, sanitized by the encoder).
    pub measurement: String,
    /// Tag and field roles.
    pub columns: ColumnSelection,
    /// Nanosecond timestamp appended to every line.
    pub timestamp: Option<String>,
    /// CSV field delimiter.
    pub delimiter: u8,
}

/// Line Protocol text produced from one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Converted {
    /// Newline-terminated lines, ready to write or post.
    pub payload: String,
    /// Number of lines in `payload`.
    pub lines: u64,
}

/// Converts CSV sources using fixed [`ConvertOptions`].
#[derive(Debug, Clone)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Build the schema for a header row.
    pub fn schema_for(&self, headers: &StringRecord) -> Result<Schema, EncodeError> {
        let labels: Vec<String> = headers.iter().map(str::to_string).collect();
        let definition = self.options.columns.definition(
            &labels,
            &self.options.measurement,
            self.options.timestamp.as_deref(),
        );
        Schema::build(&definition)
    }

    /// Convert a CSV file.
    pub fn convert_file(&self, path: &Path) -> Result<Converted, ConvertError> {
        let file = File::open(path)?;
        self.convert_reader(file)
    }

    /// Convert any CSV source. The first failing row aborts the conversion.
    pub fn convert_reader<R: Read>(&self, reader: R) -> Result<Converted, ConvertError> {
        let mut csv = ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut record = StringRecord::new();
        if !csv.read_record(&mut record)? {
            return Err(ConvertError::MissingHeader);
        }
        let schema = self.schema_for(&record).map_err(ConvertError::Schema)?;

        debug!(
            "Fields labels and indexes: {}",
            describe(schema.field_indexes(), schema.labels())
        );
        debug!(
            "Tags labels and indexes: {}",
            describe(schema.tag_indexes(), schema.labels())
        );

        let mut converted = Converted::default();
        while csv.read_record(&mut record)? {
            let values: Vec<&str> = record.iter().collect();
            let line = schema.export(&values).map_err(|source| ConvertError::Row {
                line: record.position().map_or(0, |p| p.line()),
                source,
            })?;
            converted.payload.push_str(&line);
            converted.payload.push('\n');
            converted.lines += 1;
        }

        Ok(converted)
    }
}

fn describe(indexes: &[usize], labels: &[String]) -> String {
    indexes
        .iter()
        .map(|&i| format!("{}: {}", i, labels[i]))
        .collect::<Vec<_>>()
        .join(", ")
}
