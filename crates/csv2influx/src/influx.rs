// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB Line Protocol encoder.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp
//! ```
//!
//! Encoding is split in two phases. [`Schema::build`] sanitizes the header
//! labels and column names once and validates the column roles; the resulting
//! [`Schema`] is immutable and turns each CSV row into exactly one line via
//! [`encode_row`] (or [`Schema::export`]).
//!
//! See: <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_tutorial/>

use crate::error::{EncodeError, SchemaProblem};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Declared type of a field column.
///
/// The encoder trusts the declaration: raw values are never parsed, only
/// decorated the way Line Protocol expects for that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Decimal text, written as-is (e.g., `3.14`).
    Float,
    /// Integer text, suffixed with `i` (e.g., `42i`).
    Int,
    /// Text, double-quoted with inner quotes escaped (e.g., `"hello"`).
    Str,
    /// `true`/`false`/`t`/`f` style text, written as-is.
    Bool,
}

impl FieldType {
    /// Every accepted type, in the order they are documented.
    pub const ALL: [FieldType; 4] = [
        FieldType::Float,
        FieldType::Int,
        FieldType::Str,
        FieldType::Bool,
    ];

    /// Name used in column specs (`speed:int`) and configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Float => "float",
            FieldType::Int => "int",
            FieldType::Str => "str",
            FieldType::Bool => "bool",
        }
    }

    /// Format a raw CSV value as a field value of this type.
    pub fn encode(&self, raw: &str) -> String {
        match self {
            FieldType::Int => format!("{}i", raw),
            FieldType::Float | FieldType::Bool => raw.to_string(),
            FieldType::Str => format!("\"{}\"", raw.replace('"', "\\\"")),
        }
    }
}

impl FromStr for FieldType {
    type Err = SchemaProblem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SchemaProblem::UnknownFieldType {
                types: vec![s.to_string()],
            })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escape a tag key, tag value or field key and lowercase it.
///
/// Commas, spaces and equals signs are prefixed with a backslash. The
/// output must not be sanitized again: escaping only ever adds backslashes.
pub fn sanitize(value: &str) -> String {
    value
        .replace(',', "\\,")
        .replace(' ', "\\ ")
        .replace('=', "\\=")
        .to_lowercase()
}

/// Escape a measurement name and lowercase it.
/// Only commas and spaces need escaping in measurements.
pub fn sanitize_measurement(value: &str) -> String {
    value.replace(',', "\\,").replace(' ', "\\ ").to_lowercase()
}

/// Format a raw field value according to its declared type.
pub fn sanitize_field_value(value: &str, field_type: FieldType) -> String {
    field_type.encode(value)
}

/// Unvalidated inputs of a [`Schema`].
///
/// Names are raw (as they appear in the CSV header or on the command line)
/// and field types are raw strings so that unknown ones can be reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDefinition {
    /// Header labels, in column order.
    pub labels: Vec<String>,
    /// Measurement name.
    pub measurement: String,
    /// Columns emitted as tags, in output order.
    pub tag_columns: Vec<String>,
    /// Columns emitted as fields, in output order.
    pub field_columns: Vec<String>,
    /// Declared type of each field column (parallel to `field_columns`).
    pub field_types: Vec<String>,
    /// Pre-formatted timestamp appended to every line.
    pub timestamp: Option<String>,
}

/// Validated, immutable encoding schema for one CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    labels: Vec<String>,
    measurement: String,
    tag_columns: Vec<String>,
    field_columns: Vec<String>,
    field_types: Vec<FieldType>,
    timestamp: Option<String>,
    tag_indexes: Vec<usize>,
    field_indexes: Vec<usize>,
}

impl Schema {
    /// Sanitize and validate a definition.
    ///
    /// # Errors
    /// - [`EncodeError::InvalidSchema`] if a field type is unknown or the
    ///   number of types differs from the number of field columns.
    /// - [`EncodeError::UnknownColumn`] if a tag or field column matches no
    ///   label once sanitized.
    pub fn build(definition: &SchemaDefinition) -> Result<Self, EncodeError> {
        let labels: Vec<String> = definition.labels.iter().map(|l| sanitize(l)).collect();
        let measurement = sanitize_measurement(&definition.measurement);

        let mut field_types = Vec::with_capacity(definition.field_types.len());
        let mut unknown_types = Vec::new();
        for raw in &definition.field_types {
            match raw.parse::<FieldType>() {
                Ok(field_type) => field_types.push(field_type),
                Err(_) => unknown_types.push(raw.clone()),
            }
        }
        if !unknown_types.is_empty() {
            return Err(SchemaProblem::UnknownFieldType {
                types: unknown_types,
            }
            .into());
        }
        if definition.field_columns.len() != field_types.len() {
            return Err(SchemaProblem::FieldCountMismatch {
                columns: definition.field_columns.len(),
                types: field_types.len(),
            }
            .into());
        }

        let tag_columns: Vec<String> = definition.tag_columns.iter().map(|c| sanitize(c)).collect();
        let field_columns: Vec<String> =
            definition.field_columns.iter().map(|c| sanitize(c)).collect();

        let (tag_indexes, field_indexes) = {
            // First occurrence wins when a header repeats a label.
            let mut positions: HashMap<&str, usize> = HashMap::with_capacity(labels.len());
            for (index, label) in labels.iter().enumerate() {
                positions.entry(label.as_str()).or_insert(index);
            }

            let mut missing: Vec<String> = Vec::new();
            for name in tag_columns.iter().chain(field_columns.iter()) {
                if !positions.contains_key(name.as_str()) && !missing.contains(name) {
                    missing.push(name.clone());
                }
            }
            if !missing.is_empty() {
                return Err(EncodeError::UnknownColumn { columns: missing });
            }

            let resolve = |names: &[String]| -> Vec<usize> {
                names
                    .iter()
                    .filter_map(|name| positions.get(name.as_str()).copied())
                    .collect()
            };
            (resolve(&tag_columns), resolve(&field_columns))
        };

        Ok(Self {
            labels,
            measurement,
            tag_columns,
            field_columns,
            field_types,
            timestamp: definition.timestamp.clone(),
            tag_indexes,
            field_indexes,
        })
    }

    /// Sanitized header labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Sanitized measurement name.
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Sanitized tag column names, in output order.
    pub fn tag_columns(&self) -> &[String] {
        &self.tag_columns
    }

    /// Sanitized field column names paired with their declared types.
    pub fn field_columns(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.field_columns
            .iter()
            .map(String::as_str)
            .zip(self.field_types.iter().copied())
    }

    /// Timestamp appended to every line, if any.
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    /// Positions of the tag columns within [`labels`](Self::labels).
    pub fn tag_indexes(&self) -> &[usize] {
        &self.tag_indexes
    }

    /// Positions of the field columns within [`labels`](Self::labels).
    pub fn field_indexes(&self) -> &[usize] {
        &self.field_indexes
    }

    /// Encode one row. See [`encode_row`].
    pub fn export<S: AsRef<str>>(&self, row: &[S]) -> Result<String, EncodeError> {
        encode_row(self, row)
    }
}

/// Encode one CSV row as a Line Protocol line, without line terminator.
///
/// # Errors
/// [`EncodeError::RowArityMismatch`] if the row does not carry exactly one
/// value per label. Nothing is padded or truncated.
pub fn encode_row<S: AsRef<str>>(schema: &Schema, row: &[S]) -> Result<String, EncodeError> {
    if row.len() != schema.labels.len() {
        return Err(EncodeError::RowArityMismatch {
            expected: schema.labels.len(),
            actual: row.len(),
        });
    }

    let mut line = String::with_capacity(schema.measurement.len() + 16 * row.len());
    line.push_str(&schema.measurement);

    for &index in &schema.tag_indexes {
        line.push(',');
        line.push_str(&schema.labels[index]);
        line.push('=');
        line.push_str(&sanitize(row[index].as_ref()));
    }

    line.push(' ');

    for (n, (&index, field_type)) in schema
        .field_indexes
        .iter()
        .zip(&schema.field_types)
        .enumerate()
    {
        if n > 0 {
            line.push(',');
        }
        line.push_str(&schema.labels[index]);
        line.push('=');
        line.push_str(&sanitize_field_value(row[index].as_ref(), *field_type));
    }

    if let Some(timestamp) = &schema.timestamp {
        line.push(' ');
        line.push_str(timestamp);
    }

    Ok(line)
}
