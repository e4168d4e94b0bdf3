// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Errors raised by the Line Protocol encoder.
//!
//! Schema problems surface when a [`Schema`](crate::influx::Schema) is built,
//! row problems when a row is exported. Each variant carries enough detail
//! (offending names, expected/actual counts) for the caller to report it.

use thiserror::Error;

/// Encoder error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The field type list is inconsistent with the field columns.
    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] SchemaProblem),

    /// Tag or field columns that match no header label.
    #[error(
        "some specified tags or fields are not matching any label: {}",
        .columns.join(", ")
    )]
    UnknownColumn {
        /// Sanitized names of the missing columns, in the order supplied.
        columns: Vec<String>,
    },

    /// A row does not have one value per header label.
    #[error("received {actual} values for {expected} labels")]
    RowArityMismatch {
        /// Number of header labels.
        expected: usize,
        /// Number of values in the row.
        actual: usize,
    },
}

/// Reason a schema was rejected as [`EncodeError::InvalidSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaProblem {
    #[error("number of field columns ({columns}) and types ({types}) don't match")]
    FieldCountMismatch { columns: usize, types: usize },

    #[error(
        "wrong field type(s) {}; valid types are: float, int, str, bool",
        .types.join(", ")
    )]
    UnknownFieldType { types: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_column_lists_all_names() {
        let err = EncodeError::UnknownColumn {
            columns: vec!["speed".into(), "color".into()],
        };
        assert_eq!(
            err.to_string(),
            "some specified tags or fields are not matching any label: speed, color"
        );
    }

    #[test]
    fn test_invalid_schema_wraps_problem() {
        let err: EncodeError = SchemaProblem::FieldCountMismatch {
            columns: 2,
            types: 1,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid schema: number of field columns (2) and types (1) don't match"
        );
    }
}
