// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! csv2influx
//!
//! Converts CSV files into InfluxDB Line Protocol.
//!
//! This crate provides:
//! - A Line Protocol encoder driven by a per-file schema (tags, typed fields,
//!   measurement, fixed timestamp)
//! - Column role selection (`name:type` fields, `*` for all-but-fields tags)
//! - Timestamp normalisation to epoch nanoseconds
//! - CSV reading, file output and HTTP delivery to a write endpoint
//! - YAML job configuration
//!
//! # Overview
//!
//! ```text
//! CSV header --> ColumnSelection --> Schema::build --> Schema
//! CSV row ----------------------------------------> encode_row --> line
//! ```
//!
//! # Example
//!
//! ```
//! use csv2influx::{Schema, SchemaDefinition};
//!
//! let schema = Schema::build(&SchemaDefinition {
//!     labels: vec!["time".into(), "speed".into(), "name".into(), "class".into()],
//!     measurement: "cars".into(),
//!     tag_columns: vec!["name".into(), "class".into()],
//!     field_columns: vec!["speed".into()],
//!     field_types: vec!["int".into()],
//!     timestamp: Some("1474855200000000000".into()),
//! })
//! .unwrap();
//!
//! let line = schema.export(&["2016-09-26", "55", "Model T", "vintage"]).unwrap();
//! assert_eq!(line, r"cars,name=model\ t,class=vintage speed=55i 1474855200000000000");
//! ```

pub mod columns;
pub mod config;
pub mod convert;
pub mod delivery;
pub mod error;
pub mod influx;
pub mod inputs;
pub mod job;
pub mod output;
pub mod timestamp;

pub use columns::{ColumnSelection, FieldColumn, TagSelection};
pub use config::JobConfig;
pub use convert::{ConvertOptions, Converted, Converter};
pub use delivery::WriteEndpoint;
pub use error::{EncodeError, SchemaProblem};
pub use influx::{encode_row, FieldType, Schema, SchemaDefinition};
pub use job::{Job, JobError};
pub use output::OutputTarget;
