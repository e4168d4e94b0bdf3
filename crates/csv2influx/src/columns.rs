// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tag and field column selection.
//!
//! Turns the user's column roles (`--tag-columns`, `--field-columns` or the
//! equivalent configuration keys) into a [`SchemaDefinition`] once the CSV
//! header of a file is known.

use crate::influx::{sanitize, FieldType, SchemaDefinition};
use thiserror::Error;

/// Separator between a field column name and its declared type (`speed:int`).
pub const FIELD_TYPE_SEPARATOR: char = ':';

/// Type assumed for field columns declared without one.
pub const DEFAULT_FIELD_TYPE: FieldType = FieldType::Float;

/// Column selection errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    #[error("at least one field column is required")]
    NoFields,
}

/// A field column and the type it was declared with.
///
/// The type is kept as text and validated by the job or schema that uses
/// it, so that every unknown type can be reported at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldColumn {
    pub name: String,
    pub field_type: String,
}

impl FieldColumn {
    /// Parse `name` or `name:type`.
    pub fn parse(spec: &str) -> Self {
        match spec.rsplit_once(FIELD_TYPE_SEPARATOR) {
            Some((name, field_type)) => Self {
                name: name.trim().to_string(),
                field_type: field_type.trim().to_string(),
            },
            None => Self {
                name: spec.trim().to_string(),
                field_type: DEFAULT_FIELD_TYPE.as_str().to_string(),
            },
        }
    }
}

/// Which columns become tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagSelection {
    /// No tags.
    #[default]
    None,
    /// Every column not selected as a field, in header order (`*`).
    AllButFields,
    /// The named columns, in the given order.
    Columns(Vec<String>),
}

impl TagSelection {
    /// Parse a comma-separated list, `*`, or an empty string.
    pub fn parse(spec: &str) -> Self {
        let names: Vec<String> = split_list(spec).collect();
        Self::from_list(&names)
    }

    /// Build from an already split list.
    pub fn from_list(names: &[String]) -> Self {
        match names {
            [] => TagSelection::None,
            [star] if star.trim() == "*" => TagSelection::AllButFields,
            _ => TagSelection::Columns(
                names
                    .iter()
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .collect(),
            ),
        }
    }
}

/// Tag and field roles requested for every input file of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    tags: TagSelection,
    fields: Vec<FieldColumn>,
}

impl ColumnSelection {
    /// Create a selection from parsed parts.
    pub fn new(tags: TagSelection, fields: Vec<FieldColumn>) -> Result<Self, ColumnError> {
        if fields.is_empty() {
            return Err(ColumnError::NoFields);
        }
        Ok(Self { tags, fields })
    }

    /// Parse command-line style lists (`name,class` and `speed:int,power`).
    pub fn parse(tags: Option<&str>, fields: &str) -> Result<Self, ColumnError> {
        let tags = tags.map(TagSelection::parse).unwrap_or_default();
        let fields = split_list(fields).map(|f| FieldColumn::parse(&f)).collect();
        Self::new(tags, fields)
    }

    /// Build from configuration lists.
    pub fn from_lists(tags: &[String], fields: &[String]) -> Result<Self, ColumnError> {
        let fields = fields
            .iter()
            .filter(|f| !f.trim().is_empty())
            .map(|f| FieldColumn::parse(f))
            .collect();
        Self::new(TagSelection::from_list(tags), fields)
    }

    /// Requested tag columns.
    pub fn tags(&self) -> &TagSelection {
        &self.tags
    }

    /// Requested field columns.
    pub fn fields(&self) -> &[FieldColumn] {
        &self.fields
    }

    /// Resolve against a file header into encoder inputs.
    pub fn definition(
        &self,
        labels: &[String],
        measurement: &str,
        timestamp: Option<&str>,
    ) -> SchemaDefinition {
        let field_columns: Vec<String> = self.fields.iter().map(|f| f.name.clone()).collect();
        let field_types: Vec<String> = self.fields.iter().map(|f| f.field_type.clone()).collect();

        let tag_columns = match &self.tags {
            TagSelection::None => Vec::new(),
            TagSelection::Columns(names) => names.clone(),
            TagSelection::AllButFields => {
                let fields: Vec<String> = field_columns.iter().map(|f| sanitize(f)).collect();
                labels
                    .iter()
                    .filter(|label| !fields.contains(&sanitize(label)))
                    .cloned()
                    .collect()
            }
        };

        SchemaDefinition {
            labels: labels.to_vec(),
            measurement: measurement.to_string(),
            tag_columns,
            field_columns,
            field_types,
            timestamp: timestamp.map(str::to_string),
        }
    }
}

/// Split a comma-separated list, trimming entries and skipping empty ones.
pub fn split_list(spec: &str) -> impl Iterator<Item = String> + '_ {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::influx::Schema;

    fn labels() -> Vec<String> {
        ["time", "Speed", "name", "class"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_field_column_with_type() {
        let field = FieldColumn::parse("speed:int");
        assert_eq!(field.name, "speed");
        assert_eq!(field.field_type, "int");
    }

    #[test]
    fn test_field_column_defaults_to_float() {
        let field = FieldColumn::parse(" strength ");
        assert_eq!(field.name, "strength");
        assert_eq!(field.field_type, "float");
    }

    #[test]
    fn test_split_list_trims_and_skips_empty() {
        let items: Vec<String> = split_list(" name, ,class ,").collect();
        assert_eq!(items, vec!["name", "class"]);
        assert_eq!(split_list("").count(), 0);
    }

    #[test]
    fn test_tag_selection_parse() {
        assert_eq!(TagSelection::parse(""), TagSelection::None);
        assert_eq!(TagSelection::parse(" * "), TagSelection::AllButFields);
        assert_eq!(
            TagSelection::parse("name, class,"),
            TagSelection::Columns(vec!["name".into(), "class".into()])
        );
    }

    #[test]
    fn test_selection_requires_a_field() {
        assert_eq!(
            ColumnSelection::parse(Some("name"), " , ").unwrap_err(),
            ColumnError::NoFields
        );
        assert_eq!(
            ColumnSelection::from_lists(&[], &[]).unwrap_err(),
            ColumnError::NoFields
        );
    }

    #[test]
    fn test_definition_with_named_tags() {
        let selection =
            ColumnSelection::parse(Some("name,class"), "speed:int").expect("selection");
        let definition = selection.definition(&labels(), "cars", Some("1"));

        assert_eq!(definition.tag_columns, vec!["name", "class"]);
        assert_eq!(definition.field_columns, vec!["speed"]);
        assert_eq!(definition.field_types, vec!["int"]);
        assert_eq!(definition.timestamp.as_deref(), Some("1"));
    }

    #[test]
    fn test_definition_star_selects_remaining_columns() {
        let selection = ColumnSelection::parse(Some("*"), "SPEED:int").expect("selection");
        let definition = selection.definition(&labels(), "cars", None);

        assert_eq!(definition.tag_columns, vec!["time", "name", "class"]);

        let schema = Schema::build(&definition).expect("build schema");
        let line = schema
            .export(&["2016-09-26", "55", "Model T", "vintage"])
            .expect("export row");
        assert_eq!(
            line,
            "cars,time=2016-09-26,name=model\\ t,class=vintage speed=55i"
        );
    }

    #[test]
    fn test_definition_without_tags() {
        let selection = ColumnSelection::from_lists(&[], &["speed:float".into()]).expect("selection");
        let definition = selection.definition(&labels(), "cars", None);
        assert!(definition.tag_columns.is_empty());
    }
}
