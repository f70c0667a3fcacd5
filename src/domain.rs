use std::fmt;
use std::io;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 4;
pub const DEFAULT_IMAGE: &str = "https://via.placeholder.com/100";
pub const DEFAULT_SIZE_UNIT: &str = "ft";

pub const HELP_TEXT: &str = "\
tab / shift-tab   switch table
left / right      previous / next page
up / down         select row
1..9              sort by column (again to flip direction)
a                 add a record
e                 edit the selected record
d                 delete the selected record
?                 show this help (F1 inside a form)
esc               close popup / cancel
q                 quit";

/// Errors surfaced to the user by table operations.
///
/// None of these leave a partially applied mutation behind: every check runs
/// before the record collection is touched.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),
    #[error("A record named {name} already exists")]
    Conflict { name: String },
    #[error("No record named {name}")]
    NotFound { name: String },
}

/// Failures while fetching the initial data. Recovered inside the table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read data source: {0}")]
    Io(#[from] io::Error),
    #[error("could not decode data source: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no data for category {0}")]
    Missing(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("could not set up logging: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A column of a table. Extras are attributes a data source carries beyond
/// the four known ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Field {
    Name,
    Location,
    Size,
    Species,
    Extra(String),
}

impl Field {
    pub fn key(&self) -> &str {
        match self {
            Field::Name => "name",
            Field::Location => "location",
            Field::Size => "size",
            Field::Species => "species",
            Field::Extra(key) => key,
        }
    }

    /// Column heading: the key with its first letter upper cased.
    pub fn label(&self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Field::Size)
    }
}

impl From<&str> for Field {
    fn from(key: &str) -> Self {
        match key {
            "name" => Field::Name,
            "location" => Field::Location,
            "size" => Field::Size,
            "species" => Field::Species,
            other => Field::Extra(other.to_string()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Decoration applied to the name cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LabelStyle {
    #[default]
    Plain,
    Bold,
    BoldItalicAccent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Static configuration of one table. Nothing in here changes after the
/// table has been created.
#[derive(Debug, Clone, Setters)]
pub struct TableConfig {
    /// Identifier used by the orchestration layer and in log spans.
    #[setters(into)]
    pub table_id: String,
    /// Key of the data source collection, e.g. `bigCats`.
    #[setters(into)]
    pub category: String,
    /// Species label an entry must carry to belong to this table.
    #[setters(into)]
    pub species: String,
    pub sortable_fields: Vec<Field>,
    pub label_style: LabelStyle,
    /// Declared column schema. Image and actions are rendered separately.
    pub columns: Vec<Field>,
    pub page_size: usize,
    #[setters(into)]
    pub default_image: String,
    #[setters(into)]
    pub size_unit: String,
}

impl TableConfig {
    pub fn new(
        table_id: impl Into<String>,
        category: impl Into<String>,
        species: impl Into<String>,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            category: category.into(),
            species: species.into(),
            sortable_fields: Vec::new(),
            label_style: LabelStyle::Plain,
            columns: vec![Field::Name, Field::Species, Field::Size, Field::Location],
            page_size: DEFAULT_PAGE_SIZE,
            default_image: DEFAULT_IMAGE.to_string(),
            size_unit: DEFAULT_SIZE_UNIT.to_string(),
        }
    }

    pub fn big_cats() -> Self {
        Self::new("bigCatsTable", "bigCats", "big cat")
            .sortable_fields(vec![Field::Name, Field::Location, Field::Size])
    }

    pub fn dogs() -> Self {
        Self::new("dogsTable", "dogs", "dog")
            .sortable_fields(vec![Field::Name, Field::Location])
            .label_style(LabelStyle::Bold)
    }

    pub fn big_fish() -> Self {
        Self::new("bigFishTable", "bigFish", "big fish")
            .sortable_fields(vec![Field::Size])
            .label_style(LabelStyle::BoldItalicAccent)
    }

    pub fn presets() -> Vec<Self> {
        vec![Self::big_cats(), Self::dogs(), Self::big_fish()]
    }

    pub fn is_sortable(&self, field: &Field) -> bool {
        self.sortable_fields.contains(field)
    }

    /// Human readable category, "bigCats" becomes "Big Cats".
    pub fn display_label(&self) -> String {
        let mut words: Vec<String> = Vec::new();
        let mut current = String::new();
        for chr in self.category.chars() {
            if chr.is_uppercase() && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(chr);
        }
        if !current.is_empty() {
            words.push(current);
        }
        words
            .iter()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    NextTable,
    PrevTable,
    NextPage,
    PrevPage,
    MoveUp,
    MoveDown,
    SortColumn(usize),
    Add,
    Edit,
    Delete,
    Confirm(bool),
    NextField,
    PrevField,
    Submit,
    RawKey(KeyEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_splits_camel_case() {
        assert_eq!(TableConfig::big_cats().display_label(), "Big Cats");
        assert_eq!(TableConfig::dogs().display_label(), "Dogs");
        assert_eq!(TableConfig::big_fish().display_label(), "Big Fish");
    }

    #[test]
    fn field_round_trips_through_its_key() {
        for field in [Field::Name, Field::Location, Field::Size, Field::Species] {
            assert_eq!(Field::from(field.key()), field);
        }
        assert_eq!(Field::from("habitat"), Field::Extra("habitat".into()));
        assert_eq!(Field::Extra("habitat".into()).label(), "Habitat");
    }

    #[test]
    fn presets_carry_the_expected_sortable_fields() {
        let fish = TableConfig::big_fish();
        assert!(fish.is_sortable(&Field::Size));
        assert!(!fish.is_sortable(&Field::Name));
        assert_eq!(fish.label_style, LabelStyle::BoldItalicAccent);
        assert_eq!(TableConfig::dogs().page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn validation_error_lists_every_message() {
        let err = TableError::Validation(vec!["Name is required".into(), "Size is required".into()]);
        assert_eq!(err.to_string(), "Name is required\nSize is required");
    }
}
