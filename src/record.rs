use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::{Field, TableError};

// Scheme optional, a host with at least one dot separated label, optional path or query.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$",
    )
    .expect("url pattern is valid")
});

pub fn is_valid_url(url: &str) -> bool {
    URL_PATTERN.is_match(url)
}

/// One row of a category table. Replaced wholesale on edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: String,
    pub location: String,
    pub size: Option<u32>,
    pub species: String,
    pub image: String,
    pub extras: BTreeMap<String, String>,
}

/// The raw attributes a record is built from, before the image fallback is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFields {
    pub name: String,
    pub location: String,
    pub size: Option<u32>,
    pub species: String,
    pub image: Option<String>,
    pub extras: BTreeMap<String, String>,
}

/// Builds a record, substituting `default_image` when no image is given.
pub fn make_record(fields: RecordFields, default_image: &str) -> Record {
    let image = fields
        .image
        .filter(|image| !image.trim().is_empty())
        .unwrap_or_else(|| default_image.to_string());
    Record {
        name: fields.name,
        location: fields.location,
        size: fields.size,
        species: fields.species,
        image,
        extras: fields.extras,
    }
}

impl Record {
    /// Raw string value of a column, `None` when the record has nothing for it.
    pub fn value(&self, field: &Field) -> Option<String> {
        match field {
            Field::Name => Some(self.name.clone()),
            Field::Location => Some(self.location.clone()),
            Field::Size => self.size.map(|size| size.to_string()),
            Field::Species => Some(self.species.clone()),
            Field::Extra(key) => self.extras.get(key).cloned(),
        }
    }

    pub fn same_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Whether a submitted form creates a record or replaces an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit { original_name: String },
}

/// Raw form input, everything as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordForm {
    pub name: String,
    pub location: String,
    pub size: String,
    pub species: String,
    pub image: String,
}

impl RecordForm {
    /// Blank form for a table, species pre-filled and fixed.
    pub fn for_species(species: &str) -> Self {
        Self {
            species: species.to_string(),
            ..Self::default()
        }
    }

    pub fn from_record(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            location: record.location.clone(),
            size: record.size.map(|size| size.to_string()).unwrap_or_default(),
            species: record.species.clone(),
            image: record.image.clone(),
        }
    }

    /// Checks every field and reports all problems at once.
    pub fn validate(&self) -> Result<RecordFields, TableError> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("Name is required".to_string());
        }
        let location = self.location.trim();
        if location.is_empty() {
            errors.push("Location is required".to_string());
        }

        let size = self.size.trim();
        let parsed_size = if size.is_empty() {
            errors.push("Size is required".to_string());
            None
        } else {
            match size.parse::<u32>() {
                Ok(value) if value > 0 => Some(value),
                _ => {
                    errors.push("Size must be a positive whole number".to_string());
                    None
                }
            }
        };

        let species = self.species.trim();
        if species.is_empty() {
            errors.push("Species is required".to_string());
        }

        let image = self.image.trim();
        if !image.is_empty() && !is_valid_url(image) {
            errors.push("Image URL is invalid".to_string());
        }

        if !errors.is_empty() {
            return Err(TableError::Validation(errors));
        }

        Ok(RecordFields {
            name: name.to_string(),
            location: location.to_string(),
            size: parsed_size,
            species: species.to_string(),
            image: (!image.is_empty()).then(|| image.to_string()),
            extras: BTreeMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leo() -> RecordForm {
        RecordForm {
            name: "Leo".into(),
            location: "Savanna".into(),
            size: "8".into(),
            species: "big cat".into(),
            image: String::new(),
        }
    }

    #[test]
    fn missing_image_falls_back_to_default() {
        let fields = leo().validate().unwrap();
        let record = make_record(fields, "https://example.com/default.png");
        assert_eq!(record.image, "https://example.com/default.png");
        assert_eq!(record.size, Some(8));
    }

    #[test]
    fn supplied_image_is_kept() {
        let form = RecordForm {
            image: "https://example.com/leo.jpg".into(),
            ..leo()
        };
        let record = make_record(form.validate().unwrap(), "https://example.com/default.png");
        assert_eq!(record.image, "https://example.com/leo.jpg");
    }

    #[test]
    fn errors_are_collected_in_field_order() {
        let form = RecordForm {
            name: "  ".into(),
            location: String::new(),
            size: "big".into(),
            species: "big cat".into(),
            image: "not a url".into(),
        };
        assert_eq!(
            form.validate(),
            Err(TableError::Validation(vec![
                "Name is required".into(),
                "Location is required".into(),
                "Size must be a positive whole number".into(),
                "Image URL is invalid".into(),
            ]))
        );
    }

    #[test]
    fn size_must_be_positive() {
        for size in ["0", "-3", "2.5", ""] {
            let form = RecordForm {
                size: size.into(),
                ..leo()
            };
            assert!(form.validate().is_err(), "size {size:?} should be rejected");
        }
    }

    #[test]
    fn url_shapes() {
        assert!(is_valid_url("example.com"));
        assert!(is_valid_url("https://www.example.com/cats/leo.png?w=100"));
        assert!(is_valid_url("http://via.placeholder.com/100"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("localhost"));
    }

    #[test]
    fn fields_are_trimmed() {
        let form = RecordForm {
            name: "  Leo ".into(),
            ..leo()
        };
        assert_eq!(form.validate().unwrap().name, "Leo");
    }

    #[test]
    fn name_comparison_ignores_case() {
        let record = make_record(leo().validate().unwrap(), "x.com");
        assert!(record.same_name("LEO"));
        assert!(!record.same_name("Leon"));
    }
}
