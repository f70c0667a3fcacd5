use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::domain::LoadError;
use crate::record::RecordFields;

/// An entry as stored in the data source. Unknown keys are kept as extras.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SourceEntry {
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub size: Option<Value>,
    pub species: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SourceEntry {
    pub fn species_matches(&self, species: &str) -> bool {
        self.species
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == species.to_lowercase())
    }

    /// Converts into record fields. Entries without a name or species are unusable.
    pub fn into_fields(self) -> Option<RecordFields> {
        let (Some(name), Some(species)) = (self.name, self.species) else {
            debug!("Skipping entry without name or species");
            return None;
        };
        let size = match self.size {
            Some(Value::Number(number)) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
            Some(Value::String(text)) => text.trim().parse().ok(),
            _ => None,
        };
        let extras = self
            .extra
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => (key, text),
                other => (key, other.to_string()),
            })
            .collect();
        Some(RecordFields {
            name,
            location: self.location.unwrap_or_default(),
            size,
            species,
            image: self.image,
            extras,
        })
    }
}

/// Read only collection of entries, keyed by category.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, category: &str) -> Result<Vec<SourceEntry>, LoadError>;
}

/// One `<category>.json` file per category inside a directory.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, category: &str) -> PathBuf {
        self.root.join(format!("{category}.json"))
    }
}

#[async_trait]
impl DataSource for JsonDirSource {
    async fn fetch(&self, category: &str) -> Result<Vec<SourceEntry>, LoadError> {
        let path = self.path_for(category);
        trace!("Reading {}", path.display());
        let bytes = tokio::fs::read(&path).await?;
        let entries: Vec<SourceEntry> = serde_json::from_slice(&bytes)?;
        Ok(entries)
    }
}

/// In memory source, handy for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    collections: HashMap<String, Vec<SourceEntry>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, category: &str, json: &str) -> Result<Self, LoadError> {
        let entries: Vec<SourceEntry> = serde_json::from_str(json)?;
        self.collections.insert(category.to_string(), entries);
        Ok(self)
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self, category: &str) -> Result<Vec<SourceEntry>, LoadError> {
        self.collections
            .get(category)
            .cloned()
            .ok_or_else(|| LoadError::Missing(category.to_string()))
    }
}
