//! The profile registry persisted in ~/.pip/.chpip.yml
//!
//! The registry is read and written as a whole: load, mutate in memory,
//! save. Parsing and rendering are plain functions over strings so the
//! file handling stays thin.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::debug;

/// Name of the implicit profile that points at PyPI
pub const DEFAULT_INDEX_NAME: &str = "default";

/// Index URL pip uses when nothing else is configured
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/simple";

/// A single named index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub index_url: String,
}

/// Registered indexes plus the current/last pointers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Indexes in insertion order. The order is part of the format: an
    /// activation with no name and no history picks the first entry.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub indexes: IndexMap<String, IndexEntry>,

    /// The index currently written to pip.conf (`None` means PyPI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_index_name: Option<String>,

    /// The index that was active before the current one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_index_name: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<IndexMap<String, IndexEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let indexes: Option<IndexMap<String, IndexEntry>> = Option::deserialize(deserializer)?;
    Ok(indexes.unwrap_or_default())
}

impl Registry {
    /// Parse registry YAML. Blank or null documents are an empty registry.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let parsed: Option<Self> =
            serde_yaml_ng::from_str(content).context("Malformed registry data")?;
        Ok(parsed.unwrap_or_default())
    }

    /// Render the registry as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).context("Failed to serialize registry")
    }

    /// Read the registry from file, returning an empty one if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "registry file missing, starting empty");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read registry file: {:?}", path))?;

        let registry = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse registry file: {:?}", path))?;
        debug!(
            path = %path.display(),
            indexes = registry.indexes.len(),
            "loaded registry"
        );
        Ok(registry)
    }

    /// Write the registry to file atomically
    ///
    /// Writes to a temp file next to the target, then renames it over the
    /// target so a crash never leaves a half-written registry behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create registry directory: {:?}", parent))?;
        }

        let content = self.to_yaml()?;

        let temp_path = path.with_extension("yml.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("Failed to write temp registry file: {:?}", temp_path))?;

        std::fs::rename(&temp_path, path).with_context(|| {
            format!(
                "Failed to rename registry file: {:?} -> {:?}",
                temp_path, path
            )
        })?;

        debug!(path = %path.display(), indexes = self.indexes.len(), "saved registry");
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Look up the URL stored for `name`
    pub fn url_of(&self, name: &str) -> Option<&str> {
        self.indexes.get(name).map(|entry| entry.index_url.as_str())
    }

    /// Name of the earliest registered index
    pub fn first_name(&self) -> Option<&str> {
        self.indexes.keys().next().map(String::as_str)
    }

    /// Insert or update an index. An existing name keeps its position.
    pub fn upsert(&mut self, name: &str, index_url: &str) {
        self.indexes.insert(
            name.to_string(),
            IndexEntry {
                index_url: index_url.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_registry_default() {
        let registry = Registry::default();
        assert!(registry.is_empty());
        assert!(registry.current_index_name.is_none());
        assert!(registry.last_index_name.is_none());
    }

    #[test]
    fn test_from_yaml_blank_and_null() {
        assert_eq!(Registry::from_yaml("").unwrap(), Registry::default());
        assert_eq!(Registry::from_yaml("  \n").unwrap(), Registry::default());
        assert_eq!(Registry::from_yaml("~\n").unwrap(), Registry::default());
        assert_eq!(
            Registry::from_yaml("indexes: null\n").unwrap(),
            Registry::default()
        );
    }

    #[test]
    fn test_from_yaml_malformed_fails() {
        assert!(Registry::from_yaml("indexes: [[[").is_err());
        assert!(Registry::from_yaml("indexes:\n  - a\n  - b\n").is_err());
        assert!(Registry::from_yaml("indexes:\n  t:\n    url: https://x\n").is_err());
    }

    #[test]
    fn test_order_survives_rewrite() {
        let mut registry = Registry::default();
        registry.upsert("zeta", "https://zeta.example/simple");
        registry.upsert("alpha", "https://alpha.example/simple");
        registry.upsert("mid", "https://mid.example/simple");

        let parsed = Registry::from_yaml(&registry.to_yaml().unwrap()).unwrap();
        let names: Vec<&str> = parsed.indexes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(parsed.first_name(), Some("zeta"));
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut registry = Registry::default();
        registry.upsert("t1", "https://test1.com");
        registry.upsert("t2", "https://test2.com");
        registry.upsert("t1", "https://test1-new.com");

        let names: Vec<&str> = registry.indexes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["t1", "t2"]);
        assert_eq!(registry.url_of("t1"), Some("https://test1-new.com"));
    }

    #[test]
    fn test_unset_pointers_are_omitted() {
        let mut registry = Registry::default();
        registry.upsert("t1", "https://test1.com");
        let yaml = registry.to_yaml().unwrap();
        assert!(yaml.contains("indexes:"));
        assert!(!yaml.contains("current_index_name"));
        assert!(!yaml.contains("last_index_name"));
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.yml");
        let registry = Registry::load(&path).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(".chpip.yml");

        let mut registry = Registry::default();
        registry.upsert("corp", "https://pypi.corp.example/simple");
        registry.current_index_name = Some("corp".to_string());
        registry.last_index_name = Some(DEFAULT_INDEX_NAME.to_string());
        registry.save(&path).unwrap();

        assert!(!path.with_extension("yml.tmp").exists());
        let loaded = Registry::load(&path).unwrap();
        assert_eq!(loaded, registry);
    }

    #[test]
    fn test_load_corrupt_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".chpip.yml");
        std::fs::write(&path, "not: valid: yaml: [[[").unwrap();

        let err = Registry::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains(".chpip.yml"));
    }
}
