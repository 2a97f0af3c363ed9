//! Core index profile management.
//!
//! This module owns the two files chpip cares about:
//! - the registry (`~/.pip/.chpip.yml`) holding named indexes and the
//!   current/last pointers
//! - pip's config (`~/.pip/pip.conf`) whose `global.index-url` mirrors the
//!   current index
//!
//! Every operation validates first and only then writes, so a failed
//! command leaves both files as they were.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use crate::error::IndexError;
use crate::paths::Paths;
use crate::pip_config::PipConfig;
use crate::registry::{DEFAULT_INDEX_NAME, DEFAULT_INDEX_URL, Registry};

/// Outcome of a successful activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Name of the index that is now active
    pub name: String,
    /// URL written to pip.conf
    pub index_url: String,
    /// Name of the index that was active before
    pub previous_name: String,
    /// Whether the caller asked for this index by name
    pub explicit: bool,
}

impl Activation {
    /// Label for messages. An implicit switch back to PyPI reads as `last(default)`.
    pub fn display_name(&self) -> String {
        if !self.explicit && self.name == DEFAULT_INDEX_NAME {
            format!("last({})", DEFAULT_INDEX_NAME)
        } else {
            self.name.clone()
        }
    }
}

/// One row of `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedIndex {
    pub name: String,
    pub index_url: String,
    pub is_current: bool,
}

/// What the registry believes is active, next to what pip.conf says
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentIndex {
    /// Active index name (`default` when nothing was ever activated)
    pub name: String,
    /// URL the registry holds for `name`, if it resolves
    pub index_url: Option<String>,
    /// Raw `global.index-url` from pip.conf
    pub configured_url: Option<String>,
    pub last_name: Option<String>,
}

impl CurrentIndex {
    /// URL pip will actually use
    pub fn effective_url(&self) -> &str {
        self.configured_url.as_deref().unwrap_or(DEFAULT_INDEX_URL)
    }

    /// True when pip.conf agrees with the registry
    pub fn in_sync(&self) -> bool {
        self.index_url.as_deref() == Some(self.effective_url())
    }
}

/// Validate an index name for registration
pub fn validate_index_name(name: &str) -> Result<(), IndexError> {
    if name.trim().is_empty() || name == DEFAULT_INDEX_NAME {
        return Err(IndexError::InvalidIndexName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Validate an index URL. Only the scheme is checked, never reachability.
pub fn validate_index_url(url: &str) -> Result<(), IndexError> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(IndexError::InvalidIndexURL {
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Register (or update) a named index
///
/// Leaves pip.conf and the current/last pointers alone.
pub fn register(paths: &Paths, name: &str, index_url: &str) -> Result<String> {
    validate_index_name(name)?;
    validate_index_url(index_url)?;

    let mut registry = Registry::load(&paths.registry_file)?;
    let updated = registry.contains(name);
    registry.upsert(name, index_url);
    registry.save(&paths.registry_file)?;

    info!(index = name, index_url, updated, "registered index");
    Ok(name.to_string())
}

/// Switch pip to another index
///
/// With `name`, that index is used. Without it, the previously active index
/// is used, falling back to the first registered one. Calling this
/// repeatedly with no name toggles between the two most recent indexes.
pub fn activate(paths: &Paths, name: Option<&str>) -> Result<Activation> {
    let mut registry = Registry::load(&paths.registry_file)?;

    if registry.is_empty() {
        return Err(IndexError::NoAvailableIndex.into());
    }

    let next_name = match name {
        Some(name) => {
            if !registry.contains(name) {
                return Err(IndexError::IndexNameNotFound {
                    name: name.to_string(),
                }
                .into());
            }
            name.to_string()
        }
        None => match &registry.last_index_name {
            Some(last) => last.clone(),
            None => registry
                .first_name()
                .map(str::to_string)
                .ok_or(IndexError::NoAvailableIndex)?,
        },
    };

    let next_url = registry
        .url_of(&next_name)
        .map(str::to_string)
        .with_context(|| {
            format!(
                "Registry is inconsistent: last index '{}' is not registered",
                next_name
            )
        })?;

    let (previous_name, previous_url) = active_index(&registry)?;

    let mut pip_config = PipConfig::load(&paths.pip_conf)?;
    pip_config.set_index_url(&next_url);
    pip_config.save(&paths.pip_conf)?;

    // PyPI becomes a regular, re-selectable entry the first time it is displaced
    if previous_name == DEFAULT_INDEX_NAME && !registry.contains(DEFAULT_INDEX_NAME) {
        registry.upsert(DEFAULT_INDEX_NAME, &previous_url);
    }
    registry.last_index_name = Some(previous_name.clone());
    registry.current_index_name = Some(next_name.clone());
    registry.save(&paths.registry_file)?;

    info!(
        from = %previous_name,
        to = %next_name,
        index_url = %next_url,
        "activated index"
    );

    Ok(Activation {
        name: next_name,
        index_url: next_url,
        previous_name,
        explicit: name.is_some(),
    })
}

/// All registered indexes in registration order
pub fn list(paths: &Paths) -> Result<Vec<ListedIndex>> {
    let registry = Registry::load(&paths.registry_file)?;
    let current = registry.current_index_name.as_deref();

    Ok(registry
        .indexes
        .iter()
        .map(|(name, entry)| ListedIndex {
            name: name.clone(),
            index_url: entry.index_url.clone(),
            is_current: Some(name.as_str()) == current,
        })
        .collect())
}

/// Report the active index and what pip.conf currently holds
pub fn current(paths: &Paths) -> Result<CurrentIndex> {
    let registry = Registry::load(&paths.registry_file)?;
    let pip_config = PipConfig::load(&paths.pip_conf)?;

    let name = registry
        .current_index_name
        .clone()
        .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());
    let index_url = match registry.url_of(&name) {
        Some(url) => Some(url.to_string()),
        None if name == DEFAULT_INDEX_NAME => Some(DEFAULT_INDEX_URL.to_string()),
        None => None,
    };

    Ok(CurrentIndex {
        name,
        index_url,
        configured_url: pip_config.index_url().map(str::to_string),
        last_name: registry.last_index_name.clone(),
    })
}

/// Name and URL of the index the registry considers active
fn active_index(registry: &Registry) -> Result<(String, String)> {
    let Some(current) = registry.current_index_name.as_deref() else {
        return Ok((DEFAULT_INDEX_NAME.to_string(), DEFAULT_INDEX_URL.to_string()));
    };

    match registry.url_of(current) {
        Some(url) => Ok((current.to_string(), url.to_string())),
        None if current == DEFAULT_INDEX_NAME => {
            Ok((DEFAULT_INDEX_NAME.to_string(), DEFAULT_INDEX_URL.to_string()))
        }
        None => bail!(
            "Registry is inconsistent: current index '{}' is not registered",
            current
        ),
    }
}
