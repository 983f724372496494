//! The immutable key → definition catalog.
//!
//! Supplied whole at startup; lookup is the only behavior. All resolution
//! and caching lives in the engine.

use super::definition::Definition;
use crate::error::{PicklistError, Result};
use crate::models::OptionItem;
use std::collections::HashMap;
use tracing::warn;

/// Immutable mapping from a string key to its [`Definition`].
#[derive(Debug, Clone, Default)]
pub struct DefinitionCatalog {
    defs: HashMap<String, Definition>,
}

impl DefinitionCatalog {
    /// Start building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub(crate) fn from_defs(defs: HashMap<String, Definition>) -> Self {
        Self { defs }
    }

    /// Look up a definition by key.
    pub fn get(&self, key: &str) -> Option<&Definition> {
        self.defs.get(key)
    }

    /// Whether the catalog contains a key.
    pub fn contains(&self, key: &str) -> bool {
        self.defs.contains_key(key)
    }

    /// Iterate over registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    /// Iterate over (key, definition) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.defs.iter().map(|(k, d)| (k.as_str(), d))
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Builder for [`DefinitionCatalog`].
///
/// Duplicate keys are collected and reported as a [`PicklistError::Catalog`]
/// at build time instead of silently overwriting.
#[derive(Default)]
pub struct CatalogBuilder {
    defs: HashMap<String, Definition>,
    duplicates: Vec<String>,
}

impl CatalogBuilder {
    /// Register a definition under a key.
    pub fn define(mut self, key: impl Into<String>, definition: Definition) -> Self {
        self.insert(key.into(), definition);
        self
    }

    /// Register a static list under a key.
    pub fn define_static(
        self,
        key: impl Into<String>,
        items: impl IntoIterator<Item = OptionItem>,
    ) -> Self {
        self.define(key, Definition::from_static(items))
    }

    /// Register a static list described as JSON.
    ///
    /// A malformed value degrades to an empty static list with a logged
    /// warning, so one bad data file cannot take down assembly.
    pub fn define_json(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        let key = key.into();
        match Definition::from_json(&key, value) {
            Ok(def) => self.insert(key, def),
            Err(e) => {
                warn!("Malformed definition for {}, using empty list: {}", key, e);
                self.insert(key, Definition::from_static([]));
            }
        }
        self
    }

    fn insert(&mut self, key: String, definition: Definition) {
        if self.defs.contains_key(&key) {
            warn!("Duplicate option definition: {}", key);
            self.duplicates.push(key);
        } else {
            self.defs.insert(key, definition);
        }
    }

    /// Finish the catalog.
    pub fn build(self) -> Result<DefinitionCatalog> {
        if !self.duplicates.is_empty() {
            return Err(PicklistError::Catalog {
                message: format!("duplicate keys: {}", self.duplicates.join(", ")),
            });
        }
        Ok(DefinitionCatalog::from_defs(self.defs))
    }
}
