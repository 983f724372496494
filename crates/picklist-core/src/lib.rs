//! Picklist - headless option-list resolution and caching.
//!
//! This crate turns a catalog of named option definitions (static lists,
//! computed functions, async remote fetches, reactive sources) into handles
//! that resolve lazily, memoize per argument tuple, single-flight concurrent
//! remote loads, and share a short-lived global cache for the zero-argument
//! case. It knows nothing about HTTP or UI; remote definitions are closures
//! supplied by the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use picklist::{registry::seeds, OptionService};
//!
//! #[tokio::main]
//! async fn main() -> picklist::Result<()> {
//!     let options = OptionService::new(seeds::stock_catalog());
//!
//!     // As an ordered sequence
//!     for item in &options.get("status") {
//!         println!("{} = {}", item.label, item.value);
//!     }
//!
//!     // Derived views
//!     assert_eq!(options.get("status").label("ACTIVE"), "啟用");
//!     let with_all = options.get("status").with_all();
//!
//!     // Parameterized, independently cached
//!     let tpe = options.get("townships").bind(["TPE"]);
//!     let districts = tpe.ensure_loaded().await?;
//!     println!("{} districts", districts.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod registry;

mod handle;

// Re-export commonly used types
pub use config::OptionsConfig;
pub use engine::GlobalCache;
pub use error::{PicklistError, Result};
pub use handle::{OptionHandle, OptionIter};
pub use models::{empty_list, LoaderStatus, OptionItem, OptionList, OptionValue};
pub use registry::{
    AsyncResolver, CatalogBuilder, Definition, DefinitionCatalog, ReactiveMode, SyncResolver,
};

use engine::OptionLoader;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// The assembled option system: one handle per registered key.
///
/// Built once at application start from an immutable [`DefinitionCatalog`]
/// and passed by reference to consumers. The service itself is stateless;
/// all mutable state lives in the per-key resolution engines, so cloning a
/// handle out of it is cheap and getting the same key twice observes the
/// same memoized snapshot.
pub struct OptionService {
    catalog: DefinitionCatalog,
    loaders: HashMap<String, Arc<OptionLoader>>,
    handles: HashMap<String, OptionHandle>,
    global: Arc<GlobalCache>,
}

impl OptionService {
    /// Assemble a service with default caching.
    pub fn new(catalog: DefinitionCatalog) -> Self {
        Self::builder(catalog).build()
    }

    /// Create a builder for more control over cache behavior.
    pub fn builder(catalog: DefinitionCatalog) -> OptionServiceBuilder {
        OptionServiceBuilder::new(catalog)
    }

    /// The zero-argument handle for a key.
    ///
    /// An unknown key degrades to an inert empty handle with a logged
    /// warning, so template-level code needs no guards.
    pub fn get(&self, key: &str) -> OptionHandle {
        match self.handles.get(key) {
            Some(handle) => handle.clone(),
            None => {
                warn!("Unknown option key: {}", key);
                OptionHandle::inert(key, self.global.clone())
            }
        }
    }

    /// Whether a key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.handles.contains_key(key)
    }

    /// Iterate over registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.catalog.keys()
    }

    /// One-shot uncached resolution, bypassing the engine entirely.
    ///
    /// Always invokes the definition afresh; intended for call sites that
    /// want a plain list without handle behavior or caching.
    pub async fn fetch(&self, key: &str) -> Result<Vec<OptionItem>> {
        let definition = self
            .catalog
            .get(key)
            .ok_or_else(|| PicklistError::DefinitionNotFound { key: key.to_string() })?;
        match definition {
            Definition::Static(items) => Ok(items.to_vec()),
            Definition::Computed(resolve) => Ok(resolve(&[])),
            Definition::Remote(resolve) => resolve(Vec::new()).await,
            Definition::Reactive { source, .. } => Ok(source.borrow().clone()),
        }
    }

    /// Items for a key, only if its definition is a static list.
    ///
    /// Any other shape returns an empty list; use [`fetch`](Self::fetch) or
    /// a handle for those.
    pub fn get_sync(&self, key: &str) -> Vec<OptionItem> {
        match self.catalog.get(key) {
            Some(Definition::Static(items)) => items.to_vec(),
            _ => Vec::new(),
        }
    }

    /// The label for a value in a static list, or the value rendered as text.
    pub fn label_of(&self, key: &str, value: impl Into<OptionValue>) -> String {
        let value = value.into();
        self.get_sync(key)
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| value.to_string())
    }

    /// Diagnostics for a registered key.
    pub fn status(&self, key: &str) -> Option<LoaderStatus> {
        self.loaders.get(key).map(|loader| loader.status())
    }

    /// The global cache this service reads through, for sharing with another
    /// assembly.
    pub fn global_cache(&self) -> Arc<GlobalCache> {
        self.global.clone()
    }
}

/// Serializes as a map of key → current items. Triggers resolution for every
/// key, like serializing each handle individually.
impl Serialize for OptionService {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.handles.iter().map(|(k, h)| (k.as_str(), h)))
    }
}

/// Builder for [`OptionService`].
pub struct OptionServiceBuilder {
    catalog: DefinitionCatalog,
    global_ttl: Option<Duration>,
    global_cache: Option<Arc<GlobalCache>>,
}

impl OptionServiceBuilder {
    /// Start from a catalog.
    pub fn new(catalog: DefinitionCatalog) -> Self {
        Self {
            catalog,
            global_ttl: None,
            global_cache: None,
        }
    }

    /// Override the global cache TTL.
    pub fn global_ttl(mut self, ttl: Duration) -> Self {
        self.global_ttl = Some(ttl);
        self
    }

    /// Share an existing global cache instead of creating one, so a second
    /// assembly can seed zero-argument resolutions from it.
    pub fn shared_global_cache(mut self, cache: Arc<GlobalCache>) -> Self {
        self.global_cache = Some(cache);
        self
    }

    /// Assemble the service: exactly one engine and one zero-argument handle
    /// per registered key.
    pub fn build(self) -> OptionService {
        let global = self.global_cache.unwrap_or_else(|| {
            Arc::new(match self.global_ttl {
                Some(ttl) => GlobalCache::with_ttl(ttl),
                None => GlobalCache::new(),
            })
        });

        let mut loaders = HashMap::with_capacity(self.catalog.len());
        let mut handles = HashMap::with_capacity(self.catalog.len());
        for (key, definition) in self.catalog.iter() {
            let loader = OptionLoader::new(key, definition.clone(), global.clone());
            handles.insert(key.to_string(), OptionHandle::new(loader.clone(), Vec::new()));
            loaders.insert(key.to_string(), loader);
        }

        info!("Assembled option service with {} definition(s)", loaders.len());

        OptionService {
            catalog: self.catalog,
            loaders,
            handles,
            global,
        }
    }
}
