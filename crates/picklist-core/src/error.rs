//! Error types for the picklist library.

use thiserror::Error;

/// Main error type for option resolution and catalog assembly.
#[derive(Debug, Error)]
pub enum PicklistError {
    /// A strict lookup referenced a key the catalog does not contain.
    ///
    /// Handle lookups never produce this; an unknown key degrades to an
    /// inert empty handle so render paths need no guards.
    #[error("Option definition not found: {key}")]
    DefinitionNotFound { key: String },

    /// A remote definition failed to resolve.
    ///
    /// Surfaced only to explicit `reload()` / `ensure_loaded()` / `fetch()`
    /// callers; passive readers observe an empty snapshot instead.
    #[error("Option resolution failed for {key}: {message}")]
    Resolution { key: String, message: String },

    /// A JSON definition was not an array of `{label, value}` objects.
    #[error("Malformed option definition for {key}: {message}")]
    MalformedDefinition { key: String, message: String },

    /// Catalog assembly misuse, e.g. a duplicate key.
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for picklist operations.
pub type Result<T> = std::result::Result<T, PicklistError>;

impl PicklistError {
    /// Create a resolution error for the given key.
    pub fn resolution(key: impl Into<String>, message: impl Into<String>) -> Self {
        PicklistError::Resolution {
            key: key.into(),
            message: message.into(),
        }
    }
}
