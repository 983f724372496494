//! Definition registry: the four option-sourcing shapes and the immutable
//! catalog that maps keys to them.

mod catalog;
mod definition;
pub mod seeds;

pub use catalog::{CatalogBuilder, DefinitionCatalog};
pub use definition::{AsyncResolver, Definition, ReactiveMode, SyncResolver};
