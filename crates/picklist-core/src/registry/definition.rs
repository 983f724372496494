//! Option definitions: how a key's items are sourced.

use crate::error::{PicklistError, Result};
use crate::models::{OptionItem, OptionList};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// A synchronous, deterministic resolver. No I/O.
pub type SyncResolver = Arc<dyn Fn(&[Value]) -> Vec<OptionItem> + Send + Sync>;

/// An asynchronous resolver, typically backed by a remote call supplied by
/// the caller. The engine caches its result once resolved.
pub type AsyncResolver =
    Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Vec<OptionItem>>> + Send + Sync>;

/// Snapshot policy for a reactive source.
///
/// The registry states explicitly, per key, whether re-snapshotting on every
/// access is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactiveMode {
    /// Sample the source once per argument signature, like a static list.
    SampledOnce,
    /// Re-read the source whenever it has published a new value.
    Live,
}

/// How one registered key sources its items.
#[derive(Clone)]
pub enum Definition {
    /// A fixed ordered list, never changes.
    Static(OptionList),
    /// A pure function of the argument tuple.
    Computed(SyncResolver),
    /// An async function of the argument tuple; result is cached once resolved.
    Remote(AsyncResolver),
    /// An external mutable reference, observed through a watch channel.
    Reactive {
        source: watch::Receiver<Vec<OptionItem>>,
        mode: ReactiveMode,
    },
}

impl Definition {
    /// A static list from any item sequence.
    pub fn from_static(items: impl IntoIterator<Item = OptionItem>) -> Self {
        Definition::Static(items.into_iter().collect::<Vec<_>>().into())
    }

    /// A synchronous computed definition.
    pub fn computed<F>(resolve: F) -> Self
    where
        F: Fn(&[Value]) -> Vec<OptionItem> + Send + Sync + 'static,
    {
        Definition::Computed(Arc::new(resolve))
    }

    /// An asynchronous remote definition.
    pub fn remote<F, Fut>(resolve: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<OptionItem>>> + Send + 'static,
    {
        Definition::Remote(Arc::new(move |args| resolve(args).boxed()))
    }

    /// A reactive source that is re-read whenever it changes.
    pub fn live(source: watch::Receiver<Vec<OptionItem>>) -> Self {
        Definition::Reactive {
            source,
            mode: ReactiveMode::Live,
        }
    }

    /// A reactive source sampled once per argument signature.
    pub fn sampled_once(source: watch::Receiver<Vec<OptionItem>>) -> Self {
        Definition::Reactive {
            source,
            mode: ReactiveMode::SampledOnce,
        }
    }

    /// Build a static definition from a JSON value.
    ///
    /// The value must be an array of `{label, value, ...}` objects; anything
    /// else is a [`PicklistError::MalformedDefinition`].
    pub fn from_json(key: &str, value: Value) -> Result<Self> {
        let items: Vec<OptionItem> =
            serde_json::from_value(value).map_err(|e| PicklistError::MalformedDefinition {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(Definition::from_static(items))
    }

    /// The shape name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Static(_) => "static",
            Definition::Computed(_) => "computed",
            Definition::Remote(_) => "remote",
            Definition::Reactive { .. } => "reactive",
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Static(items) => f.debug_tuple("Static").field(&items.len()).finish(),
            Definition::Reactive { mode, .. } => f.debug_tuple("Reactive").field(mode).finish(),
            other => f.write_str(other.kind()),
        }
    }
}
