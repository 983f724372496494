//! The option handle: one resolution presented as an ordered sequence, a
//! re-bindable callable, and a set of named derived views.
//!
//! A handle is cheap to create and clone; no resolution happens until a read.
//! Every accessor performs a fresh read, so an async resolution that settled
//! between two accesses is visible at the second one.

use crate::config::OptionsConfig;
use crate::engine::{GlobalCache, OptionLoader};
use crate::error::Result;
use crate::models::{OptionItem, OptionList, OptionValue};
use crate::registry::Definition;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A named option list bound to one argument tuple.
///
/// Obtained from [`OptionService::get`](crate::OptionService::get) (the
/// zero-argument form) or [`bind`](OptionHandle::bind) (parameterized).
/// Handles for the same key share one resolution engine, so two handles with
/// equal arguments observe the same memoized snapshot.
#[derive(Clone)]
pub struct OptionHandle {
    loader: Arc<OptionLoader>,
    args: Vec<Value>,
}

impl OptionHandle {
    pub(crate) fn new(loader: Arc<OptionLoader>, args: Vec<Value>) -> Self {
        Self { loader, args }
    }

    /// An inert handle for an unknown key: always empty, never fails.
    pub(crate) fn inert(key: &str, global: Arc<GlobalCache>) -> Self {
        Self::new(OptionLoader::new(key, Definition::from_static([]), global), Vec::new())
    }

    /// The registry key this handle resolves.
    pub fn key(&self) -> &str {
        self.loader.key()
    }

    /// The bound argument tuple.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Re-bind to a new argument tuple.
    ///
    /// Returns a new handle with its own independent resolution state; the
    /// current handle is untouched.
    pub fn bind<V>(&self, args: impl IntoIterator<Item = V>) -> OptionHandle
    where
        V: Into<Value>,
    {
        Self::new(self.loader.clone(), args.into_iter().map(Into::into).collect())
    }

    /// The current snapshot, triggering resolution if needed.
    pub fn items(&self) -> OptionList {
        self.loader.load(&self.args)
    }

    /// Number of items in the current snapshot.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Whether the current snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// The item at `index`, if present.
    pub fn get(&self, index: usize) -> Option<OptionItem> {
        self.items().get(index).cloned()
    }

    /// A fresh iterator over the current snapshot.
    pub fn iter(&self) -> OptionIter {
        OptionIter {
            items: self.items(),
            index: 0,
        }
    }

    /// Whether a remote resolution is in flight.
    pub fn is_loading(&self) -> bool {
        let _ = self.items();
        self.loader.flags(&self.args).0
    }

    /// Whether resolution has completed.
    pub fn is_loaded(&self) -> bool {
        let _ = self.items();
        self.loader.flags(&self.args).1
    }

    /// Items prefixed with the synthetic "all" entry.
    pub fn with_all(&self) -> Vec<OptionItem> {
        let items = self.items();
        let mut out = Vec::with_capacity(items.len() + 1);
        out.push(OptionItem::new(OptionsConfig::ALL_LABEL, OptionsConfig::ALL_VALUE));
        out.extend(items.iter().cloned());
        out
    }

    /// Items suffixed with the synthetic "other" entry.
    pub fn with_other(&self) -> Vec<OptionItem> {
        let items = self.items();
        let mut out = Vec::with_capacity(items.len() + 1);
        out.extend(items.iter().cloned());
        out.push(OptionItem::new(OptionsConfig::OTHER_LABEL, OptionsConfig::OTHER_VALUE));
        out
    }

    /// The label for a value, or the value rendered as text when absent.
    pub fn label(&self, value: impl Into<OptionValue>) -> String {
        let value = value.into();
        self.items()
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| value.to_string())
    }

    /// The full item for a value.
    pub fn find_by_value(&self, value: impl Into<OptionValue>) -> Option<OptionItem> {
        let value = value.into();
        self.items().iter().find(|o| o.value == value).cloned()
    }

    /// A filtered copy without the given values. The backing snapshot is
    /// untouched.
    pub fn exclude<V>(&self, values: impl IntoIterator<Item = V>) -> Vec<OptionItem>
    where
        V: Into<OptionValue>,
    {
        let values: Vec<OptionValue> = values.into_iter().map(Into::into).collect();
        self.items()
            .iter()
            .filter(|o| !values.contains(&o.value))
            .cloned()
            .collect()
    }

    /// A filtered copy keeping only the given values.
    pub fn only<V>(&self, values: impl IntoIterator<Item = V>) -> Vec<OptionItem>
    where
        V: Into<OptionValue>,
    {
        let values: Vec<OptionValue> = values.into_iter().map(Into::into).collect();
        self.items()
            .iter()
            .filter(|o| values.contains(&o.value))
            .cloned()
            .collect()
    }

    /// Force re-resolution and await the fresh snapshot.
    ///
    /// This is the only read that surfaces a resolution failure; passive
    /// reads degrade to an empty snapshot instead.
    pub async fn reload(&self) -> Result<OptionList> {
        self.loader.refresh(&self.args).await
    }

    /// Await a settled snapshot, triggering resolution if needed.
    pub async fn ensure_loaded(&self) -> Result<OptionList> {
        self.loader.ensure_loaded(&self.args).await
    }
}

/// Owning iterator over a snapshot taken when the iterator was created.
pub struct OptionIter {
    items: OptionList,
    index: usize,
}

impl Iterator for OptionIter {
    type Item = OptionItem;

    fn next(&mut self) -> Option<OptionItem> {
        let item = self.items.get(self.index)?.clone();
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl IntoIterator for &OptionHandle {
    type Item = OptionItem;
    type IntoIter = OptionIter;

    fn into_iter(self) -> OptionIter {
        self.iter()
    }
}

/// Serializes as the backing item list, so whole-registry serialization
/// needs no special cases.
impl Serialize for OptionHandle {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let items = self.items();
        serializer.collect_seq(items.iter())
    }
}

impl fmt::Debug for OptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.items();
        match serde_json::to_string_pretty(&items[..]) {
            Ok(json) => f.write_str(&json),
            Err(_) => f
                .debug_struct("OptionHandle")
                .field("key", &self.key())
                .field("len", &items.len())
                .finish(),
        }
    }
}
