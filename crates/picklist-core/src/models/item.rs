//! Option item and value types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A primitive option value.
///
/// Lookups (`label`, `find_by_value`, `exclude`, `only`) compare by value, so
/// equality is structural across the variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Str(s) => write!(f, "{}", s),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Float(n) => write!(f, "{}", n),
            OptionValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Int(n as i64)
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Float(n)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

/// One entry of an option list.
///
/// Immutable once produced. `extra` carries any additional fields a
/// definition supplies (icons, grouping hints, ...) through serialization
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub label: String,
    pub value: OptionValue,
    /// Optional color hint for chip-style rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Whether the item is selectable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OptionItem {
    /// Create an item from a label and value.
    pub fn new(label: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            color: None,
            disabled: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Attach a color hint.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Mark the item as not selectable.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// An immutable snapshot of a resolved option list.
///
/// The engine replaces snapshots wholesale; readers holding an older Arc keep
/// a consistent view.
pub type OptionList = Arc<[OptionItem]>;

/// The empty snapshot.
pub fn empty_list() -> OptionList {
    Arc::from(Vec::new())
}
