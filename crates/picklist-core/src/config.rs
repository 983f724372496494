//! Centralized configuration constants for the option system.

use std::time::Duration;

/// Library-wide defaults.
pub struct OptionsConfig;

impl OptionsConfig {
    /// Time-to-live for zero-argument entries in the global cache.
    pub const GLOBAL_CACHE_TTL: Duration = Duration::from_secs(300);
    /// Maximum number of keys the global cache retains.
    pub const GLOBAL_CACHE_CAPACITY: u64 = 256;

    /// Label of the synthetic "all" item prepended by `with_all`.
    pub const ALL_LABEL: &'static str = "全部";
    /// Value of the synthetic "all" item.
    pub const ALL_VALUE: &'static str = "";
    /// Label of the synthetic "other" item appended by `with_other`.
    pub const OTHER_LABEL: &'static str = "其他";
    /// Value of the synthetic "other" item.
    pub const OTHER_VALUE: &'static str = "other";

    /// Signature under which an empty argument tuple is memoized.
    pub const DEFAULT_SIGNATURE: &'static str = "default";
}
