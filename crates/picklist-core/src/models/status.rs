//! Per-key diagnostics snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Resolution status for one registered key, as reported by
/// [`OptionService::status`](crate::OptionService::status).
///
/// Reflects the zero-argument resolution plus the number of argument
/// signatures that have been touched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderStatus {
    /// The registered key.
    pub key: String,
    /// Whether a remote resolution is currently in flight.
    pub is_loading: bool,
    /// Whether the zero-argument resolution has completed.
    pub is_loaded: bool,
    /// Number of items in the zero-argument snapshot.
    pub item_count: usize,
    /// Number of distinct argument signatures resolved so far.
    pub signature_count: usize,
    /// When the zero-argument resolution last completed.
    pub last_resolved: Option<DateTime<Utc>>,
}
