//! Per-signature resolution state.

use crate::config::OptionsConfig;
use crate::error::PicklistError;
use crate::models::{empty_list, OptionList};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Outcome of one resolution attempt, cloneable so any number of callers can
/// await the same attempt.
pub(crate) type LoadOutcome = std::result::Result<OptionList, Arc<PicklistError>>;

/// A tracked in-flight resolution attempt.
pub(crate) type LoadFuture = Shared<BoxFuture<'static, LoadOutcome>>;

/// Canonical signature for an argument tuple.
///
/// The empty tuple is distinguished as `"default"`; anything else serializes
/// to JSON, so equal argument lists share one state bucket.
pub(crate) fn signature_of(args: &[Value]) -> String {
    if args.is_empty() {
        OptionsConfig::DEFAULT_SIGNATURE.to_string()
    } else {
        serde_json::to_string(args).unwrap_or_else(|_| format!("{:?}", args))
    }
}

/// Mutable resolution state for one (key, signature) pair.
///
/// Exactly one instance exists per pair for the process lifetime. The cell is
/// locked for every flag transition so check-then-set of `is_loading` is
/// atomic under concurrent readers.
pub(crate) struct ResolutionState {
    /// Current snapshot; replaced wholesale on resolution.
    pub items: OptionList,
    pub is_loading: bool,
    pub is_loaded: bool,
    /// When the last successful resolution completed.
    pub last_resolved: Option<DateTime<Utc>>,
    /// The attempt concurrent callers join instead of racing.
    pub in_flight: Option<LoadFuture>,
}

impl ResolutionState {
    pub fn new() -> Self {
        Self {
            items: empty_list(),
            is_loading: false,
            is_loaded: false,
            last_resolved: None,
            in_flight: None,
        }
    }
}

/// Lock a state cell, recovering from a poisoned lock.
///
/// State transitions are plain field writes, so a panic mid-update cannot
/// leave the cell logically inconsistent.
pub(crate) fn lock_state(cell: &Mutex<ResolutionState>) -> MutexGuard<'_, ResolutionState> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}
