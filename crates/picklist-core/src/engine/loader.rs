//! Per-key resolution engine.
//!
//! One loader exists per registered key; every handle bound to that key,
//! whatever its arguments, shares it. Resolution order on a read:
//! memoized snapshot → global cache (zero-argument only) → dispatch by
//! definition shape. Remote loads are single-flighted per signature.

use crate::config::OptionsConfig;
use crate::engine::global_cache::GlobalCache;
use crate::engine::state::{lock_state, signature_of, LoadFuture, ResolutionState};
use crate::error::{PicklistError, Result};
use crate::models::{LoaderStatus, OptionList};
use crate::registry::{AsyncResolver, Definition, ReactiveMode};
use chrono::Utc;
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Resolves and memoizes option lists for one registered key.
pub(crate) struct OptionLoader {
    key: String,
    definition: Definition,
    /// Signature → state cell. Cells live for the process lifetime.
    states: Mutex<HashMap<String, Arc<Mutex<ResolutionState>>>>,
    global: Arc<GlobalCache>,
}

/// What a read found: a settled snapshot, or an in-flight attempt plus the
/// snapshot as it currently stands.
enum LoadPlan {
    Ready(OptionList),
    Pending {
        current: OptionList,
        attempt: LoadFuture,
        /// Whether this call created the attempt (and should drive it).
        started: bool,
    },
}

impl OptionLoader {
    pub fn new(key: impl Into<String>, definition: Definition, global: Arc<GlobalCache>) -> Arc<Self> {
        Arc::new(Self {
            key: key.into(),
            definition,
            states: Mutex::new(HashMap::new()),
            global,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Passive read path. Never blocks and never fails: a remote resolution
    /// that has not settled yet yields the current (possibly empty) snapshot,
    /// and the attempt is driven in the background when a runtime is present.
    pub fn load(&self, args: &[Value]) -> OptionList {
        match self.plan(args) {
            LoadPlan::Ready(items) => items,
            LoadPlan::Pending {
                current,
                attempt,
                started,
            } => {
                if started {
                    if let Ok(rt) = tokio::runtime::Handle::try_current() {
                        rt.spawn(attempt.map(|_| ()));
                    } else {
                        debug!(
                            "No runtime to drive load for {}; attempt runs on first await",
                            self.key
                        );
                    }
                }
                current
            }
        }
    }

    /// Read path for callers that need a settled value: awaits the in-flight
    /// attempt instead of returning the interim snapshot.
    pub async fn ensure_loaded(&self, args: &[Value]) -> Result<OptionList> {
        match self.plan(args) {
            LoadPlan::Ready(items) => Ok(items),
            LoadPlan::Pending { attempt, .. } => attempt.await.map_err(|e| self.surface(&e)),
        }
    }

    /// Force path: re-resolves the signature and awaits completion.
    ///
    /// A refresh that arrives while an attempt is already in flight joins
    /// that attempt; two overlapping invocations of the definition for one
    /// signature never happen. Static and reactive definitions re-sync their
    /// snapshot; computed and remote definitions re-invoke.
    pub async fn refresh(&self, args: &[Value]) -> Result<OptionList> {
        let signature = signature_of(args);
        let cell = self.state_cell(&signature);

        let attempt: LoadFuture = {
            let mut state = lock_state(&cell);
            if let Some(attempt) = &state.in_flight {
                attempt.clone()
            } else {
                match &self.definition {
                    Definition::Static(items) => {
                        state.items = items.clone();
                        state.is_loaded = true;
                        state.last_resolved = Some(Utc::now());
                        return Ok(state.items.clone());
                    }
                    Definition::Reactive { source, .. } => {
                        state.items = source.borrow().clone().into();
                        state.is_loaded = true;
                        state.last_resolved = Some(Utc::now());
                        return Ok(state.items.clone());
                    }
                    Definition::Computed(resolve) => {
                        state.items = resolve(args).into();
                        state.is_loaded = true;
                        state.last_resolved = Some(Utc::now());
                        return Ok(state.items.clone());
                    }
                    Definition::Remote(resolver) => {
                        state.is_loaded = false;
                        self.begin_attempt(resolver, args.to_vec(), signature.clone(), &cell, &mut state)
                    }
                }
            }
        };

        attempt.await.map_err(|e| self.surface(&e))
    }

    /// Loading flags for a signature, without consulting the definition.
    pub fn flags(&self, args: &[Value]) -> (bool, bool) {
        let cell = self.state_cell(&signature_of(args));
        let state = lock_state(&cell);
        (state.is_loading, state.is_loaded)
    }

    /// Diagnostics snapshot for the zero-argument resolution.
    pub fn status(&self) -> LoaderStatus {
        let cell = self.state_cell(OptionsConfig::DEFAULT_SIGNATURE);
        let signature_count = self
            .states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        let state = lock_state(&cell);
        LoaderStatus {
            key: self.key.clone(),
            is_loading: state.is_loading,
            is_loaded: state.is_loaded,
            item_count: state.items.len(),
            signature_count,
            last_resolved: state.last_resolved,
        }
    }

    fn state_cell(&self, signature: &str) -> Arc<Mutex<ResolutionState>> {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states
            .entry(signature.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ResolutionState::new())))
            .clone()
    }

    fn plan(&self, args: &[Value]) -> LoadPlan {
        let signature = signature_of(args);
        let cell = self.state_cell(&signature);
        let mut state = lock_state(&cell);

        // Live sources re-sync on every read; the snapshot is only replaced
        // when the source has actually published something different, so
        // repeated reads keep returning the same instance.
        if let Definition::Reactive {
            source,
            mode: ReactiveMode::Live,
        } = &self.definition
        {
            let snapshot = source.borrow().clone();
            if !state.is_loaded || state.items[..] != snapshot[..] {
                state.items = snapshot.into();
                state.is_loaded = true;
                state.last_resolved = Some(Utc::now());
            }
            return LoadPlan::Ready(state.items.clone());
        }

        // Memoized fast path.
        if !state.items.is_empty() {
            return LoadPlan::Ready(state.items.clone());
        }

        // Global cache, zero-argument signature only: lets a state rebuilt
        // after the first resolution reuse it instead of refetching.
        if signature == OptionsConfig::DEFAULT_SIGNATURE && !state.is_loaded {
            if let Some(cached) = self.global.get(&self.key) {
                debug!("Global cache hit for {}", self.key);
                state.items = cached;
                state.is_loaded = true;
                return LoadPlan::Ready(state.items.clone());
            }
        }

        match &self.definition {
            Definition::Static(items) => {
                if !state.is_loaded {
                    state.items = items.clone();
                    state.is_loaded = true;
                    state.last_resolved = Some(Utc::now());
                }
                LoadPlan::Ready(state.items.clone())
            }
            Definition::Reactive { source, .. } => {
                if !state.is_loaded {
                    state.items = source.borrow().clone().into();
                    state.is_loaded = true;
                    state.last_resolved = Some(Utc::now());
                }
                LoadPlan::Ready(state.items.clone())
            }
            Definition::Computed(resolve) => {
                if !state.is_loaded {
                    state.items = resolve(args).into();
                    state.is_loaded = true;
                    state.last_resolved = Some(Utc::now());
                }
                LoadPlan::Ready(state.items.clone())
            }
            Definition::Remote(resolver) => {
                if let Some(attempt) = &state.in_flight {
                    LoadPlan::Pending {
                        current: state.items.clone(),
                        attempt: attempt.clone(),
                        started: false,
                    }
                } else if state.is_loaded {
                    // Resolved to an empty list; memoized like any other result.
                    LoadPlan::Ready(state.items.clone())
                } else {
                    let attempt =
                        self.begin_attempt(resolver, args.to_vec(), signature.clone(), &cell, &mut state);
                    LoadPlan::Pending {
                        current: state.items.clone(),
                        attempt,
                        started: true,
                    }
                }
            }
        }
    }

    /// Invoke the remote resolver and register the attempt as in flight.
    /// Caller holds the state lock, so check-then-set of `is_loading` is
    /// atomic.
    fn begin_attempt(
        &self,
        resolver: &AsyncResolver,
        args: Vec<Value>,
        signature: String,
        cell: &Arc<Mutex<ResolutionState>>,
        state: &mut ResolutionState,
    ) -> LoadFuture {
        let fut = resolver(args);
        let key = self.key.clone();
        let global = self.global.clone();
        let cell = cell.clone();

        let attempt: LoadFuture = async move {
            match fut.await {
                Ok(items) => {
                    let list: OptionList = items.into();
                    {
                        let mut state = lock_state(&cell);
                        state.items = list.clone();
                        state.is_loading = false;
                        state.is_loaded = true;
                        state.last_resolved = Some(Utc::now());
                        state.in_flight = None;
                    }
                    if signature == OptionsConfig::DEFAULT_SIGNATURE {
                        global.insert(&key, list.clone());
                    }
                    debug!("Resolved {} option(s) for {}", list.len(), key);
                    Ok(list)
                }
                Err(e) => {
                    // Failures are not cached: flags reset so a later read
                    // retries, and only explicit awaiters see the error.
                    warn!("Option load failed for {}: {}", key, e);
                    let mut state = lock_state(&cell);
                    state.is_loading = false;
                    state.in_flight = None;
                    Err(Arc::new(e))
                }
            }
        }
        .boxed()
        .shared();

        state.is_loading = true;
        state.in_flight = Some(attempt.clone());
        attempt
    }

    fn surface(&self, err: &Arc<PicklistError>) -> PicklistError {
        match &**err {
            PicklistError::Resolution { key, message } => PicklistError::Resolution {
                key: key.clone(),
                message: message.clone(),
            },
            other => PicklistError::Resolution {
                key: self.key.clone(),
                message: other.to_string(),
            },
        }
    }
}
