//! Per-call-site dispatch with a small inline cache.
//!
//! A `CallDispatcher` remembers the first bodies it sees, up to its slot
//! capacity (two by default). Later calls to one of those bodies take the
//! cached path; calls to anything else take the megamorphic path. The path
//! never changes what a call computes, only how it is recorded.
//!
//! # Concurrency
//!
//! A compiled graph may be shared between threads, so a dispatcher may be
//! hit concurrently. Each slot is a `OnceLock`: populating it is a benign
//! race in which one thread wins and the others rescan. Counters are relaxed
//! atomics.
//!
//! Slots hold `Weak` references. A recursive body owns the dispatchers of
//! its own call sites, so a strong reference would keep the body alive
//! forever.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use crate::context::CallContext;
use crate::errors::{arity_mismatch, call_site_arity_mismatch, EvalError};
use crate::function::{CompiledBody, Function};
use crate::step::{Arguments, Step};
use crate::value::Value;

/// Cache slots per call site unless configured otherwise.
pub const DEFAULT_CACHE_SLOTS: usize = 2;

/// Which path a call took through the dispatcher.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchPath {
    /// The callee's body occupies this cache slot.
    Cached(usize),
    /// Every slot holds some other body.
    Megamorphic,
}

/// Snapshot of a dispatcher's counters.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DispatchStats {
    /// Calls per cache slot, in slot order.
    pub slot_hits: Vec<u64>,
    pub megamorphic: u64,
}

impl DispatchStats {
    pub fn total(&self) -> u64 {
        self.slot_hits
            .iter()
            .fold(self.megamorphic, |acc, hits| acc.saturating_add(*hits))
    }
}

/// Invokes functions on behalf of one call site.
pub struct CallDispatcher {
    arity: OnceLock<usize>,
    slots: Box<[OnceLock<Weak<CompiledBody>>]>,
    slot_hits: Box<[AtomicU64]>,
    megamorphic: AtomicU64,
}

impl CallDispatcher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_SLOTS)
    }

    /// A dispatcher caching up to `slots` bodies. A capacity of zero is
    /// raised to one.
    pub fn with_capacity(slots: usize) -> Self {
        let slots = slots.max(1);
        CallDispatcher {
            arity: OnceLock::new(),
            slots: (0..slots).map(|_| OnceLock::new()).collect(),
            slot_hits: (0..slots).map(|_| AtomicU64::new(0)).collect(),
            megamorphic: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The argument count fixed by the first call, if any call was made.
    pub fn arity(&self) -> Option<usize> {
        self.arity.get().copied()
    }

    /// Number of occupied cache slots.
    pub fn cached_bodies(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            slot_hits: self
                .slot_hits
                .iter()
                .map(|hits| hits.load(Ordering::Relaxed))
                .collect(),
            megamorphic: self.megamorphic.load(Ordering::Relaxed),
        }
    }

    /// Run `function` once with `arguments`.
    ///
    /// Fails with an arity mismatch, before the body runs, when the argument
    /// count differs from the count this site was first called with or
    /// from the callee's declared arity. A tail call requested by the body
    /// is returned to the caller unexecuted.
    #[inline]
    pub fn execute_call(
        &self,
        ctx: &CallContext,
        function: &Function,
        arguments: &[Value],
    ) -> Result<Step, EvalError> {
        let arity = *self.arity.get_or_init(|| arguments.len());
        if arguments.len() != arity {
            return Err(call_site_arity_mismatch(arity, arguments.len()));
        }
        self.execute_tail(ctx, function, arguments)
    }

    /// Run a tail call that continues a call made through this site.
    ///
    /// The site arity belongs to the call that entered the site, so only
    /// the callee's declared arity is checked.
    #[inline]
    pub fn execute_tail(
        &self,
        ctx: &CallContext,
        function: &Function,
        arguments: &[Value],
    ) -> Result<Step, EvalError> {
        if function.arity() != arguments.len() {
            return Err(arity_mismatch(
                function.name(),
                function.arity(),
                arguments.len(),
            ));
        }
        let arguments: Arguments = arguments.iter().cloned().collect();

        let path = self.resolve(function.body());
        self.record(path);
        function.body().execute(ctx, function, &arguments)
    }

    /// Select the path for a call to `body`, populating a free slot if
    /// there is one.
    pub fn resolve(&self, body: &Arc<CompiledBody>) -> DispatchPath {
        let target = Arc::as_ptr(body);
        for (index, slot) in self.slots.iter().enumerate() {
            let cached = match slot.get() {
                Some(cached) => cached,
                None => {
                    if slot.set(Arc::downgrade(body)).is_ok() {
                        tracing::trace!(slot = index, callee = body.name(), "cache slot populated");
                        return DispatchPath::Cached(index);
                    }
                    // Lost the race; look at what the winner stored.
                    match slot.get() {
                        Some(cached) => cached,
                        None => continue,
                    }
                }
            };
            if std::ptr::eq(cached.as_ptr(), target) {
                return DispatchPath::Cached(index);
            }
        }
        DispatchPath::Megamorphic
    }

    fn record(&self, path: DispatchPath) {
        match path {
            DispatchPath::Cached(slot) => {
                if let Some(hits) = self.slot_hits.get(slot) {
                    hits.fetch_add(1, Ordering::Relaxed);
                }
            }
            DispatchPath::Megamorphic => {
                if self.megamorphic.fetch_add(1, Ordering::Relaxed) == 0 {
                    tracing::trace!(slots = self.capacity(), "call site went megamorphic");
                }
            }
        }
    }
}

impl Default for CallDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallDispatcher")
            .field("arity", &self.arity())
            .field("capacity", &self.capacity())
            .field("cached", &self.cached_bodies())
            .finish()
    }
}
