//! The per-evaluation capability object handed to every dispatch.
//!
//! `CallContext` owns the current [`StateCell`] and tracks how deeply
//! non-tail calls are nested. Tail calls never deepen the nesting, so a
//! tail-recursive loop runs at a constant depth however many steps it takes.

use std::cell::Cell;
use std::rc::Rc;

use crate::errors::{recursion_limit_exceeded, EvalError};
use crate::state::StateCell;

/// Ambient capabilities for one dynamic extent of evaluation.
#[derive(Debug)]
pub struct CallContext {
    state: StateCell,
    gauge: Rc<DepthGauge>,
}

#[derive(Debug)]
struct DepthGauge {
    current: Cell<usize>,
    peak: Cell<usize>,
    limit: Option<usize>,
}

impl CallContext {
    /// A context with a fresh, empty state cell.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self::with_state(StateCell::new(), max_depth)
    }

    /// A context over a host-supplied state cell.
    pub fn with_state(state: StateCell, max_depth: Option<usize>) -> Self {
        CallContext {
            state,
            gauge: Rc::new(DepthGauge {
                current: Cell::new(0),
                peak: Cell::new(0),
                limit: max_depth,
            }),
        }
    }

    /// A child context with a new empty state cell.
    ///
    /// The child shares this context's depth accounting, so nesting through
    /// a fresh-state boundary still counts against the same limit.
    pub fn with_fresh_state(&self) -> CallContext {
        tracing::debug!(depth = self.depth(), "installing fresh state");
        CallContext {
            state: StateCell::new(),
            gauge: Rc::clone(&self.gauge),
        }
    }

    pub fn state(&self) -> &StateCell {
        &self.state
    }

    /// Current non-tail call nesting.
    pub fn depth(&self) -> usize {
        self.gauge.current.get()
    }

    /// Deepest non-tail call nesting reached so far.
    pub fn peak_depth(&self) -> usize {
        self.gauge.peak.get()
    }

    /// Enter one level of non-tail nesting.
    ///
    /// The returned guard leaves the level when dropped, on success and
    /// error paths alike.
    pub(crate) fn enter(&self) -> Result<DepthGuard<'_>, EvalError> {
        let gauge = &*self.gauge;
        let depth = gauge.current.get();
        if let Some(limit) = gauge.limit {
            if depth >= limit {
                return Err(recursion_limit_exceeded(limit));
            }
        }
        let depth = depth.saturating_add(1);
        gauge.current.set(depth);
        if depth > gauge.peak.get() {
            gauge.peak.set(depth);
        }
        Ok(DepthGuard { gauge })
    }
}

/// RAII guard for one level of non-tail nesting.
pub(crate) struct DepthGuard<'a> {
    gauge: &'a DepthGauge,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        let depth = self.gauge.current.get();
        self.gauge.current.set(depth.saturating_sub(1));
    }
}
