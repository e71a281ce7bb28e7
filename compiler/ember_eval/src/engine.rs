//! Host entry point.
//!
//! # Usage
//!
//! ```text
//! let engine = Engine::builder().max_depth(Some(10_000)).build();
//! let value = engine.run(&main, &[Value::Number(5)])?;
//! ```
//!
//! Each [`Engine::run`] is one dynamic extent: it allocates one
//! [`StateCell`](crate::StateCell) that every call in the run shares. Hosts
//! that want to inspect or seed the state use [`Engine::context`] and
//! [`Engine::run_in`] instead.

use crate::context::CallContext;
use crate::dispatch::DEFAULT_CACHE_SLOTS;
use crate::errors::EvalResult;
use crate::function::Function;
use crate::state::StateCell;
use crate::trampoline::Trampoline;
use crate::value::Value;

/// Resolved engine settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cache slots of the dispatcher driving each top-level run.
    pub cache_capacity: usize,
    /// Limit on non-tail call nesting. `None` lets the native stack grow on
    /// demand.
    pub max_depth: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_capacity: DEFAULT_CACHE_SLOTS,
            max_depth: None,
        }
    }
}

/// Runs compiled functions on behalf of a host.
///
/// An engine holds no per-run state and may be shared between threads.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// A context with a fresh, empty state cell.
    pub fn context(&self) -> CallContext {
        CallContext::new(self.config.max_depth)
    }

    /// A context over a host-supplied state cell.
    pub fn context_with_state(&self, state: StateCell) -> CallContext {
        CallContext::with_state(state, self.config.max_depth)
    }

    /// Call `function` under fresh ambient state.
    pub fn run(&self, function: &Function, arguments: &[Value]) -> EvalResult {
        let ctx = self.context();
        self.run_in(&ctx, function, arguments)
    }

    /// Call `function` within the extent described by `ctx`.
    #[tracing::instrument(level = "debug", skip_all, fields(function = function.name()))]
    pub fn run_in(&self, ctx: &CallContext, function: &Function, arguments: &[Value]) -> EvalResult {
        Trampoline::with_capacity(self.config.cache_capacity).run(ctx, function, arguments)
    }
}

/// Builder for [`Engine`].
#[derive(Clone, Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache slots for top-level dispatch. Zero is treated as one.
    #[must_use]
    pub fn cache_capacity(mut self, slots: usize) -> Self {
        self.config.cache_capacity = slots;
        self
    }

    /// Limit non-tail call nesting.
    #[must_use]
    pub fn max_depth(mut self, limit: Option<usize>) -> Self {
        self.config.max_depth = limit;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            config: self.config,
        }
    }
}
