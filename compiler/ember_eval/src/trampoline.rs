//! The loop that turns tail calls into iteration.
//!
//! A non-tail call enters [`Trampoline::run`], which dispatches the target
//! and keeps dispatching whatever tail call the previous body asked for,
//! until a body returns a plain value. Native stack depth therefore grows
//! with non-tail nesting only, never with the number of tail calls made.

use crate::context::CallContext;
use crate::dispatch::{CallDispatcher, DispatchStats};
use crate::errors::EvalResult;
use crate::function::Function;
use crate::stack::ensure_sufficient_stack;
use crate::step::{Step, TailCall};
use crate::value::Value;

/// Runs a call, and every tail call it leads to, to completion.
#[derive(Debug, Default)]
pub struct Trampoline {
    dispatcher: CallDispatcher,
}

enum LoopState {
    Running(TailCall),
    Done(Value),
}

impl Trampoline {
    pub fn new() -> Self {
        Trampoline {
            dispatcher: CallDispatcher::new(),
        }
    }

    /// A trampoline whose dispatcher caches up to `slots` bodies.
    pub fn with_capacity(slots: usize) -> Self {
        Trampoline {
            dispatcher: CallDispatcher::with_capacity(slots),
        }
    }

    pub fn dispatcher(&self) -> &CallDispatcher {
        &self.dispatcher
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Call `function` with `arguments` and run until a value emerges.
    ///
    /// The entry call fixes the dispatcher's site arity. Tail calls that
    /// follow may target functions of any arity. Errors abort the loop at
    /// once; nothing is retried.
    #[tracing::instrument(level = "trace", skip_all, fields(function = function.name()))]
    pub fn run(&self, ctx: &CallContext, function: &Function, arguments: &[Value]) -> EvalResult {
        let _level = ctx.enter()?;
        ensure_sufficient_stack(|| self.drive(ctx, function, arguments))
    }

    fn drive(&self, ctx: &CallContext, function: &Function, arguments: &[Value]) -> EvalResult {
        let mut state = LoopState::from(self.dispatcher.execute_call(ctx, function, arguments)?);
        loop {
            state = match state {
                LoopState::Running(call) => LoopState::from(self.dispatcher.execute_tail(
                    ctx,
                    &call.function,
                    &call.arguments,
                )?),
                LoopState::Done(value) => return Ok(value),
            };
        }
    }
}

impl From<Step> for LoopState {
    fn from(step: Step) -> Self {
        match step {
            Step::Return(value) => LoopState::Done(value),
            Step::TailCall(next) => LoopState::Running(next),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, reason = "Tests use expect for brevity")]
mod tests;
