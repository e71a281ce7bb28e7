//! Runtime-supplied functions.
//!
//! `get-state` and `set-state` are ordinary functions as far as call sites
//! are concerned: they are dispatched, cached and arity-checked like any
//! user function, and only differ in how their body executes.

use std::sync::LazyLock;

use crate::context::CallContext;
use crate::errors::{arity_mismatch, EvalResult};
use crate::function::{CompiledBody, Function};
use crate::value::Value;

/// A primitive body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
    /// `get-state()`: read the ambient state.
    GetState,
    /// `set-state(v)`: overwrite the ambient state, returning unit.
    SetState,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::GetState => "get-state",
            Builtin::SetState => "set-state",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::GetState => 0,
            Builtin::SetState => 1,
        }
    }

    pub(crate) fn call(self, ctx: &CallContext, arguments: &[Value]) -> EvalResult {
        match (self, arguments) {
            (Builtin::SetState, [value]) => {
                ctx.state().set(value.clone());
                Ok(Value::Unit)
            }
            (Builtin::GetState, []) => Ok(ctx.state().get()),
            (builtin, _) => Err(arity_mismatch(
                builtin.name(),
                builtin.arity(),
                arguments.len(),
            )),
        }
    }
}

static GET_STATE: LazyLock<Function> =
    LazyLock::new(|| Function::new(CompiledBody::builtin(Builtin::GetState)));

static SET_STATE: LazyLock<Function> =
    LazyLock::new(|| Function::new(CompiledBody::builtin(Builtin::SetState)));

/// The `get-state` function.
pub fn get_state() -> Function {
    GET_STATE.clone()
}

/// The `set-state` function.
pub fn set_state() -> Function {
    SET_STATE.clone()
}
