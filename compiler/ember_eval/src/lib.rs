#![deny(clippy::arithmetic_side_effects)]
//! Ember Eval - execution core of the Ember interpreter.
//!
//! Runs compiled call graphs produced by the front-end.
//!
//! # Architecture
//!
//! - `Engine`: host entry point; one ambient state cell per run
//! - `Trampoline`: runs a non-tail call and every tail call it leads to
//! - `CallDispatcher`: per-site dispatch with a two-slot inline cache
//! - `Match`: ordered case dispatch over the runtime shape of a value
//! - `CallContext`: capability object carrying the `StateCell`
//! - `exec`: tree-walking evaluation of `Expr` bodies
//!
//! Tail calls and selected match branches are plain return values
//! (`Step`, and an internal branch signal), not errors or panics.

mod builtins;
mod case;
mod context;
mod dispatch;
mod engine;
pub mod errors;
mod exec;
mod expr;
mod function;
mod span;
mod stack;
mod state;
mod step;
#[cfg(test)]
mod test_helpers;
mod trampoline;
mod value;

use std::sync::Once;

pub use builtins::{get_state, set_state, Builtin};
pub use case::{Case, CasePattern, Fallback, Match};
pub use context::CallContext;
pub use dispatch::{CallDispatcher, DispatchPath, DispatchStats, DEFAULT_CACHE_SLOTS};
pub use engine::{Engine, EngineBuilder, EngineConfig};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use expr::{CallSite, Expr, ForceSite, PrimOp};
pub use function::{BodyKind, CompiledBody, Definition, Function};
pub use span::{MatchSite, Span};
pub use state::StateCell;
pub use step::{Arguments, Step, TailCall};
pub use trampoline::Trampoline;
pub use value::{Atom, Constructor, Value};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
///
/// ```text
/// RUST_LOG=ember_eval=debug        # host entry points
/// RUST_LOG=ember_eval=trace        # cache promotion, case selection
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
