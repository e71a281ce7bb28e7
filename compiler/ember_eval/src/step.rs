//! The result of running one function body.
//!
//! A body either finishes with a value or asks its caller's trampoline to
//! make the next call on its behalf. Requests for a tail call are ordinary
//! return values, so they cannot be intercepted by anything except the
//! trampoline loop that is driving the current call chain.

use smallvec::SmallVec;

use crate::function::Function;
use crate::value::Value;

/// Positional call arguments.
///
/// Most calls pass a handful of arguments; those stay inline.
pub type Arguments = SmallVec<[Value; 4]>;

/// What a function body produced.
#[derive(Debug)]
#[must_use]
pub enum Step {
    /// The body finished with a plain value.
    Return(Value),
    /// The body's last action is a call that should replace its frame.
    TailCall(TailCall),
}

impl Step {
    pub fn tail_call(function: Function, arguments: Arguments) -> Self {
        Step::TailCall(TailCall {
            function,
            arguments,
        })
    }
}

/// A pending call requested from tail position.
#[derive(Debug)]
pub struct TailCall {
    pub function: Function,
    pub arguments: Arguments,
}
