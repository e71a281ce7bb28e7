//! Runtime errors raised while executing compiled bodies.
//!
//! `EvalErrorKind` carries the structured category; `EvalError` pairs it with
//! an optional source span. Factory functions (e.g. `arity_mismatch()`) are
//! the construction API and are marked `#[cold]` so the dispatch hot path
//! stays compact.
//!
//! Tail calls and selected match branches are *not* errors. They travel as
//! ordinary return values (`Step`, `CaseOutcome`), so nothing in this module
//! is used for control flow.

use std::fmt;

use crate::span::{MatchSite, Span};
use crate::value::Value;

/// Result of evaluating an expression or running a call to completion.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalErrorKind {
    // Calls
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    NotCallable {
        type_name: &'static str,
    },
    UndefinedFunction {
        name: String,
    },
    StackOverflow {
        limit: usize,
    },
    /// A compiled body referred to an argument, capture or local it does
    /// not have.
    UnboundSlot {
        slot: &'static str,
        index: usize,
    },

    // Pattern matching
    InexhaustiveMatch {
        site: MatchSite,
    },

    // Primitives
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },
    IntegerOverflow {
        operation: &'static str,
    },
    DivisionByZero,

    /// Failure raised by user code. The payload is opaque to the core.
    UserPanic {
        payload: Value,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{name} expects {expected} {arg_word}, got {got}")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::UndefinedFunction { name } => write!(f, "undefined function: {name}"),
            Self::StackOverflow { limit } => {
                write!(f, "maximum call depth exceeded (limit: {limit})")
            }
            Self::UnboundSlot { slot, index } => write!(f, "unbound {slot} slot {index}"),
            Self::InexhaustiveMatch { site } => {
                write!(f, "inexhaustive pattern match in {site}")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::IntegerOverflow { operation } => write!(f, "integer overflow in {operation}"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::UserPanic { payload } => write!(f, "panic: {payload}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Source location where the error occurred, when known.
    pub span: Option<Span>,
}

impl EvalError {
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        EvalError { kind, span: None }
    }

    /// Attach a source span to this error.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn kind(&self) -> &EvalErrorKind {
        &self.kind
    }

    pub fn is_inexhaustive_match(&self) -> bool {
        matches!(self.kind, EvalErrorKind::InexhaustiveMatch { .. })
    }
}

// Call errors

/// A function was applied to the wrong number of arguments.
#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

/// A call site received a different argument count than on its first call.
#[cold]
pub fn call_site_arity_mismatch(expected: usize, got: usize) -> EvalError {
    arity_mismatch("call site", expected, got)
}

/// Attempted to call a value that is not a function.
#[cold]
pub fn not_callable(type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable { type_name })
}

/// A module definition was read before it was bound.
#[cold]
pub fn undefined_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    })
}

/// Non-tail call nesting exceeded the configured limit.
#[cold]
pub fn recursion_limit_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { limit })
}

/// A body read a frame slot that was never bound.
#[cold]
pub fn unbound_slot(slot: &'static str, index: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundSlot { slot, index })
}

// Pattern errors

/// No case of a match applied to the scrutinee.
#[cold]
pub fn inexhaustive_match(site: &MatchSite) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InexhaustiveMatch { site: site.clone() })
}

// Primitive errors

#[cold]
pub fn type_mismatch(expected: &'static str, got: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch { expected, got })
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow { operation })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

/// User code raised a failure carrying `payload`.
#[cold]
pub fn user_panic(payload: Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UserPanic { payload })
}
