//! Native stack growth for non-tail call nesting.
//!
//! Every trampoline entry is one level of native recursion. Deep non-tail
//! recursion in user code would overflow the thread's stack, so each entry
//! goes through [`ensure_sufficient_stack`], which moves onto a freshly
//! allocated segment when the current one runs low. Tail calls never come
//! through here.

/// Grow the stack when less than this much remains.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each additional stack segment.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if it is close to exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; run `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
