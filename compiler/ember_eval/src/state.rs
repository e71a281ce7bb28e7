//! The ambient state slot threaded through every call.
//!
//! A `StateCell` is allocated once per dynamic extent (a top-level run, or a
//! nested evaluation requested with fresh state) and then shared by every
//! call made within that extent. `set-state` writes through the shared
//! handle, so a caller observes writes made by its callees.
//!
//! The cell is single-threaded (`Rc<RefCell<_>>`); two threads never share
//! ambient state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Shared, mutable ambient state.
///
/// Cloning a `StateCell` clones the handle, not the value: both handles
/// observe the same slot.
#[derive(Clone)]
#[repr(transparent)]
pub struct StateCell(Rc<RefCell<Value>>);

impl StateCell {
    /// Allocate an empty cell holding `Unit`.
    pub fn new() -> Self {
        Self::with_value(Value::Unit)
    }

    pub fn with_value(value: Value) -> Self {
        StateCell(Rc::new(RefCell::new(value)))
    }

    /// The current state value.
    pub fn get(&self) -> Value {
        self.0.borrow().clone()
    }

    /// Replace the state value in place. The cell keeps its identity.
    pub fn set(&self, value: Value) {
        *self.0.borrow_mut() = value;
    }

    /// Whether two handles refer to the same cell.
    pub fn ptr_eq(a: &StateCell, b: &StateCell) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateCell({:?})", &*self.0.borrow())
    }
}
