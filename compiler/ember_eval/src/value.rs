//! Runtime values.
//!
//! Every variant is cheap to clone (at most a reference-count increment) and
//! `Send + Sync`, so compiled graphs holding literal values can be shared
//! between threads.

use std::fmt;
use std::sync::Arc;

use crate::errors::{arity_mismatch, EvalError};
use crate::function::Function;

/// A value produced by evaluation.
#[derive(Clone, Debug)]
pub enum Value {
    Unit,
    Number(i64),
    Text(Arc<str>),
    /// Instance of a user-defined constructor.
    Atom(Atom),
    Function(Function),
    /// A suspended zero-argument computation, run when forced.
    Thunk(Function),
}

impl Value {
    pub fn text(s: impl Into<Arc<str>>) -> Self {
        Value::Text(s.into())
    }

    /// Name of the runtime shape, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Atom(_) => "atom",
            Value::Function(_) => "function",
            Value::Thunk(_) => "thunk",
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Atom(a), Value::Atom(b)) => a == b,
            (Value::Function(a), Value::Function(b)) | (Value::Thunk(a), Value::Thunk(b)) => {
                Function::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Atom(atom) => write!(f, "{atom}"),
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::Thunk(_) => write!(f, "<thunk>"),
        }
    }
}

/// A user-defined data constructor.
///
/// Constructors are compared by identity: two constructors with the same
/// name and arity are still distinct.
#[derive(Debug)]
pub struct Constructor {
    name: Arc<str>,
    arity: usize,
}

impl Constructor {
    pub fn new(name: impl Into<Arc<str>>, arity: usize) -> Arc<Self> {
        Arc::new(Constructor {
            name: name.into(),
            arity,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Build an atom of this constructor.
    pub fn instantiate(self: &Arc<Self>, fields: Vec<Value>) -> Result<Value, EvalError> {
        if fields.len() != self.arity {
            return Err(arity_mismatch(&self.name, self.arity, fields.len()));
        }
        Ok(Value::Atom(Atom {
            constructor: Arc::clone(self),
            fields: fields.into(),
        }))
    }
}

/// An instance of a [`Constructor`] with its field values.
#[derive(Clone, Debug)]
pub struct Atom {
    constructor: Arc<Constructor>,
    fields: Arc<[Value]>,
}

impl Atom {
    pub fn constructor(&self) -> &Arc<Constructor> {
        &self.constructor
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn is_instance_of(&self, constructor: &Arc<Constructor>) -> bool {
        Arc::ptr_eq(&self.constructor, constructor)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.constructor, &other.constructor) && self.fields == other.fields
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constructor.name)?;
        if self.fields.is_empty() {
            return Ok(());
        }
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        write!(f, ")")
    }
}
