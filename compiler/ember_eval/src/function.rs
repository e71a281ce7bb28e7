//! Functions, their compiled bodies, and late-bound module definitions.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::builtins::Builtin;
use crate::context::CallContext;
use crate::errors::{undefined_function, EvalError};
use crate::exec::{self, Frame};
use crate::expr::Expr;
use crate::step::Step;
use crate::value::Value;

/// A compiled function body with its declared arity.
///
/// Bodies are identified by address: the call-site caches key on
/// `Arc<CompiledBody>` identity, never on names.
pub struct CompiledBody {
    name: Arc<str>,
    arity: usize,
    kind: BodyKind,
}

/// How a body executes.
pub enum BodyKind {
    /// A tree of compiled expressions, evaluated with the body root in tail
    /// position.
    Expr(Expr),
    /// A primitive supplied by the runtime.
    Builtin(Builtin),
}

impl CompiledBody {
    pub fn new(name: impl Into<Arc<str>>, arity: usize, root: Expr) -> Arc<Self> {
        Arc::new(CompiledBody {
            name: name.into(),
            arity,
            kind: BodyKind::Expr(root),
        })
    }

    pub(crate) fn builtin(builtin: Builtin) -> Arc<Self> {
        Arc::new(CompiledBody {
            name: builtin.name().into(),
            arity: builtin.arity(),
            kind: BodyKind::Builtin(builtin),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    /// Run this body once. `arguments` has already been checked against the
    /// declared arity by the dispatcher.
    pub(crate) fn execute(
        &self,
        ctx: &CallContext,
        function: &Function,
        arguments: &[Value],
    ) -> Result<Step, EvalError> {
        match &self.kind {
            BodyKind::Expr(root) => {
                let mut frame = Frame::new(function, arguments);
                exec::eval_step(ctx, &mut frame, root)
            }
            BodyKind::Builtin(builtin) => builtin.call(ctx, arguments).map(Step::Return),
        }
    }
}

impl fmt::Debug for CompiledBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBody")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A callable value: a compiled body closed over its lexical environment.
///
/// The captured environment is shared with whoever else holds it, so
/// cloning a function never copies captured values.
#[derive(Clone)]
pub struct Function {
    body: Arc<CompiledBody>,
    captures: Arc<[Value]>,
}

impl Function {
    /// A function with an empty captured environment.
    pub fn new(body: Arc<CompiledBody>) -> Self {
        Self::with_captures(body, Vec::new())
    }

    pub fn with_captures(body: Arc<CompiledBody>, captures: Vec<Value>) -> Self {
        Function {
            body,
            captures: captures.into(),
        }
    }

    pub fn body(&self) -> &Arc<CompiledBody> {
        &self.body
    }

    pub fn name(&self) -> &str {
        self.body.name()
    }

    pub fn arity(&self) -> usize {
        self.body.arity()
    }

    pub fn captures(&self) -> &[Value] {
        &self.captures
    }

    /// Whether two handles refer to the same body closed over the same
    /// environment.
    pub fn ptr_eq(a: &Function, b: &Function) -> bool {
        Arc::ptr_eq(&a.body, &b.body) && Arc::ptr_eq(&a.captures, &b.captures)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .field("captures", &self.captures.len())
            .finish()
    }
}

/// A module-level binding resolved at run time.
///
/// Lets bodies refer to functions that are defined later, including
/// mutually recursive ones.
pub struct Definition {
    name: Arc<str>,
    value: OnceLock<Value>,
}

impl Definition {
    pub fn new(name: impl Into<Arc<str>>) -> Arc<Self> {
        Arc::new(Definition {
            name: name.into(),
            value: OnceLock::new(),
        })
    }

    /// Bind the definition. A definition is bound at most once; a second
    /// attempt hands the rejected value back.
    pub fn define(&self, value: impl Into<Value>) -> Result<(), Value> {
        self.value.set(value.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> Result<&Value, EvalError> {
        self.value
            .get()
            .ok_or_else(|| undefined_function(&self.name))
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("defined", &self.value.get().is_some())
            .finish()
    }
}
