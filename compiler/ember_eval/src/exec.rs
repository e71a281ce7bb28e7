//! Tree-walking evaluation of compiled bodies.
//!
//! Two entry points mirror the two kinds of position an expression can be
//! in. [`eval_step`] evaluates an expression in tail position and may hand a
//! call back to the caller as [`Step::TailCall`]. [`eval_value`] evaluates
//! anything else and always produces a value, running calls to completion
//! through the call site's own trampoline.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::context::CallContext;
use crate::errors::{not_callable, type_mismatch, unbound_slot, user_panic, EvalError, EvalResult};
use crate::expr::{CallSite, Expr};
use crate::function::Function;
use crate::step::{Arguments, Step};
use crate::value::Value;

/// Bindings visible to one execution of a body.
pub(crate) struct Frame<'a> {
    function: &'a Function,
    arguments: &'a [Value],
    locals: SmallVec<[Value; 8]>,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(function: &'a Function, arguments: &'a [Value]) -> Self {
        Frame {
            function,
            arguments,
            locals: SmallVec::new(),
        }
    }

    fn argument(&self, index: usize) -> EvalResult {
        self.arguments
            .get(index)
            .cloned()
            .ok_or_else(|| unbound_slot("argument", index))
    }

    fn capture(&self, index: usize) -> EvalResult {
        self.function
            .captures()
            .get(index)
            .cloned()
            .ok_or_else(|| unbound_slot("capture", index))
    }

    fn local(&self, index: usize) -> EvalResult {
        self.locals
            .get(index)
            .cloned()
            .ok_or_else(|| unbound_slot("local", index))
    }
}

/// Evaluate `expr` in tail position.
pub(crate) fn eval_step(
    ctx: &CallContext,
    frame: &mut Frame<'_>,
    expr: &Expr,
) -> Result<Step, EvalError> {
    match expr {
        Expr::Let { value, body } => {
            let value = eval_value(ctx, frame, value)?;
            frame.locals.push(value);
            let step = eval_step(ctx, frame, body);
            frame.locals.pop();
            step
        }
        Expr::Sequence(exprs) => {
            let Some((last, init)) = exprs.split_last() else {
                return Ok(Step::Return(Value::Unit));
            };
            for expr in init {
                eval_value(ctx, frame, expr)?;
            }
            eval_step(ctx, frame, last)
        }
        Expr::IfZero {
            value,
            then,
            otherwise,
        } => {
            if is_zero(&eval_value(ctx, frame, value)?)? {
                eval_step(ctx, frame, then)
            } else {
                eval_step(ctx, frame, otherwise)
            }
        }
        Expr::Call(site) => {
            let (function, arguments) = prepare_call(ctx, frame, site)?;
            Ok(Step::tail_call(function, arguments))
        }
        Expr::Force(site) => match eval_value(ctx, frame, &site.value)? {
            Value::Thunk(thunk) => Ok(Step::tail_call(thunk, Arguments::new())),
            other => Ok(Step::Return(other)),
        },
        Expr::Match(m) => m.dispatch_tail(ctx, frame),
        other => eval_value(ctx, frame, other).map(Step::Return),
    }
}

/// Evaluate `expr` to a value.
pub(crate) fn eval_value(ctx: &CallContext, frame: &mut Frame<'_>, expr: &Expr) -> EvalResult {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Arg(index) => frame.argument(*index),
        Expr::Capture(index) => frame.capture(*index),
        Expr::Local(index) => frame.local(*index),
        Expr::This => Ok(Value::Function(frame.function.clone())),
        Expr::Global(definition) => definition.get().cloned(),
        Expr::Let { value, body } => {
            let value = eval_value(ctx, frame, value)?;
            frame.locals.push(value);
            let result = eval_value(ctx, frame, body);
            frame.locals.pop();
            result
        }
        Expr::Sequence(exprs) => {
            let mut last = Value::Unit;
            for expr in exprs {
                last = eval_value(ctx, frame, expr)?;
            }
            Ok(last)
        }
        Expr::Prim { op, lhs, rhs } => {
            let lhs = eval_value(ctx, frame, lhs)?;
            let rhs = eval_value(ctx, frame, rhs)?;
            op.apply(&lhs, &rhs)
        }
        Expr::IfZero {
            value,
            then,
            otherwise,
        } => {
            if is_zero(&eval_value(ctx, frame, value)?)? {
                eval_value(ctx, frame, then)
            } else {
                eval_value(ctx, frame, otherwise)
            }
        }
        Expr::Construct {
            constructor,
            fields,
        } => {
            let fields = eval_all(ctx, frame, fields)?;
            constructor.instantiate(fields.into_vec())
        }
        Expr::Closure { body, captures } => {
            let captures = eval_all(ctx, frame, captures)?;
            Ok(Value::Function(Function::with_captures(
                Arc::clone(body),
                captures.into_vec(),
            )))
        }
        Expr::Suspend { body, captures } => {
            let captures = eval_all(ctx, frame, captures)?;
            Ok(Value::Thunk(Function::with_captures(
                Arc::clone(body),
                captures.into_vec(),
            )))
        }
        Expr::Force(site) => match eval_value(ctx, frame, &site.value)? {
            Value::Thunk(thunk) => site.trampoline.run(ctx, &thunk, &[]),
            other => Ok(other),
        },
        Expr::Call(site) => {
            let (function, arguments) = prepare_call(ctx, frame, site)?;
            site.trampoline.run(ctx, &function, &arguments)
        }
        Expr::Match(m) => m.dispatch_value(ctx, frame),
        Expr::WithFreshState(body) => {
            let extent = ctx.with_fresh_state();
            eval_value(&extent, frame, body)
        }
        Expr::Panic(payload) => Err(user_panic(eval_value(ctx, frame, payload)?)),
    }
}

/// Evaluate an expression that must produce a function.
pub(crate) fn eval_function(
    ctx: &CallContext,
    frame: &mut Frame<'_>,
    expr: &Expr,
) -> Result<Function, EvalError> {
    match eval_value(ctx, frame, expr)? {
        Value::Function(function) => Ok(function),
        other => Err(not_callable(other.type_name())),
    }
}

fn prepare_call(
    ctx: &CallContext,
    frame: &mut Frame<'_>,
    site: &CallSite,
) -> Result<(Function, Arguments), EvalError> {
    let function = eval_function(ctx, frame, &site.callee)?;
    let arguments = eval_all(ctx, frame, &site.arguments)?;
    Ok((function, arguments))
}

fn eval_all(ctx: &CallContext, frame: &mut Frame<'_>, exprs: &[Expr]) -> Result<Arguments, EvalError> {
    exprs.iter().map(|expr| eval_value(ctx, frame, expr)).collect()
}

fn is_zero(value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Number(n) => Ok(*n == 0),
        other => Err(type_mismatch("number", other.type_name())),
    }
}
