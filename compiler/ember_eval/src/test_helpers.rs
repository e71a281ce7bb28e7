//! Builders shared by the unit tests.

use crate::builtins::{get_state, set_state};
use crate::errors::EvalError;
use crate::expr::{Expr, PrimOp};
use crate::function::{CompiledBody, Function};
use crate::step::Step;
use crate::value::Value;

pub(crate) fn function(name: &str, arity: usize, body: Expr) -> Function {
    Function::new(CompiledBody::new(name, arity, body))
}

pub(crate) fn identity() -> Function {
    function("identity", 1, Expr::Arg(0))
}

/// A zero-argument function returning `n`.
pub(crate) fn constant(name: &str, n: i64) -> Function {
    function(name, 0, Expr::number(n))
}

pub(crate) fn call(target: &Function, arguments: Vec<Expr>) -> Expr {
    Expr::call(Expr::literal(target.clone()), arguments)
}

pub(crate) fn set_state_to(value: Expr) -> Expr {
    call(&set_state(), vec![value])
}

pub(crate) fn read_state() -> Expr {
    call(&get_state(), Vec::new())
}

pub(crate) fn sub(lhs: Expr, rhs: Expr) -> Expr {
    Expr::prim(PrimOp::Sub, lhs, rhs)
}

pub(crate) fn add(lhs: Expr, rhs: Expr) -> Expr {
    Expr::prim(PrimOp::Add, lhs, rhs)
}

pub(crate) fn mul(lhs: Expr, rhs: Expr) -> Expr {
    Expr::prim(PrimOp::Mul, lhs, rhs)
}

/// `fact(n, acc) = if n == 0 { acc } else { fact(n - 1, acc * n) }`, with the
/// recursive call in tail position.
pub(crate) fn tail_factorial() -> Function {
    function(
        "fact",
        2,
        Expr::if_zero(
            Expr::Arg(0),
            Expr::Arg(1),
            Expr::call(
                Expr::This,
                vec![
                    sub(Expr::Arg(0), Expr::number(1)),
                    mul(Expr::Arg(1), Expr::Arg(0)),
                ],
            ),
        ),
    )
}

/// `countdown(n) = if n == 0 { 0 } else { countdown(n - 1) }`, tail
/// recursive.
pub(crate) fn countdown() -> Function {
    function(
        "countdown",
        1,
        Expr::if_zero(
            Expr::Arg(0),
            Expr::number(0),
            Expr::call(Expr::This, vec![sub(Expr::Arg(0), Expr::number(1))]),
        ),
    )
}

/// `sum(n) = if n == 0 { 0 } else { n + sum(n - 1) }`, not tail recursive.
pub(crate) fn non_tail_sum() -> Function {
    function(
        "sum",
        1,
        Expr::if_zero(
            Expr::Arg(0),
            Expr::number(0),
            add(
                Expr::Arg(0),
                Expr::call(Expr::This, vec![sub(Expr::Arg(0), Expr::number(1))]),
            ),
        ),
    )
}

/// The value of a step that must have returned.
pub(crate) fn returned(step: Result<Step, EvalError>) -> Value {
    match step {
        Ok(Step::Return(value)) => value,
        Ok(Step::TailCall(call)) => panic!("expected a value, got a tail call to {}", call.function.name()),
        Err(err) => panic!("expected a value, got error: {err}"),
    }
}
