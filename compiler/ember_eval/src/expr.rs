//! The compiled call graph.
//!
//! `Expr` trees are built by the front-end and executed by [`crate::exec`].
//! Nodes that perform calls own the caches for their call site, so a tree is
//! built once and then shared by every execution of its body, on any thread.
//!
//! Tail position is structural. The root of a body is in tail position, and
//! so are the last expression of a `Let` or `Sequence`, both arms of an
//! `IfZero`, and every branch of a `Match` in tail position. A call there is
//! handed to the caller's trampoline instead of being made directly.

use std::sync::Arc;

use crate::case::Match;
use crate::errors::{division_by_zero, integer_overflow, type_mismatch, EvalResult};
use crate::function::{CompiledBody, Definition};
use crate::trampoline::Trampoline;
use crate::value::{Constructor, Value};

/// A node of a compiled body.
#[derive(Debug)]
pub enum Expr {
    Literal(Value),
    /// The n-th argument of the executing function.
    Arg(usize),
    /// The n-th value captured by the executing function.
    Capture(usize),
    /// The n-th `Let` binding in scope, outermost first.
    Local(usize),
    /// The executing function itself.
    This,
    Global(Arc<Definition>),
    Let {
        value: Box<Expr>,
        body: Box<Expr>,
    },
    /// Evaluate each expression in order, yielding the last.
    Sequence(Vec<Expr>),
    Prim {
        op: PrimOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    IfZero {
        value: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Construct {
        constructor: Arc<Constructor>,
        fields: Vec<Expr>,
    },
    /// Build a function closed over the evaluated captures.
    Closure {
        body: Arc<CompiledBody>,
        captures: Vec<Expr>,
    },
    /// Build a thunk running a zero-arity body over the evaluated captures.
    Suspend {
        body: Arc<CompiledBody>,
        captures: Vec<Expr>,
    },
    Force(Box<ForceSite>),
    Call(Box<CallSite>),
    Match(Box<Match>),
    /// Evaluate the body under a new, empty ambient state.
    ///
    /// Never a tail position: calls inside stay within the new extent.
    WithFreshState(Box<Expr>),
    /// Raise a user failure carrying the evaluated payload.
    Panic(Box<Expr>),
}

/// A call site: callee, arguments and the site's own trampoline.
#[derive(Debug)]
pub struct CallSite {
    pub callee: Expr,
    pub arguments: Vec<Expr>,
    pub(crate) trampoline: Trampoline,
}

impl CallSite {
    /// The trampoline used when the site is called in value position.
    pub fn trampoline(&self) -> &Trampoline {
        &self.trampoline
    }
}

/// Forces a thunk, either in place or as a tail call.
#[derive(Debug)]
pub struct ForceSite {
    pub value: Expr,
    pub(crate) trampoline: Trampoline,
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn number(n: i64) -> Self {
        Expr::Literal(Value::Number(n))
    }

    pub fn unit() -> Self {
        Expr::Literal(Value::Unit)
    }

    pub fn let_in(value: Expr, body: Expr) -> Self {
        Expr::Let {
            value: Box::new(value),
            body: Box::new(body),
        }
    }

    pub fn prim(op: PrimOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Prim {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn if_zero(value: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::IfZero {
            value: Box::new(value),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn construct(constructor: &Arc<Constructor>, fields: Vec<Expr>) -> Self {
        Expr::Construct {
            constructor: Arc::clone(constructor),
            fields,
        }
    }

    pub fn closure(body: Arc<CompiledBody>, captures: Vec<Expr>) -> Self {
        Expr::Closure { body, captures }
    }

    pub fn suspend(body: Arc<CompiledBody>, captures: Vec<Expr>) -> Self {
        Expr::Suspend { body, captures }
    }

    pub fn force(value: Expr) -> Self {
        Expr::Force(Box::new(ForceSite {
            value,
            trampoline: Trampoline::new(),
        }))
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>) -> Self {
        Expr::Call(Box::new(CallSite {
            callee,
            arguments,
            trampoline: Trampoline::new(),
        }))
    }

    pub fn global(definition: &Arc<Definition>) -> Self {
        Expr::Global(Arc::clone(definition))
    }

    pub fn case(m: Match) -> Self {
        Expr::Match(Box::new(m))
    }

    pub fn with_fresh_state(body: Expr) -> Self {
        Expr::WithFreshState(Box::new(body))
    }

    pub fn panic(payload: Expr) -> Self {
        Expr::Panic(Box::new(payload))
    }
}

/// Primitive integer operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrimOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl PrimOp {
    pub fn name(self) -> &'static str {
        match self {
            PrimOp::Add => "addition",
            PrimOp::Sub => "subtraction",
            PrimOp::Mul => "multiplication",
            PrimOp::Div => "division",
        }
    }

    /// Apply the operation with overflow checking.
    pub fn apply(self, lhs: &Value, rhs: &Value) -> EvalResult {
        let (Value::Number(a), Value::Number(b)) = (lhs, rhs) else {
            let culprit = if lhs.as_number().is_some() { rhs } else { lhs };
            return Err(type_mismatch("number", culprit.type_name()));
        };
        let result = match self {
            PrimOp::Add => a.checked_add(*b),
            PrimOp::Sub => a.checked_sub(*b),
            PrimOp::Mul => a.checked_mul(*b),
            PrimOp::Div => {
                if *b == 0 {
                    return Err(division_by_zero());
                }
                a.checked_div(*b)
            }
        };
        result
            .map(Value::Number)
            .ok_or_else(|| integer_overflow(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::errors::EvalErrorKind;

    #[test]
    fn checked_arithmetic() {
        let seven = Value::Number(7);
        let two = Value::Number(2);
        assert_eq!(PrimOp::Add.apply(&seven, &two).ok(), Some(Value::Number(9)));
        assert_eq!(PrimOp::Sub.apply(&seven, &two).ok(), Some(Value::Number(5)));
        assert_eq!(PrimOp::Mul.apply(&seven, &two).ok(), Some(Value::Number(14)));
        assert_eq!(PrimOp::Div.apply(&seven, &two).ok(), Some(Value::Number(3)));
    }

    #[test]
    fn overflow_is_an_error() {
        let err = PrimOp::Add
            .apply(&Value::Number(i64::MAX), &Value::Number(1))
            .err()
            .map(|e| e.kind);
        assert_eq!(
            err,
            Some(EvalErrorKind::IntegerOverflow {
                operation: "addition"
            })
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let err = PrimOp::Div
            .apply(&Value::Number(1), &Value::Number(0))
            .err()
            .map(|e| e.kind);
        assert_eq!(err, Some(EvalErrorKind::DivisionByZero));
    }

    #[test]
    fn non_numbers_are_rejected() {
        let err = PrimOp::Mul
            .apply(&Value::Number(1), &Value::text("x"))
            .err()
            .map(|e| e.kind);
        assert_eq!(
            err,
            Some(EvalErrorKind::TypeMismatch {
                expected: "number",
                got: "text"
            })
        );
    }
}
