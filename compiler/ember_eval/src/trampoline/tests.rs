use pretty_assertions::assert_eq;

use super::*;
use crate::errors::EvalErrorKind;
use crate::expr::Expr;
use crate::function::CompiledBody;
use crate::test_helpers::{
    call, countdown, function, identity, mul, non_tail_sum, read_state, set_state_to,
    tail_factorial,
};

#[test]
fn runs_identity() {
    let ctx = CallContext::new(None);
    let value = Trampoline::new()
        .run(&ctx, &identity(), &[Value::Number(5)])
        .expect("identity succeeds");
    assert_eq!(value, Value::Number(5));
}

#[test]
fn tail_factorial_of_five() {
    let ctx = CallContext::new(None);
    let value = Trampoline::new()
        .run(&ctx, &tail_factorial(), &[Value::Number(5), Value::Number(1)])
        .expect("factorial succeeds");
    assert_eq!(value, Value::Number(120));
}

#[test]
fn million_tail_calls_stay_at_depth_one() {
    let ctx = CallContext::new(None);
    let trampoline = Trampoline::new();
    let value = trampoline
        .run(&ctx, &countdown(), &[Value::Number(1_000_000)])
        .expect("countdown succeeds");
    assert_eq!(value, Value::Number(0));
    assert_eq!(ctx.peak_depth(), 1);
    assert_eq!(ctx.depth(), 0);

    let stats = trampoline.stats();
    assert_eq!(stats.total(), 1_000_001);
    assert_eq!(stats.megamorphic, 0);
}

#[test]
fn non_tail_recursion_nests() {
    let ctx = CallContext::new(None);
    let value = Trampoline::new()
        .run(&ctx, &non_tail_sum(), &[Value::Number(100)])
        .expect("sum succeeds");
    assert_eq!(value, Value::Number(5050));
    assert_eq!(ctx.peak_depth(), 101);
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn depth_limit_stops_non_tail_recursion() {
    let ctx = CallContext::new(Some(50));
    let err = Trampoline::new()
        .run(&ctx, &non_tail_sum(), &[Value::Number(100)])
        .expect_err("recursion is deeper than the limit");
    assert_eq!(err.kind, EvalErrorKind::StackOverflow { limit: 50 });
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn depth_limit_ignores_tail_calls() {
    let ctx = CallContext::new(Some(2));
    let value = Trampoline::new()
        .run(&ctx, &countdown(), &[Value::Number(10_000)])
        .expect("tail calls do not nest");
    assert_eq!(value, Value::Number(0));
}

#[test]
fn errors_abort_the_loop() {
    let ctx = CallContext::new(None);
    let failing = function("failing", 0, Expr::panic(Expr::literal(Value::text("boom"))));
    let err = Trampoline::new()
        .run(&ctx, &failing, &[])
        .expect_err("body raises");
    assert_eq!(
        err.kind,
        EvalErrorKind::UserPanic {
            payload: Value::text("boom")
        }
    );
    assert_eq!(ctx.depth(), 0);
}

mod continuations {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wrapper_tail_calls_a_wider_accumulator() {
        // factorial(n) = fact(n, 1)
        let factorial = function(
            "factorial",
            1,
            call(&tail_factorial(), vec![Expr::Arg(0), Expr::number(1)]),
        );
        let ctx = CallContext::new(None);
        let value = Trampoline::new()
            .run(&ctx, &factorial, &[Value::Number(5)])
            .expect("wrapper reaches the accumulator");
        assert_eq!(value, Value::Number(120));
        assert_eq!(ctx.peak_depth(), 1);
    }

    #[test]
    fn get_state_last_in_a_unary_body() {
        let stash = function(
            "stash",
            1,
            Expr::Sequence(vec![set_state_to(Expr::Arg(0)), read_state()]),
        );
        let ctx = CallContext::new(None);
        let value = Trampoline::new()
            .run(&ctx, &stash, &[Value::Number(7)])
            .expect("get-state takes no arguments");
        assert_eq!(value, Value::Number(7));
    }

    #[test]
    fn tail_force_from_a_unary_body() {
        let later = CompiledBody::new("later", 0, mul(Expr::Capture(0), Expr::number(2)));
        let delayed = function(
            "delayed",
            1,
            Expr::force(Expr::suspend(later, vec![Expr::Arg(0)])),
        );
        let ctx = CallContext::new(None);
        let value = Trampoline::new()
            .run(&ctx, &delayed, &[Value::Number(21)])
            .expect("thunk runs as a tail call");
        assert_eq!(value, Value::Number(42));
        assert_eq!(ctx.peak_depth(), 1);
    }

    #[test]
    fn continuation_still_checks_callee_arity() {
        let short = function("short", 1, call(&tail_factorial(), vec![Expr::Arg(0)]));
        let ctx = CallContext::new(None);
        let err = Trampoline::new()
            .run(&ctx, &short, &[Value::Number(5)])
            .expect_err("fact takes two arguments");
        assert_eq!(
            err.kind,
            EvalErrorKind::ArityMismatch {
                name: "fact".to_string(),
                expected: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn entry_arity_stays_fixed() {
        let ctx = CallContext::new(None);
        let trampoline = Trampoline::new();
        trampoline
            .run(&ctx, &identity(), &[Value::Number(1)])
            .expect("first entry");
        let err = trampoline
            .run(&ctx, &tail_factorial(), &[Value::Number(1), Value::Number(1)])
            .expect_err("site was entered with one argument");
        assert_eq!(err.to_string(), "call site expects 1 argument, got 2");
    }
}
