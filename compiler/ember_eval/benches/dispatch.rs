//! Call dispatch benchmarks.
//!
//! Compares a monomorphic call site (one cached body) with a megamorphic one
//! (more distinct bodies than cache slots), and measures trampolined tail
//! loops of increasing length.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ember_eval::{CallDispatcher, CompiledBody, Engine, Expr, Function, PrimOp, Value};

fn constant(n: i64) -> Function {
    Function::new(CompiledBody::new("constant", 0, Expr::number(n)))
}

fn countdown() -> Function {
    Function::new(CompiledBody::new(
        "countdown",
        1,
        Expr::if_zero(
            Expr::Arg(0),
            Expr::number(0),
            Expr::call(
                Expr::This,
                vec![Expr::prim(PrimOp::Sub, Expr::Arg(0), Expr::number(1))],
            ),
        ),
    ))
}

fn bench_call_sites(c: &mut Criterion) {
    let ctx = Engine::new().context();
    let targets: Vec<Function> = (0..4).map(constant).collect();

    c.bench_function("dispatch/monomorphic", |b| {
        let dispatcher = CallDispatcher::new();
        b.iter(|| black_box(dispatcher.execute_call(&ctx, &targets[0], &[])));
    });

    c.bench_function("dispatch/megamorphic", |b| {
        let dispatcher = CallDispatcher::new();
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % targets.len();
            black_box(dispatcher.execute_call(&ctx, &targets[i], &[]))
        });
    });
}

fn bench_tail_loops(c: &mut Criterion) {
    let engine = Engine::new();
    let countdown = countdown();
    let mut group = c.benchmark_group("trampoline/countdown");

    for n in [100_i64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(engine.run(&countdown, &[Value::Number(n)])));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_call_sites, bench_tail_loops);
criterion_main!(benches);
