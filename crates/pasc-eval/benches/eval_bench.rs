//! Evaluator benchmarks. Run with `cargo bench --package pasc-eval`.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pasc_eval::Evaluator;
use pasc_par::Parser;

fn run_source(source: &str) {
    let program = Parser::from_source(source).unwrap().parse_program().unwrap();
    let mut eval = Evaluator::with_output(Box::new(Vec::new()));
    eval.interpret(&program).unwrap();
}

fn bench_eval_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval_loop");

    let source = "PROGRAM T; VAR i, s: INTEGER; \
                  BEGIN s := 0; FOR i := 1 TO 10000 DO s := s + i END.";
    group.bench_function("sum_to_10000", |b| b.iter(|| run_source(black_box(source))));

    group.finish();
}

fn bench_eval_recursive_function(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval_functions");

    let source = r#"
        PROGRAM T;
        VAR r: INTEGER;
        FUNCTION Fact(n: INTEGER): INTEGER;
        BEGIN
            IF n <= 1 THEN Fact := 1 ELSE Fact := n * Fact(n - 1) END
        END;
        BEGIN
            r := Fact(15)
        END.
    "#;
    group.bench_function("recursive_factorial_15", |b| {
        b.iter(|| run_source(black_box(source)))
    });

    group.finish();
}

criterion_group!(benches, bench_eval_loop, bench_eval_recursive_function);
criterion_main!(benches);
