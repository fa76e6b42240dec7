//! End-to-end scenarios exercising the full lex -> parse -> analyze ->
//! evaluate pipeline.

use pasc_eval::{Evaluator, RuntimeError, Value};
use pasc_par::Parser;
use pasc_sem::SemanticAnalyzer;
use pasc_util::Handler;

fn run(src: &str) -> Evaluator {
    let program = Parser::from_source(src).unwrap().parse_program().unwrap();
    let handler = Handler::new();
    SemanticAnalyzer::new(&handler)
        .analyze(&program)
        .expect("program should pass semantic analysis");
    let mut eval = Evaluator::with_output(Box::new(Vec::new()));
    eval.interpret(&program).expect("program should evaluate");
    eval
}

fn global(eval: &Evaluator, name: &str) -> Value {
    eval.get_global(name)
        .unwrap_or_else(|| panic!("`{name}` was never assigned"))
}

#[test]
fn s1_arithmetic_and_precedence() {
    let eval = run("PROGRAM T; VAR result: INTEGER; BEGIN result := 7 + 3 * (10 / (12 / (3 + 1) - 1)) END.");
    assert_eq!(global(&eval, "result"), Value::Real(22.0));
}

#[test]
fn s2_integer_vs_float_division() {
    let eval = run("PROGRAM T; VAR a: INTEGER; b: REAL; BEGIN a := 10 DIV 3; b := 10 / 3 END.");
    assert_eq!(global(&eval, "a"), Value::Int(3));
    match global(&eval, "b") {
        Value::Real(b) => assert!((b - 10.0 / 3.0).abs() < 1e-9),
        other => panic!("expected Real, got {other:?}"),
    }
}

#[test]
fn s3_recursive_factorial() {
    let src = "PROGRAM T; VAR r: INTEGER; \
               FUNCTION Fact(n: INTEGER): INTEGER; \
               BEGIN IF n <= 1 THEN Fact := 1 ELSE Fact := n * Fact(n-1) END END; \
               BEGIN r := Fact(5) END.";
    let eval = run(src);
    assert_eq!(global(&eval, "r"), Value::Int(120));
}

#[test]
fn s4_for_downto_post_loop_value() {
    let src = "PROGRAM T; VAR i, s: INTEGER; \
               BEGIN s := 0; FOR i := 5 DOWNTO 1 DO s := s + i END.";
    let eval = run(src);
    assert_eq!(global(&eval, "s"), Value::Int(15));
    assert_eq!(global(&eval, "i"), Value::Int(0));
}

#[test]
fn s5_parameter_shadows_global() {
    let src = "PROGRAM T; VAR x, r: INTEGER; \
               FUNCTION F(x: INTEGER): INTEGER; BEGIN F := x * 2 END; \
               BEGIN x := 5; r := F(10) END.";
    let eval = run(src);
    assert_eq!(global(&eval, "x"), Value::Int(5));
    assert_eq!(global(&eval, "r"), Value::Int(20));
}

#[test]
fn s6_division_by_zero_is_a_runtime_error() {
    let program = Parser::from_source("PROGRAM T; VAR r: INTEGER; BEGIN r := 1 DIV 0 END.")
        .unwrap()
        .parse_program()
        .unwrap();
    let handler = Handler::new();
    SemanticAnalyzer::new(&handler).analyze(&program).unwrap();
    let mut eval = Evaluator::with_output(Box::new(Vec::new()));
    let err = eval.interpret(&program).unwrap_err();
    assert!(matches!(err, RuntimeError::DivisionByZero { .. }));
    assert!(err.to_string().contains("Division by zero"));
}
