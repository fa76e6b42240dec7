//! The tree-walking evaluator: runs a `Program` that has already passed
//! semantic analysis. A call stack of `ActivationRecord`s holds function
//! locals; a single `global` map holds program-level variables. Neither
//! is ever a `static` — each `Evaluator` owns its own state, so nothing
//! here prevents running two interpreters side by side.

use std::io::{self, Write};
use std::rc::Rc;

use pasc_par::{
    BinArithOp, BoolOp, CompareOp, Decl, Expr, ForDirection, FuncDecl, NumLit, Program, Stmt,
    UnaryArithOp,
};
use pasc_util::{FxHashMap, FxHashSet, Span};
use tracing::trace;

use crate::activation::ActivationRecord;
use crate::error::{Result, RuntimeError};
use crate::value::Value;

const MAX_CALL_DEPTH: usize = 1000;

/// Where a function declaration lives lexically: directly in the program
/// block, or nested inside another function's body (identified by that
/// function's index in `Evaluator::function_entries`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum FuncScope {
    Global,
    Func(usize),
}

/// A registered function declaration together with the scope it was
/// declared in, so calls resolve by walking outward through the source's
/// own nesting rather than a single name-keyed table.
struct FuncEntry {
    decl: Rc<FuncDecl>,
    parent: FuncScope,
}

pub struct Evaluator {
    global: FxHashMap<String, Value>,
    global_locals: FxHashSet<String>,
    /// Every declared function, in registration order; a function's
    /// position here is its `FuncScope::Func` index.
    function_entries: Vec<FuncEntry>,
    /// `(enclosing scope, name) -> entry index`, for functions declared
    /// directly in that scope. Two sibling scopes may each hold an entry
    /// under the same name without colliding, since the scope is part of
    /// the key.
    function_children: FxHashMap<(FuncScope, String), usize>,
    call_stack: Vec<ActivationRecord>,
    output: Box<dyn Write>,
    max_call_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self {
            global: FxHashMap::default(),
            global_locals: FxHashSet::default(),
            function_entries: Vec::new(),
            function_children: FxHashMap::default(),
            call_stack: Vec::new(),
            output,
            max_call_depth: MAX_CALL_DEPTH,
        }
    }

    /// Overrides the recursion-depth guard (default 1000, per
    /// `RuntimeError::StackOverflow`).
    pub fn with_max_call_depth(mut self, max_call_depth: u32) -> Self {
        self.max_call_depth = max_call_depth as usize;
        self
    }

    /// The current value of a global variable, if it has been assigned.
    /// Used by the CLI's `show` REPL command.
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.global.get(name).copied()
    }

    /// All currently-assigned global variables, for the CLI's `show`
    /// command. Order is unspecified.
    pub fn globals(&self) -> impl Iterator<Item = (&str, Value)> {
        self.global.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Runs `program` to completion. Declarations are registered first
    /// (each function keyed by the scope it was declared in, so nested
    /// functions with the same name in different enclosing functions stay
    /// distinct), then the program's compound statement executes.
    pub fn interpret(&mut self, program: &Program) -> Result<()> {
        for decl in &program.block.decls {
            self.register_decl(decl, FuncScope::Global);
        }
        self.exec_stmt(&program.block.compound)
    }

    fn register_decl(&mut self, decl: &Decl, scope: FuncScope) {
        match decl {
            Decl::Var(v) => {
                self.global_locals.insert(v.name.clone());
            }
            Decl::Func(f) => self.register_function(f, scope),
        }
    }

    fn register_function(&mut self, decl: &FuncDecl, parent: FuncScope) {
        let idx = self.function_entries.len();
        self.function_entries.push(FuncEntry {
            decl: Rc::new(decl.clone()),
            parent,
        });
        self.function_children
            .insert((parent, decl.name.clone()), idx);
        let own_scope = FuncScope::Func(idx);
        for inner in &decl.body.decls {
            if let Decl::Func(nested) = inner {
                self.register_function(nested, own_scope);
            }
        }
    }

    /// Resolves `name` from `from` outward: functions declared directly in
    /// `from`, then its enclosing scope, and so on up to the program
    /// block. Mirrors how the semantic analyzer's scope table resolves
    /// identifiers, so a call only sees functions actually visible from
    /// its lexical position.
    fn resolve_function(&self, from: FuncScope, name: &str) -> Option<usize> {
        let mut scope = from;
        loop {
            if let Some(&idx) = self.function_children.get(&(scope, name.to_string())) {
                return Some(idx);
            }
            scope = match scope {
                FuncScope::Global => return None,
                FuncScope::Func(idx) => self.function_entries[idx].parent,
            };
        }
    }

    fn current_scope(&self) -> FuncScope {
        match self.call_stack.last() {
            Some(frame) => FuncScope::Func(frame.scope),
            None => FuncScope::Global,
        }
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::NoOp => Ok(()),
            Stmt::Assign(name, expr, span) => {
                let value = self.eval_expr(expr)?;
                self.write_var(name, value, *span);
                Ok(())
            }
            Stmt::Compound(stmts) => {
                for s in stmts {
                    self.exec_stmt(s)?;
                }
                Ok(())
            }
            Stmt::If(cond, then_branch, else_branch) => {
                if self.eval_bool(cond)? {
                    self.exec_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While(cond, body) => {
                while self.eval_bool(cond)? {
                    self.exec_stmt(body)?;
                }
                Ok(())
            }
            Stmt::For(var, start, end, dir, body, span) => {
                self.exec_for(var, start, end, *dir, body, *span)
            }
            Stmt::Print(exprs, newline) => {
                let mut parts = Vec::with_capacity(exprs.len());
                for e in exprs {
                    parts.push(self.eval_expr(e)?.to_string());
                }
                let line = parts.join(" ");
                if *newline {
                    let _ = writeln!(self.output, "{line}");
                } else {
                    let _ = write!(self.output, "{line}");
                }
                Ok(())
            }
        }
    }

    fn exec_for(
        &mut self,
        var: &str,
        start_expr: &Expr,
        end_expr: &Expr,
        dir: ForDirection,
        body: &Stmt,
        span: Span,
    ) -> Result<()> {
        let start = self.eval_expr(start_expr)?.expect_int(span)?;
        let end = self.eval_expr(end_expr)?.expect_int(span)?;

        match dir {
            ForDirection::To => {
                if start <= end {
                    let mut v = start;
                    while v <= end {
                        self.write_var(var, Value::Int(v), span);
                        self.exec_stmt(body)?;
                        v += 1;
                    }
                    self.write_var(var, Value::Int(end + 1), span);
                } else {
                    self.write_var(var, Value::Int(start), span);
                }
            }
            ForDirection::Downto => {
                if start >= end {
                    let mut v = start;
                    while v >= end {
                        self.write_var(var, Value::Int(v), span);
                        self.exec_stmt(body)?;
                        v -= 1;
                    }
                    self.write_var(var, Value::Int(end - 1), span);
                } else {
                    self.write_var(var, Value::Int(start), span);
                }
            }
        }
        Ok(())
    }

    fn eval_bool(&mut self, expr: &Expr) -> Result<bool> {
        Ok(matches!(self.eval_expr(expr)?, Value::Bool(true)))
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Num(lit, _) => Ok(match lit {
                NumLit::Int(n) => Value::Int(*n),
                NumLit::Real(r) => Value::Real(*r),
            }),
            Expr::Var(name, span) => self.read_var(name, *span),
            Expr::UnaryArith(op, operand, _) => {
                let v = self.eval_expr(operand)?;
                Ok(match (op, v) {
                    (UnaryArithOp::Plus, v) => v,
                    (UnaryArithOp::Minus, Value::Int(n)) => Value::Int(-n),
                    (UnaryArithOp::Minus, Value::Real(r)) => Value::Real(-r),
                    (UnaryArithOp::Minus, other) => other,
                })
            }
            Expr::BinArith(left, op, right, span) => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                self.eval_bin_arith(l, *op, r, *span)
            }
            Expr::Compare(left, op, right, _) => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                Ok(Value::Bool(eval_compare(l, *op, r)))
            }
            Expr::BoolBin(left, op, right, _) => {
                // Strict: both sides always evaluate, no short-circuit.
                let l = self.eval_bool(left)?;
                let r = self.eval_bool(right)?;
                Ok(Value::Bool(match op {
                    BoolOp::And => l && r,
                    BoolOp::Or => l || r,
                }))
            }
            Expr::BoolNot(operand, _) => Ok(Value::Bool(!self.eval_bool(operand)?)),
            Expr::Call(name, args, span) => self.eval_call(name, args, *span),
        }
    }

    fn eval_bin_arith(&self, l: Value, op: BinArithOp, r: Value, span: Span) -> Result<Value> {
        match op {
            BinArithOp::Add | BinArithOp::Sub | BinArithOp::Mul => {
                if let (Value::Int(a), Value::Int(b)) = (l, r) {
                    Ok(Value::Int(match op {
                        BinArithOp::Add => a + b,
                        BinArithOp::Sub => a - b,
                        BinArithOp::Mul => a * b,
                        BinArithOp::IntDiv | BinArithOp::FloatDiv => unreachable!(),
                    }))
                } else {
                    let a = l.as_f64().unwrap_or(0.0);
                    let b = r.as_f64().unwrap_or(0.0);
                    Ok(Value::Real(match op {
                        BinArithOp::Add => a + b,
                        BinArithOp::Sub => a - b,
                        BinArithOp::Mul => a * b,
                        BinArithOp::IntDiv | BinArithOp::FloatDiv => unreachable!(),
                    }))
                }
            }
            BinArithOp::IntDiv => {
                let a = l.as_i64().unwrap_or(0);
                let b = r.as_i64().unwrap_or(0);
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero { span });
                }
                Ok(Value::Int(floor_div(a, b)))
            }
            BinArithOp::FloatDiv => {
                let a = l.as_f64().unwrap_or(0.0);
                let b = r.as_f64().unwrap_or(0.0);
                if b == 0.0 {
                    return Err(RuntimeError::DivisionByZero { span });
                }
                Ok(Value::Real(a / b))
            }
        }
    }

    fn eval_call(&mut self, name: &str, args: &[Expr], span: Span) -> Result<Value> {
        let idx = self
            .resolve_function(self.current_scope(), name)
            .ok_or(RuntimeError::UndefinedFunction { span })?;
        let decl = self.function_entries[idx].decl.clone();

        if self.call_stack.len() >= self.max_call_depth {
            return Err(RuntimeError::StackOverflow {
                name: name.to_string(),
                span,
            });
        }

        // Arguments evaluate left-to-right in the caller's environment,
        // before the callee's frame exists.
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr(arg)?);
        }

        let mut locals = FxHashSet::default();
        locals.insert(decl.name.clone());
        for param in &decl.params {
            locals.insert(param.name.clone());
        }
        for inner in &decl.body.decls {
            if let Decl::Var(v) = inner {
                locals.insert(v.name.clone());
            }
        }

        let level = self.call_stack.len() as u32 + 2;
        let mut frame = ActivationRecord::new(decl.name.clone(), level, locals, idx);
        for (param, value) in decl.params.iter().zip(arg_values) {
            frame.set(param.name.clone(), value);
        }

        trace!(func = %decl.name, depth = self.call_stack.len() + 1, "entering call");
        self.call_stack.push(frame);
        let result = self.exec_stmt(&decl.body.compound);
        let returned = self
            .call_stack
            .last()
            .and_then(|ar| ar.get(&decl.name))
            .ok_or_else(|| RuntimeError::UsedBeforeAssignment {
                name: decl.name.clone(),
                span,
            });
        self.call_stack.pop();
        trace!(func = %decl.name, "leaving call");

        result?;
        returned
    }

    fn read_var(&self, name: &str, span: Span) -> Result<Value> {
        if let Some(frame) = self.call_stack.last() {
            if frame.locals.contains(name) {
                return frame
                    .get(name)
                    .ok_or_else(|| RuntimeError::UsedBeforeAssignment {
                        name: name.to_string(),
                        span,
                    });
            }
        }
        self.global
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UsedBeforeAssignment {
                name: name.to_string(),
                span,
            })
    }

    fn write_var(&mut self, name: &str, value: Value, _span: Span) {
        if let Some(frame) = self.call_stack.last_mut() {
            if frame.locals.contains(name) {
                frame.set(name, value);
                return;
            }
        }
        self.global.insert(name.to_string(), value);
    }
}

fn eval_compare(l: Value, op: CompareOp, r: Value) -> bool {
    let (a, b) = (l.as_f64().unwrap_or(0.0), r.as_f64().unwrap_or(0.0));
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Lt => a < b,
        CompareOp::Gt => a > b,
        CompareOp::Le => a <= b,
        CompareOp::Ge => a >= b,
    }
}

/// Floor division: rounds toward negative infinity, unlike Rust's `/`
/// which truncates toward zero.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasc_par::Parser;

    fn run(src: &str) -> (Evaluator, Result<()>) {
        let program = Parser::from_source(src).unwrap().parse_program().unwrap();
        let mut eval = Evaluator::with_output(Box::new(Vec::new()));
        let result = eval.interpret(&program);
        (eval, result)
    }

    fn global(eval: &Evaluator, name: &str) -> Value {
        eval.get_global(name).expect("variable was never assigned")
    }

    #[test]
    fn assigns_and_reads_globals() {
        let (eval, result) = run("PROGRAM T; VAR a: INTEGER; BEGIN a := 1 + 2 * 3 END.");
        assert!(result.is_ok());
        assert_eq!(global(&eval, "a"), Value::Int(7));
    }

    #[test]
    fn div_floors_toward_negative_infinity() {
        let (eval, _) = run("PROGRAM T; VAR a: INTEGER; BEGIN a := -7 DIV 2 END.");
        assert_eq!(global(&eval, "a"), Value::Int(-4));
    }

    #[test]
    fn float_division_always_yields_real() {
        let (eval, _) = run("PROGRAM T; VAR a: REAL; BEGIN a := 10 / 4 END.");
        assert_eq!(global(&eval, "a"), Value::Real(2.5));
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let (_, result) = run("PROGRAM T; VAR a: INTEGER; BEGIN a := 1 DIV 0 END.");
        assert!(matches!(result, Err(RuntimeError::DivisionByZero { .. })));
    }

    #[test]
    fn for_loop_variable_settles_one_past_the_end() {
        let (eval, result) =
            run("PROGRAM T; VAR i, s: INTEGER; BEGIN s := 0; FOR i := 1 TO 5 DO s := s + i END.");
        assert!(result.is_ok());
        assert_eq!(global(&eval, "s"), Value::Int(15));
        assert_eq!(global(&eval, "i"), Value::Int(6));
    }

    #[test]
    fn empty_for_loop_leaves_variable_at_start() {
        let (eval, _) =
            run("PROGRAM T; VAR i, s: INTEGER; BEGIN s := 0; FOR i := 5 TO 1 DO s := s + 1 END.");
        assert_eq!(global(&eval, "i"), Value::Int(5));
        assert_eq!(global(&eval, "s"), Value::Int(0));
    }

    #[test]
    fn recursive_function_call_computes_factorial() {
        let src = "PROGRAM T; VAR r: INTEGER; \
                   FUNCTION Fact(n: INTEGER): INTEGER; \
                   BEGIN IF n <= 1 THEN Fact := 1 ELSE Fact := n * Fact(n - 1) END; \
                   BEGIN r := Fact(5) END.";
        let (eval, result) = run(src);
        assert!(result.is_ok());
        assert_eq!(global(&eval, "r"), Value::Int(120));
    }

    #[test]
    fn variable_used_before_assignment_is_a_runtime_error() {
        let (_, result) = run("PROGRAM T; VAR a, b: INTEGER; BEGIN a := b END.");
        assert!(matches!(
            result,
            Err(RuntimeError::UsedBeforeAssignment { .. })
        ));
    }

    #[test]
    fn undefined_function_call_is_a_runtime_error() {
        // Semantic analysis would normally reject this; the evaluator
        // guards it independently too.
        let program = Parser::from_source(
            "PROGRAM T; VAR r: INTEGER; BEGIN r := Missing(1) END.",
        )
        .unwrap()
        .parse_program()
        .unwrap();
        let mut eval = Evaluator::with_output(Box::new(Vec::new()));
        let result = eval.interpret(&program);
        assert!(matches!(
            result,
            Err(RuntimeError::UndefinedFunction { .. })
        ));
    }

    #[test]
    fn same_named_nested_functions_in_different_enclosing_functions_do_not_collide() {
        let src = "PROGRAM T; VAR r: INTEGER; \
                   FUNCTION A: INTEGER; \
                       FUNCTION Helper: INTEGER; BEGIN Helper := 1 END; \
                       BEGIN A := Helper END; \
                   FUNCTION B: INTEGER; \
                       FUNCTION Helper: INTEGER; BEGIN Helper := 2 END; \
                       BEGIN B := Helper END; \
                   BEGIN r := A + B END.";
        let (eval, result) = run(src);
        assert!(result.is_ok());
        assert_eq!(global(&eval, "r"), Value::Int(3));
    }

    #[test]
    fn and_or_combine_both_sides_of_a_condition() {
        let (eval, result) = run(
            "PROGRAM T; VAR a: INTEGER; \
             BEGIN IF (1 < 2) AND (3 > 2) THEN a := 1 ELSE a := 0 END.",
        );
        assert!(result.is_ok());
        assert_eq!(global(&eval, "a"), Value::Int(1));
    }
}
