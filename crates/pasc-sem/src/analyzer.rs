//! Single-pass semantic analysis: builds the scope tree, resolves every
//! identifier, and rejects duplicate declarations, undeclared references,
//! and function arity mismatches. A tagged-variant `match` replaces the
//! dynamic `visit_<Name>` dispatch a naive port would reach for.

use std::rc::Rc;

use pasc_par::{Decl, Expr, FuncDecl, Program, Stmt, VarDecl};
use pasc_util::{Diagnostic, Handler, LocatedError};
use tracing::debug;

use crate::error::{Result, SemError};
use crate::scope::ScopeTree;
use crate::symbol::{BuiltinType, FuncSymbol, Symbol, VarSymbol};

pub struct SemanticAnalyzer<'h> {
    scopes: ScopeTree,
    handler: &'h Handler,
}

impl<'h> SemanticAnalyzer<'h> {
    pub fn new(handler: &'h Handler) -> Self {
        Self {
            scopes: ScopeTree::new(),
            handler,
        }
    }

    /// Analyze `program`, reporting the first error (if any) to the
    /// handler and returning it. There is no recovery: analysis stops at
    /// the first rejected node.
    pub fn analyze(&mut self, program: &Program) -> Result<()> {
        match self.analyze_program(program) {
            Ok(()) => Ok(()),
            Err(err) => {
                let span = err.span().unwrap_or(pasc_util::Span::DUMMY);
                self.handler
                    .emit(Diagnostic::error(err.to_string()).with_span(span));
                Err(err)
            }
        }
    }

    fn resolve_type(&self, name: &str, span: pasc_util::Span) -> Result<BuiltinType> {
        match self.scopes.resolve(name) {
            Some(Symbol::Builtin(t)) => Ok(*t),
            _ => Err(SemError::UnknownType {
                name: name.to_string(),
                span,
            }),
        }
    }

    fn analyze_program(&mut self, program: &Program) -> Result<()> {
        debug!(scope = "global", "entering program scope");
        for decl in &program.block.decls {
            self.analyze_decl(decl)?;
        }
        self.analyze_stmt(&program.block.compound)?;
        debug!(scope = "global", "leaving program scope");
        Ok(())
    }

    fn analyze_decl(&mut self, decl: &Decl) -> Result<()> {
        match decl {
            Decl::Var(v) => self.analyze_var_decl(v),
            Decl::Func(f) => self.analyze_func_decl(f),
        }
    }

    fn analyze_var_decl(&mut self, decl: &VarDecl) -> Result<()> {
        let ty = self.resolve_type(&decl.type_name, decl.span)?;
        if self.scopes.declared_in_current_scope(&decl.name) {
            return Err(SemError::DuplicateIdentifier {
                name: decl.name.clone(),
                span: decl.span,
            });
        }
        self.scopes.define(
            &decl.name,
            Symbol::Var(Rc::new(VarSymbol {
                name: decl.name.clone(),
                type_ref: ty,
            })),
        );
        Ok(())
    }

    fn analyze_func_decl(&mut self, decl: &FuncDecl) -> Result<()> {
        if self.scopes.declared_in_current_scope(&decl.name) {
            return Err(SemError::DuplicateIdentifier {
                name: decl.name.clone(),
                span: decl.span,
            });
        }

        let return_type = self.resolve_type(&decl.return_type, decl.span)?;
        let mut param_symbols = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = self.resolve_type(&param.type_name, param.span)?;
            param_symbols.push(VarSymbol {
                name: param.name.clone(),
                type_ref: ty,
            });
        }

        self.scopes.define(
            &decl.name,
            Symbol::Func(Rc::new(FuncSymbol {
                name: decl.name.clone(),
                params: param_symbols.clone(),
                return_type,
            })),
        );

        debug!(func = %decl.name, "entering function scope");
        self.scopes.enter_scope(decl.name.clone());

        // The function's own name is bound as a VarSymbol in its own
        // scope: `Name := expr;` inside the body records the return value.
        self.scopes.define(
            &decl.name,
            Symbol::Var(Rc::new(VarSymbol {
                name: decl.name.clone(),
                type_ref: return_type,
            })),
        );

        for param in &param_symbols {
            if self.scopes.declared_in_current_scope(&param.name) {
                self.scopes.exit_scope();
                return Err(SemError::DuplicateIdentifier {
                    name: param.name.clone(),
                    span: decl.span,
                });
            }
            self.scopes
                .define(&param.name, Symbol::Var(Rc::new(param.clone())));
        }

        let body_result = (|| {
            for inner_decl in &decl.body.decls {
                self.analyze_decl(inner_decl)?;
            }
            self.analyze_stmt(&decl.body.compound)
        })();

        debug!(func = %decl.name, "leaving function scope");
        self.scopes.exit_scope();
        body_result
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::NoOp => Ok(()),
            Stmt::Assign(name, expr, span) => {
                if self.scopes.resolve(name).and_then(Symbol::as_var).is_none() {
                    return Err(SemError::AssignToUndeclaredVariable {
                        name: name.clone(),
                        span: *span,
                    });
                }
                self.analyze_expr(expr)
            }
            Stmt::Compound(stmts) => {
                for s in stmts {
                    self.analyze_stmt(s)?;
                }
                Ok(())
            }
            Stmt::If(cond, then_branch, else_branch) => {
                self.analyze_expr(cond)?;
                self.analyze_stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.analyze_stmt(else_branch)?;
                }
                Ok(())
            }
            Stmt::While(cond, body) => {
                self.analyze_expr(cond)?;
                self.analyze_stmt(body)
            }
            Stmt::For(var, start, end, _dir, body, span) => {
                if self.scopes.resolve(var).and_then(Symbol::as_var).is_none() {
                    return Err(SemError::UndeclaredVariable {
                        name: var.clone(),
                        span: *span,
                    });
                }
                self.analyze_expr(start)?;
                self.analyze_expr(end)?;
                self.analyze_stmt(body)
            }
            Stmt::Print(exprs, _newline) => {
                for e in exprs {
                    self.analyze_expr(e)?;
                }
                Ok(())
            }
        }
    }

    fn analyze_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Num(_, _) => Ok(()),
            Expr::Var(name, span) => {
                if self.scopes.resolve(name).and_then(Symbol::as_var).is_none() {
                    return Err(SemError::UndeclaredVariable {
                        name: name.clone(),
                        span: *span,
                    });
                }
                Ok(())
            }
            Expr::UnaryArith(_, operand, _) => self.analyze_expr(operand),
            Expr::BinArith(left, _, right, _) => {
                self.analyze_expr(left)?;
                self.analyze_expr(right)
            }
            Expr::Compare(left, _op, right, _) => {
                self.analyze_expr(left)?;
                self.analyze_expr(right)
            }
            Expr::BoolBin(left, _op, right, _) => {
                self.analyze_expr(left)?;
                self.analyze_expr(right)
            }
            Expr::BoolNot(operand, _) => self.analyze_expr(operand),
            Expr::Call(name, args, span) => {
                let func = match self.scopes.resolve(name).and_then(Symbol::as_func) {
                    Some(f) => f.clone(),
                    None => {
                        return Err(SemError::UndefinedFunction {
                            name: name.clone(),
                            span: *span,
                        })
                    }
                };
                if func.params.len() != args.len() {
                    return Err(SemError::ArityMismatch {
                        name: name.clone(),
                        expected: func.params.len(),
                        found: args.len(),
                        span: *span,
                    });
                }
                for arg in args {
                    self.analyze_expr(arg)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasc_par::Parser;

    fn analyze(src: &str) -> Result<()> {
        let program = Parser::from_source(src).unwrap().parse_program().unwrap();
        let handler = Handler::new();
        SemanticAnalyzer::new(&handler).analyze(&program)
    }

    #[test]
    fn accepts_well_formed_program() {
        assert!(analyze("PROGRAM T; VAR r: INTEGER; BEGIN r := 1 END.").is_ok());
    }

    #[test]
    fn rejects_duplicate_var_declaration() {
        let err = analyze("PROGRAM T; VAR a: INTEGER; a: REAL; BEGIN END.").unwrap_err();
        assert!(matches!(err, SemError::DuplicateIdentifier { .. }));
    }

    #[test]
    fn rejects_undeclared_variable_reference() {
        let err = analyze("PROGRAM T; VAR r: INTEGER; BEGIN r := x END.").unwrap_err();
        assert!(matches!(err, SemError::UndeclaredVariable { name, .. } if name == "x"));
    }

    #[test]
    fn rejects_assignment_to_undeclared_variable() {
        let err = analyze("PROGRAM T; BEGIN x := 1 END.").unwrap_err();
        assert!(matches!(err, SemError::AssignToUndeclaredVariable { name, .. } if name == "x"));
    }

    #[test]
    fn rejects_call_to_undefined_function() {
        let err = analyze("PROGRAM T; VAR r: INTEGER; BEGIN r := Foo(1) END.").unwrap_err();
        assert!(matches!(err, SemError::UndefinedFunction { name, .. } if name == "Foo"));
    }

    #[test]
    fn rejects_arity_mismatch() {
        let src = "PROGRAM T; VAR r: INTEGER; \
                   FUNCTION F(a: INTEGER): INTEGER; BEGIN F := a END; \
                   BEGIN r := F(1, 2) END.";
        let err = analyze(src).unwrap_err();
        assert!(matches!(
            err,
            SemError::ArityMismatch {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn function_name_is_bound_as_return_slot() {
        let src = "PROGRAM T; VAR r: INTEGER; \
                   FUNCTION F(a: INTEGER): INTEGER; BEGIN F := a * 2 END; \
                   BEGIN r := F(1) END.";
        assert!(analyze(src).is_ok());
    }

    #[test]
    fn parameter_may_shadow_global_of_the_same_name() {
        let src = "PROGRAM T; VAR x, r: INTEGER; \
                   FUNCTION F(x: INTEGER): INTEGER; BEGIN F := x * 2 END; \
                   BEGIN x := 5; r := F(10) END.";
        assert!(analyze(src).is_ok());
    }

    #[test]
    fn nested_begin_end_does_not_create_a_new_scope() {
        // A variable declared at function/program scope must remain
        // visible inside a nested BEGIN...END block, and nothing declared
        // "inside" a compound leaks a new scope to close.
        let src = "PROGRAM T; VAR r: INTEGER; BEGIN BEGIN r := 1 END END.";
        assert!(analyze(src).is_ok());
    }

    #[test]
    fn for_loop_variable_must_be_declared() {
        let err = analyze("PROGRAM T; BEGIN FOR i := 1 TO 5 DO i := i END.").unwrap_err();
        assert!(matches!(err, SemError::UndeclaredVariable { name, .. } if name == "i"));
    }
}
