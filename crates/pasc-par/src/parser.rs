//! Recursive-descent parser: one function per grammar rule, LL(1) plus a
//! single token of lookahead to disambiguate `Call` from `Var`.
//!
//! No error recovery. The first [`ParseError`] aborts parsing and
//! propagates with `?` — there is no synchronization/panic-mode recovery
//! here (contrast a compiler meant to report many errors per run).

use pasc_lex::{Lexer, Token, TokenKind};
use pasc_util::Span;
use tracing::trace;

use crate::ast::*;
use crate::error::{ParseError, Result};

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Lex `source` and build a parser over the resulting tokens.
    pub fn from_source(source: &str) -> std::result::Result<Self, pasc_lex::LexError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self::new(tokens))
    }

    fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek(&self, offset: usize) -> &Token {
        let idx = (self.position + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consume the current token if it matches `kind`, else error.
    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: kind.to_string(),
                found: self.current().kind,
                span: self.current().span,
            })
        }
    }

    /// Consume an `ID` token, returning its original-case lexeme.
    fn expect_id(&mut self) -> Result<(String, Span)> {
        if self.check(TokenKind::Id) {
            let tok = self.advance();
            Ok((tok.lexeme, tok.span))
        } else {
            Err(ParseError::UnexpectedToken {
                expected: "ID".to_string(),
                found: self.current().kind,
                span: self.current().span,
            })
        }
    }

    fn parse_type(&mut self) -> Result<String> {
        match self.current().kind {
            TokenKind::Integer => {
                self.advance();
                Ok("INTEGER".to_string())
            }
            TokenKind::Real => {
                self.advance();
                Ok("REAL".to_string())
            }
            found => Err(ParseError::ExpectedType {
                found,
                span: self.current().span,
            }),
        }
    }

    // program := PROGRAM ID ; block .
    pub fn parse_program(&mut self) -> Result<Program> {
        self.expect(TokenKind::Program)?;
        let (name, _) = self.expect_id()?;
        self.expect(TokenKind::Semi)?;
        let block = self.parse_block()?;
        self.expect(TokenKind::Dot)?;
        trace!(name, "parsed program");
        Ok(Program { name, block })
    }

    // block := declarations compound
    fn parse_block(&mut self) -> Result<Block> {
        let decls = self.parse_declarations()?;
        let compound = self.parse_compound()?;
        Ok(Block { decls, compound })
    }

    // declarations := [ VAR { varDecl ; }+ ] { funcDecl }*
    fn parse_declarations(&mut self) -> Result<Vec<Decl>> {
        let mut decls = Vec::new();

        if self.check(TokenKind::Var) {
            self.advance();
            loop {
                let group = self.parse_var_decl_group()?;
                decls.extend(group.into_iter().map(Decl::Var));
                self.expect(TokenKind::Semi)?;
                if !self.check(TokenKind::Id) {
                    break;
                }
            }
        }

        while self.check(TokenKind::Function) {
            decls.push(Decl::Func(self.parse_func_decl()?));
        }

        Ok(decls)
    }

    // varDecl := ID { , ID } : type
    // One varDecl line can name several variables sharing a type; expand
    // into one `VarDecl` per name.
    fn parse_var_decl_group(&mut self) -> Result<Vec<VarDecl>> {
        let mut names = Vec::new();
        let (first, first_span) = self.expect_id()?;
        names.push((first, first_span));
        while self.check(TokenKind::Comma) {
            self.advance();
            let (name, span) = self.expect_id()?;
            names.push((name, span));
        }
        self.expect(TokenKind::Colon)?;
        let type_name = self.parse_type()?;
        Ok(names
            .into_iter()
            .map(|(name, span)| VarDecl {
                name,
                type_name: type_name.clone(),
                span,
            })
            .collect())
    }

    // funcDecl := FUNCTION ID [ ( formalList ) ] : type ; block ;
    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        let start_span = self.current().span;
        self.expect(TokenKind::Function)?;
        let (name, _) = self.expect_id()?;

        let mut params = Vec::new();
        if self.check(TokenKind::LParen) {
            self.advance();
            params = self.parse_formal_list()?;
            self.expect(TokenKind::RParen)?;
        }

        self.expect(TokenKind::Colon)?;
        let return_type = self.parse_type()?;
        self.expect(TokenKind::Semi)?;
        let body = self.parse_block()?;
        self.expect(TokenKind::Semi)?;

        Ok(FuncDecl {
            name,
            params,
            return_type,
            body,
            span: start_span,
        })
    }

    // formalList := formalGroup { ; formalGroup }
    fn parse_formal_list(&mut self) -> Result<Vec<Param>> {
        let mut params = self.parse_formal_group()?;
        while self.check(TokenKind::Semi) {
            self.advance();
            params.extend(self.parse_formal_group()?);
        }
        Ok(params)
    }

    // formalGroup := ID { , ID } : type
    fn parse_formal_group(&mut self) -> Result<Vec<Param>> {
        let mut names = Vec::new();
        let (first, first_span) = self.expect_id()?;
        names.push((first, first_span));
        while self.check(TokenKind::Comma) {
            self.advance();
            let (name, span) = self.expect_id()?;
            names.push((name, span));
        }
        self.expect(TokenKind::Colon)?;
        let type_name = self.parse_type()?;
        Ok(names
            .into_iter()
            .map(|(name, span)| Param {
                name,
                type_name: type_name.clone(),
                span,
            })
            .collect())
    }

    // compound := BEGIN statementList END
    fn parse_compound(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::Begin)?;
        let statements = self.parse_statement_list()?;
        self.expect(TokenKind::End)?;
        Ok(Stmt::Compound(statements))
    }

    fn starts_statement(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Begin
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Print
                | TokenKind::Writeln
                | TokenKind::Id
        )
    }

    // statementList := statement { ; statement }
    fn parse_statement_list(&mut self) -> Result<Vec<Stmt>> {
        let mut statements = vec![self.parse_statement()?];
        while self.check(TokenKind::Semi) {
            self.advance();
            statements.push(self.parse_statement()?);
        }
        // `;` is a separator, not a terminator: two statements back-to-back
        // with no `;` between them is an error, not an implicit split.
        if self.starts_statement() {
            return Err(ParseError::UnexpectedInStatementList {
                found: self.current().kind,
                span: self.current().span,
            });
        }
        Ok(statements)
    }

    // statement := compound | ifStmt | whileStmt | forStmt
    //            | printStmt | assign | ε
    fn parse_statement(&mut self) -> Result<Stmt> {
        match self.current().kind {
            TokenKind::Begin => self.parse_compound(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Print | TokenKind::Writeln => self.parse_print_statement(),
            TokenKind::Id => self.parse_assign_statement(),
            _ => Ok(Stmt::NoOp),
        }
    }

    // ifStmt := IF boolExpr THEN statement [ ELSE statement ] END
    fn parse_if_statement(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::If)?;
        let cond = self.parse_bool_expr()?;
        self.expect(TokenKind::Then)?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.check(TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        self.expect(TokenKind::End)?;
        Ok(Stmt::If(cond, then_branch, else_branch))
    }

    // whileStmt := WHILE boolExpr DO statement
    fn parse_while_statement(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::While)?;
        let cond = self.parse_bool_expr()?;
        self.expect(TokenKind::Do)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While(cond, body))
    }

    // forStmt := FOR ID := expr (TO|DOWNTO) expr DO statement
    fn parse_for_statement(&mut self) -> Result<Stmt> {
        let start_span = self.current().span;
        self.expect(TokenKind::For)?;
        let (var, _) = self.expect_id()?;
        self.expect(TokenKind::Assign)?;
        let start = self.parse_expr()?;
        let direction = match self.current().kind {
            TokenKind::To => {
                self.advance();
                ForDirection::To
            }
            TokenKind::Downto => {
                self.advance();
                ForDirection::Downto
            }
            found => {
                return Err(ParseError::UnexpectedToken {
                    expected: "TO or DOWNTO".to_string(),
                    found,
                    span: self.current().span,
                })
            }
        };
        let end = self.parse_expr()?;
        self.expect(TokenKind::Do)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For(var, start, end, direction, body, start_span))
    }

    // printStmt := (PRINT|WRITELN) ( expr { , expr } )
    fn parse_print_statement(&mut self) -> Result<Stmt> {
        let newline = self.check(TokenKind::Writeln);
        self.advance();
        self.expect(TokenKind::LParen)?;
        let mut exprs = vec![self.parse_expr()?];
        while self.check(TokenKind::Comma) {
            self.advance();
            exprs.push(self.parse_expr()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(Stmt::Print(exprs, newline))
    }

    // assign := ID := expr
    fn parse_assign_statement(&mut self) -> Result<Stmt> {
        let (name, span) = self.expect_id()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        Ok(Stmt::Assign(name, value, span))
    }

    // boolExpr := boolTerm { OR boolTerm }
    fn parse_bool_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_bool_term()?;
        while self.check(TokenKind::Or) {
            let span = self.current().span;
            self.advance();
            let right = self.parse_bool_term()?;
            left = Expr::BoolBin(Box::new(left), BoolOp::Or, Box::new(right), span);
        }
        Ok(left)
    }

    // boolTerm := boolFactor { AND boolFactor }
    fn parse_bool_term(&mut self) -> Result<Expr> {
        let mut left = self.parse_bool_factor()?;
        while self.check(TokenKind::And) {
            let span = self.current().span;
            self.advance();
            let right = self.parse_bool_factor()?;
            left = Expr::BoolBin(Box::new(left), BoolOp::And, Box::new(right), span);
        }
        Ok(left)
    }

    // boolFactor := NOT boolFactor | ( boolExpr ) | comparison
    //
    // A `(` here is ambiguous between "parenthesized boolean group"
    // (`(a > b) AND (c < d)`) and "parenthesized arithmetic operand of a
    // comparison" (`(x + 1) > y`). Both reduce through the same grammar:
    // a parenthesized boolExpr with no AND/OR inside is just a bare
    // comparison/expr. So we always parse `( boolExpr )` first, then check
    // whether a relational operator immediately follows the closing `)` —
    // if so, the parenthesized value was the left operand of a comparison
    // we haven't finished parsing yet.
    fn parse_bool_factor(&mut self) -> Result<Expr> {
        if self.check(TokenKind::Not) {
            let span = self.current().span;
            self.advance();
            let operand = self.parse_bool_factor()?;
            return Ok(Expr::BoolNot(Box::new(operand), span));
        }

        if self.check(TokenKind::LParen) {
            self.advance();
            let inner = self.parse_bool_expr()?;
            self.expect(TokenKind::RParen)?;
            return self.continue_comparison(inner);
        }

        self.parse_comparison()
    }

    /// If the current token is a relational operator, `left` was a
    /// comparison's left-hand operand; finish building the `Compare` node.
    /// Otherwise `left` already stands on its own.
    fn continue_comparison(&mut self, left: Expr) -> Result<Expr> {
        if let Some(op) = self.current_compare_op() {
            let span = left.span().merge(self.current().span);
            self.advance();
            let right = self.parse_expr()?;
            return Ok(Expr::Compare(Box::new(left), op, Box::new(right), span));
        }
        Ok(left)
    }

    fn current_compare_op(&self) -> Option<CompareOp> {
        Some(match self.current().kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::Ne => CompareOp::Ne,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Le => CompareOp::Le,
            TokenKind::Ge => CompareOp::Ge,
            _ => return None,
        })
    }

    // comparison := expr [ (= | <> | < | > | <= | >=) expr ]
    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_expr()?;
        self.continue_comparison(left)
    }

    // expr := term { (+|-) term }
    fn parse_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinArithOp::Add,
                TokenKind::Minus => BinArithOp::Sub,
                _ => break,
            };
            let span = self.current().span;
            self.advance();
            let right = self.parse_term()?;
            left = Expr::BinArith(Box::new(left), op, Box::new(right), span);
        }
        Ok(left)
    }

    // term := factor { (* | DIV | /) factor }
    fn parse_term(&mut self) -> Result<Expr> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinArithOp::Mul,
                TokenKind::Div => BinArithOp::IntDiv,
                TokenKind::Slash => BinArithOp::FloatDiv,
                _ => break,
            };
            let span = self.current().span;
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::BinArith(Box::new(left), op, Box::new(right), span);
        }
        Ok(left)
    }

    // factor := (+|-) factor
    //         | INTEGER_CONST | REAL_CONST
    //         | ( expr )
    //         | callOrVar
    fn parse_factor(&mut self) -> Result<Expr> {
        let span = self.current().span;
        match self.current().kind {
            TokenKind::Plus => {
                self.advance();
                let operand = self.parse_factor()?;
                Ok(Expr::UnaryArith(UnaryArithOp::Plus, Box::new(operand), span))
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_factor()?;
                Ok(Expr::UnaryArith(
                    UnaryArithOp::Minus,
                    Box::new(operand),
                    span,
                ))
            }
            TokenKind::IntegerConst(n) => {
                self.advance();
                Ok(Expr::Num(NumLit::Int(n), span))
            }
            TokenKind::RealConst(n) => {
                self.advance();
                Ok(Expr::Num(NumLit::Real(n), span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Id => self.parse_call_or_var(),
            found => Err(ParseError::UnexpectedToken {
                expected: "an expression".to_string(),
                found,
                span,
            }),
        }
    }

    // callOrVar := ID [ ( [ expr { , expr } ] ) ]
    //
    // One token of lookahead: an `ID` immediately followed by `(` is a
    // call, otherwise a variable reference.
    fn parse_call_or_var(&mut self) -> Result<Expr> {
        let (name, span) = self.expect_id()?;
        if self.check(TokenKind::LParen) {
            self.advance();
            let mut args = Vec::new();
            if !self.check(TokenKind::RParen) {
                args.push(self.parse_expr()?);
                while self.check(TokenKind::Comma) {
                    self.advance();
                    args.push(self.parse_expr()?);
                }
            }
            self.expect(TokenKind::RParen)?;
            Ok(Expr::Call(name, args, span))
        } else {
            Ok(Expr::Var(name, span))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Program {
        Parser::from_source(src).unwrap().parse_program().unwrap()
    }

    #[test]
    fn parses_minimal_program() {
        let program = parse("PROGRAM T; BEGIN END.");
        assert_eq!(program.name, "T");
        assert!(program.block.decls.is_empty());
    }

    #[test]
    fn parses_var_decl_group() {
        let program = parse("PROGRAM T; VAR a, b: INTEGER; BEGIN END.");
        assert_eq!(program.block.decls.len(), 2);
        match &program.block.decls[0] {
            Decl::Var(v) => {
                assert_eq!(v.name, "a");
                assert_eq!(v.type_name, "INTEGER");
            }
            _ => panic!("expected var decl"),
        }
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let program = parse("PROGRAM T; VAR r: INTEGER; BEGIN r := 2 + 3 * 4 END.");
        let Stmt::Compound(stmts) = &program.block.compound else {
            panic!()
        };
        match &stmts[0] {
            Stmt::Assign(_, Expr::BinArith(left, BinArithOp::Add, right, _), _) => {
                assert!(matches!(**left, Expr::Num(NumLit::Int(2), _)));
                assert!(matches!(**right, Expr::BinArith(_, BinArithOp::Mul, _, _)));
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn parses_function_call_vs_var() {
        let program = parse("PROGRAM T; VAR r: INTEGER; BEGIN r := Foo(1, 2) END.");
        let Stmt::Compound(stmts) = &program.block.compound else {
            panic!()
        };
        match &stmts[0] {
            Stmt::Assign(_, Expr::Call(name, args, _), _) => {
                assert_eq!(name, "Foo");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn parses_bare_var_without_parens() {
        let program = parse("PROGRAM T; VAR a, r: INTEGER; BEGIN r := a END.");
        let Stmt::Compound(stmts) = &program.block.compound else {
            panic!()
        };
        assert!(matches!(&stmts[0], Stmt::Assign(_, Expr::Var(_, _), _)));
    }

    #[test]
    fn parses_if_then_else_end() {
        let program = parse(
            "PROGRAM T; VAR r: INTEGER; BEGIN IF r > 0 THEN r := 1 ELSE r := 2 END END.",
        );
        let Stmt::Compound(stmts) = &program.block.compound else {
            panic!()
        };
        assert!(matches!(&stmts[0], Stmt::If(_, _, Some(_))));
    }

    #[test]
    fn parses_parenthesized_comparison_group() {
        let program = parse(
            "PROGRAM T; VAR a, b, c, d, r: INTEGER; BEGIN IF (a > b) AND (c < d) THEN r := 1 END END.",
        );
        let Stmt::Compound(stmts) = &program.block.compound else {
            panic!()
        };
        match &stmts[0] {
            Stmt::If(Expr::BoolBin(_, BoolOp::And, _, _), _, _) => {}
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn parses_parenthesized_arithmetic_operand_of_comparison() {
        let program =
            parse("PROGRAM T; VAR x, y, r: INTEGER; BEGIN IF (x + 1) > y THEN r := 1 END END.");
        let Stmt::Compound(stmts) = &program.block.compound else {
            panic!()
        };
        match &stmts[0] {
            Stmt::If(Expr::Compare(left, CompareOp::Gt, _, _), _, _) => {
                assert!(matches!(**left, Expr::BinArith(_, BinArithOp::Add, _, _)));
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn parses_for_to_and_downto() {
        let program = parse(
            "PROGRAM T; VAR i, s: INTEGER; BEGIN s := 0; FOR i := 5 DOWNTO 1 DO s := s + i END.",
        );
        let Stmt::Compound(stmts) = &program.block.compound else {
            panic!()
        };
        assert!(matches!(
            &stmts[1],
            Stmt::For(_, _, _, ForDirection::Downto, _, _)
        ));
    }

    #[test]
    fn rejects_two_statements_without_semicolon() {
        let err = Parser::from_source("PROGRAM T; VAR a: INTEGER; BEGIN a := 1 a := 2 END.")
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedInStatementList { .. }));
    }

    #[test]
    fn allows_trailing_statement_without_semicolon() {
        // No trailing ';' before END is fine -- ';' is a separator.
        parse("PROGRAM T; VAR a: INTEGER; BEGIN a := 1 END.");
    }

    #[test]
    fn parses_recursive_function_decl() {
        let program = parse(
            "PROGRAM T; VAR r: INTEGER; \
             FUNCTION Fact(n: INTEGER): INTEGER; \
             BEGIN IF n <= 1 THEN Fact := 1 ELSE Fact := n * Fact(n - 1) END END; \
             BEGIN r := Fact(5) END.",
        );
        assert_eq!(program.block.decls.len(), 2);
        match &program.block.decls[1] {
            Decl::Func(f) => {
                assert_eq!(f.name, "Fact");
                assert_eq!(f.params.len(), 1);
                assert_eq!(f.return_type, "INTEGER");
            }
            _ => panic!("expected func decl"),
        }
    }
}
