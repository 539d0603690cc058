//! A Pratt (precedence-climbing) parser that turns a [`Lexer`]'s token stream into a
//! [`Program`] plus an accumulated list of [`ParseError`]s (spec §4.2).

use crate::ast::{
    AssignOp, Block, Expr, HashLiteralPair, Identifier, InfixOp, PrefixOp, Program, Stmt,
};
use crate::error::ParseError;
use crate::token::{Lexer, Position, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Assign,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equals,
    LessGreater,
    Shift,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(kind: &TokenKind) -> Precedence {
    use TokenKind::*;
    match kind {
        Assign | PlusAssign | MinusAssign | AsteriskAssign | SlashAssign | PercentAssign => {
            Precedence::Assign
        }
        Or => Precedence::LogicalOr,
        And => Precedence::LogicalAnd,
        BitOr => Precedence::BitwiseOr,
        BitXor => Precedence::BitwiseXor,
        BitAnd => Precedence::BitwiseAnd,
        Eq | NotEq => Precedence::Equals,
        Lt | Gt | LtEq | GtEq => Precedence::LessGreater,
        Shl | Shr => Precedence::Shift,
        Plus | Minus => Precedence::Sum,
        Asterisk | Slash | Percent => Precedence::Product,
        LParen => Precedence::Call,
        LBracket => Precedence::Index,
        Dot => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// A Pratt parser over a lazy token stream. Holds the current and lookahead token plus an
/// accumulating list of diagnostics; it never panics or aborts early (spec §4.2).
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Self {
            lexer,
            cur_token,
            peek_token,
            errors: Vec::new(),
        }
    }

    fn next_token(&mut self) {
        std::mem::swap(&mut self.cur_token, &mut self.peek_token);
        self.peek_token = self.lexer.next_token();
    }

    fn cur_is(&self, kind: &TokenKind) -> bool {
        &self.cur_token.kind == kind
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        &self.peek_token.kind == kind
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(&kind) {
            self.next_token();
            true
        } else {
            self.errors.push(ParseError::expected_token(
                &format!("{kind:?}"),
                &format!("{:?}", self.peek_token.kind),
                self.peek_token.position,
            ));
            false
        }
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek_is(&TokenKind::Semicolon) {
            self.next_token();
        }
    }

    /// Parses the whole token stream. Total: always returns a program plus an error list,
    /// never panics (spec §8 "parsing is total").
    pub fn parse_program(mut self) -> (Program, Vec<ParseError>) {
        let mut statements = Vec::new();
        while !self.cur_is(&TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }
        (statements, self.errors)
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.cur_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Func => self.parse_function_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Dot => self.parse_instruction_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_identifier_token(&self) -> Identifier {
        Identifier {
            position: self.cur_token.position,
            name: self.cur_token.literal.clone(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Stmt> {
        let position = self.cur_token.position;
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = self.parse_identifier_token();
        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Some(Stmt::Let {
            position,
            name,
            value,
        })
    }

    fn parse_function_statement(&mut self) -> Option<Stmt> {
        let position = self.cur_token.position;
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = self.parse_identifier_token();
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        let params = self.parse_function_params()?;
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_statement();
        Some(Stmt::Function {
            position,
            name,
            params,
            body,
        })
    }

    fn parse_function_params(&mut self) -> Option<Vec<Identifier>> {
        let mut params = Vec::new();
        if self.peek_is(&TokenKind::RParen) {
            self.next_token();
            return Some(params);
        }
        self.next_token();
        params.push(self.parse_identifier_token());
        while self.peek_is(&TokenKind::Comma) {
            self.next_token();
            self.next_token();
            params.push(self.parse_identifier_token());
        }
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(params)
    }

    fn parse_return_statement(&mut self) -> Option<Stmt> {
        let position = self.cur_token.position;
        self.next_token();

        if self.cur_is(&TokenKind::Semicolon) || self.cur_is(&TokenKind::RBrace) {
            return Some(Stmt::Return {
                position,
                value: None,
            });
        }

        // A bare `return` with nothing following it (e.g. at end of block) has no prefix parse
        // function for whatever comes next; we try the parse, and if it failed purely because
        // there was no expression to parse, undo that diagnostic and treat it as a void return.
        let errors_before = self.errors.len();
        let value = self.parse_expression(Precedence::Lowest);
        let value = match value {
            Some(v) => Some(v),
            None if self.errors.len() == errors_before + 1 => {
                self.errors.pop();
                None
            }
            None => None,
        };
        self.skip_optional_semicolon();
        Some(Stmt::Return { position, value })
    }

    fn parse_if_statement(&mut self) -> Option<Stmt> {
        let position = self.cur_token.position;
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_is(&TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Stmt::If {
            position,
            condition,
            consequence,
            alternative,
        })
    }

    fn parse_for_statement(&mut self) -> Option<Stmt> {
        let position = self.cur_token.position;
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let first = self.parse_identifier_token();

        let (index, value) = if self.peek_is(&TokenKind::Comma) {
            self.next_token();
            if !self.expect_peek(TokenKind::Ident) {
                return None;
            }
            let second = self.parse_identifier_token();
            (Some(first), second)
        } else {
            (None, first)
        };

        if !self.expect_peek(TokenKind::In) {
            return None;
        }
        self.next_token();
        let container = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_statement();

        Some(Stmt::For {
            position,
            value,
            index,
            container,
            body,
        })
    }

    fn parse_instruction_statement(&mut self) -> Option<Stmt> {
        let position = self.cur_token.position;
        let word = self.cur_token.literal.trim().to_string();
        Some(Stmt::Instruction { position, word })
    }

    fn parse_block_statement(&mut self) -> Block {
        let position = self.cur_token.position;
        let mut statements = Vec::new();
        self.next_token();
        while !self.cur_is(&TokenKind::RBrace) && !self.cur_is(&TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }
        Block {
            position,
            statements,
        }
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let position = self.cur_token.position;
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Some(Stmt::Expression { position, expr })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(&TokenKind::Semicolon) && precedence < precedence_of(&self.peek_token.kind) {
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.cur_token.kind {
            TokenKind::Ident => Some(Expr::Identifier(self.parse_identifier_token())),
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::Float => self.parse_float_literal(),
            TokenKind::True | TokenKind::False => Some(self.parse_boolean_literal()),
            TokenKind::Str => Some(self.parse_string_literal()),
            TokenKind::Null => Some(Expr::NullLiteral {
                position: self.cur_token.position,
            }),
            TokenKind::Bang => self.parse_prefix_expression(PrefixOp::Bang),
            TokenKind::Minus => self.parse_prefix_expression(PrefixOp::Minus),
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_hash_literal(),
            _ => {
                self.errors.push(ParseError::no_prefix_parse_fn(
                    &format!("{:?}", self.cur_token.kind),
                    self.cur_token.position,
                ));
                None
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expr> {
        let position = self.cur_token.position;
        match self.cur_token.literal.parse::<i64>() {
            Ok(value) => Some(Expr::IntegerLiteral { position, value }),
            Err(_) => {
                self.errors.push(ParseError::new(
                    format!("could not parse {} as integer", self.cur_token.literal),
                    position,
                ));
                None
            }
        }
    }

    fn parse_float_literal(&mut self) -> Option<Expr> {
        let position = self.cur_token.position;
        match self.cur_token.literal.parse::<f64>() {
            Ok(value) => Some(Expr::FloatLiteral { position, value }),
            Err(_) => {
                self.errors.push(ParseError::new(
                    format!("could not parse {} as float", self.cur_token.literal),
                    position,
                ));
                None
            }
        }
    }

    fn parse_boolean_literal(&mut self) -> Expr {
        Expr::BooleanLiteral {
            position: self.cur_token.position,
            value: self.cur_is(&TokenKind::True),
        }
    }

    fn parse_string_literal(&mut self) -> Expr {
        Expr::StringLiteral {
            position: self.cur_token.position,
            value: self.cur_token.literal.clone(),
        }
    }

    fn parse_prefix_expression(&mut self, op: PrefixOp) -> Option<Expr> {
        let position = self.cur_token.position;
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::Prefix {
            position,
            op,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expr> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(expr)
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
        let mut list = Vec::new();
        if self.peek_is(&end) {
            self.next_token();
            return Some(list);
        }
        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(&TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_array_literal(&mut self) -> Option<Expr> {
        let position = self.cur_token.position;
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        Some(Expr::ArrayLiteral { position, elements })
    }

    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let position = self.cur_token.position;
        let mut pairs = Vec::new();
        while !self.peek_is(&TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push(HashLiteralPair { key, value });
            if !self.peek_is(&TokenKind::RBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }
        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }
        Some(Expr::HashLiteral { position, pairs })
    }

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        match self.cur_token.kind {
            TokenKind::LParen => self.parse_call_expression(left),
            TokenKind::LBracket => self.parse_index_expression(left),
            TokenKind::Dot => self.parse_method_call(left),
            TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::AsteriskAssign
            | TokenKind::SlashAssign
            | TokenKind::PercentAssign => self.parse_assignment_expression(left),
            _ => self.parse_infix_expression(left),
        }
    }

    fn parse_call_expression(&mut self, callee: Expr) -> Option<Expr> {
        let position = self.cur_token.position;
        let args = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expr::Call {
            position,
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_index_expression(&mut self, collection: Expr) -> Option<Expr> {
        let position = self.cur_token.position;
        self.next_token();
        let key = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }
        Some(Expr::Index {
            position,
            collection: Box::new(collection),
            key: Box::new(key),
        })
    }

    fn parse_assignment_expression(&mut self, target: Expr) -> Option<Expr> {
        let position = self.cur_token.position;
        let op = match self.cur_token.kind {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::PlusAssign => AssignOp::AddAssign,
            TokenKind::MinusAssign => AssignOp::SubAssign,
            TokenKind::AsteriskAssign => AssignOp::MulAssign,
            TokenKind::SlashAssign => AssignOp::DivAssign,
            TokenKind::PercentAssign => AssignOp::ModAssign,
            _ => unreachable!("parse_infix only dispatches assignment tokens here"),
        };
        self.next_token();
        // ASSIGN is right-associative: parse the RHS at one precedence below itself.
        let value = self.parse_expression(Precedence::Assign.one_below())?;
        Some(Expr::Assignment {
            position,
            target: Box::new(target),
            op,
            value: Box::new(value),
        })
    }

    fn parse_infix_expression(&mut self, left: Expr) -> Option<Expr> {
        let position = self.cur_token.position;
        let op = match self.cur_token.kind {
            TokenKind::Plus => InfixOp::Add,
            TokenKind::Minus => InfixOp::Sub,
            TokenKind::Asterisk => InfixOp::Mul,
            TokenKind::Slash => InfixOp::Div,
            TokenKind::Percent => InfixOp::Mod,
            TokenKind::Eq => InfixOp::Eq,
            TokenKind::NotEq => InfixOp::NotEq,
            TokenKind::Lt => InfixOp::Lt,
            TokenKind::Gt => InfixOp::Gt,
            TokenKind::LtEq => InfixOp::LtEq,
            TokenKind::GtEq => InfixOp::GtEq,
            TokenKind::And => InfixOp::And,
            TokenKind::Or => InfixOp::Or,
            TokenKind::BitAnd => InfixOp::BitAnd,
            TokenKind::BitOr => InfixOp::BitOr,
            TokenKind::BitXor => InfixOp::BitXor,
            TokenKind::Shl => InfixOp::Shl,
            TokenKind::Shr => InfixOp::Shr,
            ref other => {
                self.errors.push(ParseError::new(
                    format!("unexpected infix token {other:?}"),
                    position,
                ));
                return None;
            }
        };
        let precedence = precedence_of(&self.cur_token.kind);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expr::Infix {
            position,
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Parses `obj.method(args)`. The lexer has no special-cased dot-for-method-call rule (spec
    /// §4.1: *every* `.` reads to end-of-line as one instruction token); when a `.` shows up in
    /// infix position instead of starting a statement, its literal holds the call expression
    /// text verbatim (`method(args)`), which we re-lex and re-parse here.
    fn parse_method_call(&mut self, receiver: Expr) -> Option<Expr> {
        let position = self.cur_token.position;
        let call_source = self.cur_token.literal.clone();

        let sub = Parser::new(&call_source);
        let (mut stmts, mut errors) = sub.parse_program();
        if stmts.len() != 1 || !errors.is_empty() {
            self.errors.append(&mut errors);
            self.errors.push(ParseError::new(
                format!("method call must be of the form method(args), got '.{call_source}'"),
                position,
            ));
            return None;
        }
        let expr = match stmts.remove(0) {
            Stmt::Expression { expr, .. } => expr,
            _ => {
                self.errors.push(ParseError::new(
                    format!("method call must be of the form method(args), got '.{call_source}'"),
                    position,
                ));
                return None;
            }
        };
        match expr {
            Expr::Call { callee, args, .. } => {
                let method = match *callee {
                    Expr::Identifier(ident) => ident.name,
                    _ => {
                        self.errors.push(ParseError::new(
                            format!("method call must name a method, got '.{call_source}'"),
                            position,
                        ));
                        return None;
                    }
                };
                Some(Expr::MethodCall {
                    position,
                    receiver: Box::new(receiver),
                    method,
                    args,
                })
            }
            _ => {
                self.errors.push(ParseError::new(
                    format!("method call must be of the form method(args), got '.{call_source}'"),
                    position,
                ));
                None
            }
        }
    }
}

impl Precedence {
    /// One level below `self`, used to make ASSIGN right-associative: the RHS of `=` is parsed
    /// at a precedence that still lets another ASSIGN bind to it (`a = b = c` reads as
    /// `a = (b = c)`).
    fn one_below(self) -> Precedence {
        match self {
            Precedence::Assign => Precedence::Lowest,
            other => other,
        }
    }
}

pub fn parse_program(input: &str) -> (Program, Vec<ParseError>) {
    Parser::new(input).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_let_statement() {
        let (program, errors) = parse_program("let x = 5;");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(program.len(), 1);
        assert_eq!(program[0].to_string(), "let x = 5;");
    }

    #[test]
    fn parses_operator_precedence() {
        let (program, errors) = parse_program("a + b * c == d && e || f;");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(
            program[0].to_string(),
            "((((a + (b * c)) == d) && e) || f);"
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        let (program, errors) = parse_program("a = b = 1;");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(program[0].to_string(), "(a = (b = 1));");
    }

    #[test]
    fn parses_function_and_call() {
        let (program, errors) = parse_program("func add(a, b) { return a + b; } add(1, 2);");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(program.len(), 2);
        assert_eq!(program[0].to_string(), "func add(a, b) { return (a + b); }");
        assert_eq!(program[1].to_string(), "add(1, 2);");
    }

    #[test]
    fn parses_for_with_two_binders() {
        let (program, errors) = parse_program("for i, v in arr { v; }");
        assert!(errors.is_empty(), "{errors:?}");
        match &program[0] {
            Stmt::For { value, index, .. } => {
                assert_eq!(value.name, "v");
                assert_eq!(index.as_ref().unwrap().name, "i");
            }
            other => panic!("expected for statement, got {other:?}"),
        }
    }

    #[test]
    fn void_return_has_no_value() {
        let (program, errors) = parse_program("func f() { return; }");
        assert!(errors.is_empty(), "{errors:?}");
        match &program[0] {
            Stmt::Function { body, .. } => match &body.statements[0] {
                Stmt::Return { value, .. } => assert!(value.is_none()),
                other => panic!("expected return, got {other:?}"),
            },
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn void_return_at_end_of_block_with_no_trailing_semicolon() {
        let (program, errors) = parse_program("func f() { return }");
        assert!(errors.is_empty(), "{errors:?}");
        match &program[0] {
            Stmt::Function { body, .. } => match &body.statements[0] {
                Stmt::Return { value, .. } => assert!(value.is_none()),
                other => panic!("expected return, got {other:?}"),
            },
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn method_call_parses_receiver_method_and_args() {
        let (program, errors) = parse_program("arr.isEmpty();");
        assert!(errors.is_empty(), "{errors:?}");
        match &program[0] {
            Stmt::Expression { expr, .. } => match expr {
                Expr::MethodCall {
                    receiver,
                    method,
                    args,
                    ..
                } => {
                    assert_eq!(receiver.to_string(), "arr");
                    assert_eq!(method, "isEmpty");
                    assert!(args.is_empty());
                }
                other => panic!("expected method call, got {other:?}"),
            },
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn dot_instruction_statement() {
        let (program, errors) = parse_program(".quit");
        assert!(errors.is_empty(), "{errors:?}");
        match &program[0] {
            Stmt::Instruction { word, .. } => assert_eq!(word, "quit"),
            other => panic!("expected instruction, got {other:?}"),
        }
    }

    #[test]
    fn accumulates_multiple_errors_without_stopping() {
        let (_, errors) = parse_program("let = 5; let x 10;");
        assert!(errors.len() >= 2, "{errors:?}");
    }

    #[test]
    fn array_and_hash_literals() {
        let (program, errors) = parse_program("[1, 2, 3]; {\"a\": 1, \"b\": 2};");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(program.len(), 2);
    }
}
