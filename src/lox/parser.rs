//! Recursive-descent parser for Lox.
//!
//! A `TokenQueue` trait over the token buffer (`peek`, `advance`, `next_is`,
//! `current_line`) and a `left_associative_level!` macro generating the
//! iterative precedence-climbing levels.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::diagnostics::{Diagnostic, Diagnostics, Location, Stage};

use super::ast::{Expr, FunctionDecl, Stmt};
use super::token::{Literal, Token, TokenKind};
use super::value::Value;

const MAX_ARGS: usize = 255;

/// A single "parse failed here" control transfer, caught at statement
/// boundaries by `synchronize`. Distinct from a diagnostic: the diagnostic
/// itself is pushed at the point of failure, this is just the unwind.
struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

/// Thin convenience trait over the parser's token buffer, implemented for
/// `VecDeque<Token>`.
trait TokenQueue {
	fn peek(&self) -> &Token;
	fn advance(&mut self) -> Token;
	fn is_at_end(&self) -> bool;
	fn next_is(&self, kind: TokenKind) -> bool;
	fn current_line(&self) -> usize;
}

impl TokenQueue for VecDeque<Token> {
	fn peek(&self) -> &Token {
		self.front().expect("token stream always ends with Eof")
	}

	fn advance(&mut self) -> Token {
		if self.len() > 1 { self.pop_front().expect("checked len above") } else { self.front().cloned().expect("eof") }
	}

	fn is_at_end(&self) -> bool {
		self.peek().kind == TokenKind::Eof
	}

	fn next_is(&self, kind: TokenKind) -> bool {
		self.peek().kind == kind
	}

	fn current_line(&self) -> usize {
		self.peek().line
	}
}

/// Parses a complete token stream into a list of top-level statements,
/// recovering from parse errors at statement boundaries and continuing so
/// a single run can report more than one diagnostic.
pub fn parse(mut tokens: VecDeque<Token>, diagnostics: &mut Diagnostics) -> Vec<Stmt> {
	let mut statements = Vec::new();
	while !tokens.is_at_end() {
		match declaration(&mut tokens, diagnostics) {
			Ok(statement) => statements.push(statement),
			Err(ParseError) => synchronize(&mut tokens),
		}
	}
	statements
}

fn error(tokens: &VecDeque<Token>, diagnostics: &mut Diagnostics, message: impl Into<String>) -> ParseError {
	let token = tokens.peek();
	let location = if token.kind == TokenKind::Eof { Location::EndOfFile } else { Location::Lexeme(token.lexeme.clone()) };
	diagnostics.push(Diagnostic::new(token.line, Stage::Parse, message).at(location));
	ParseError
}

fn expect(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics, kind: TokenKind, message: &str) -> ParseResult<Token> {
	if tokens.next_is(kind) {
		Ok(tokens.advance())
	} else {
		Err(error(tokens, diagnostics, message))
	}
}

fn matches(tokens: &mut VecDeque<Token>, kinds: &[TokenKind]) -> bool {
	if kinds.contains(&tokens.peek().kind) {
		tokens.advance();
		true
	} else {
		false
	}
}

fn synchronize(tokens: &mut VecDeque<Token>) {
	while !tokens.is_at_end() {
		let previous_semicolon = tokens.peek().kind == TokenKind::Semicolon;
		tokens.advance();
		if previous_semicolon {
			return;
		}
		if matches!(
			tokens.peek().kind,
			TokenKind::Class
				| TokenKind::Fun | TokenKind::Var
				| TokenKind::For | TokenKind::If
				| TokenKind::While | TokenKind::Print
				| TokenKind::Return
		) {
			return;
		}
	}
}

fn declaration(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	if matches(tokens, &[TokenKind::Class]) {
		return class_declaration(tokens, diagnostics);
	}
	if matches(tokens, &[TokenKind::Fun]) {
		return Ok(Stmt::Function(Rc::new(function(tokens, diagnostics, "function")?)));
	}
	if matches(tokens, &[TokenKind::Var]) {
		return var_declaration(tokens, diagnostics);
	}
	statement(tokens, diagnostics)
}

fn class_declaration(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	let name = expect(tokens, diagnostics, TokenKind::Identifier, "expected class name")?;

	let superclass = if matches(tokens, &[TokenKind::Less]) {
		let superclass_name = expect(tokens, diagnostics, TokenKind::Identifier, "expected superclass name")?;
		Some(Expr::variable(superclass_name))
	} else {
		None
	};

	expect(tokens, diagnostics, TokenKind::LeftBrace, "expected '{' before class body")?;
	let mut methods = Vec::new();
	while !tokens.next_is(TokenKind::RightBrace) && !tokens.is_at_end() {
		methods.push(Rc::new(function(tokens, diagnostics, "method")?));
	}
	expect(tokens, diagnostics, TokenKind::RightBrace, "expected '}' after class body")?;

	Ok(Stmt::Class { name, superclass, methods })
}

fn function(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics, kind: &str) -> ParseResult<FunctionDecl> {
	let name = expect(tokens, diagnostics, TokenKind::Identifier, &format!("expected {kind} name"))?;
	expect(tokens, diagnostics, TokenKind::LeftParen, &format!("expected '(' after {kind} name"))?;

	let mut params = Vec::new();
	if !tokens.next_is(TokenKind::RightParen) {
		loop {
			if params.len() >= MAX_ARGS {
				let _ = error(tokens, diagnostics, format!("can't have more than {MAX_ARGS} parameters"));
			}
			params.push(expect(tokens, diagnostics, TokenKind::Identifier, "expected parameter name")?);
			if !matches(tokens, &[TokenKind::Comma]) {
				break;
			}
		}
	}
	expect(tokens, diagnostics, TokenKind::RightParen, "expected ')' after parameters")?;

	expect(tokens, diagnostics, TokenKind::LeftBrace, &format!("expected '{{' before {kind} body"))?;
	let body = block(tokens, diagnostics)?;

	Ok(FunctionDecl { name, params, body })
}

fn var_declaration(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	let name = expect(tokens, diagnostics, TokenKind::Identifier, "expected variable name")?;
	let initializer =
		if matches(tokens, &[TokenKind::Equal]) { Some(expression(tokens, diagnostics)?) } else { None };
	expect(tokens, diagnostics, TokenKind::Semicolon, "expected ';' after variable declaration")?;
	Ok(Stmt::VarDecl { name, initializer })
}

fn statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	if matches(tokens, &[TokenKind::Print]) {
		return print_statement(tokens, diagnostics);
	}
	if matches(tokens, &[TokenKind::LeftBrace]) {
		return Ok(Stmt::Block(block(tokens, diagnostics)?));
	}
	if matches(tokens, &[TokenKind::If]) {
		return if_statement(tokens, diagnostics);
	}
	if matches(tokens, &[TokenKind::While]) {
		return while_statement(tokens, diagnostics);
	}
	if matches(tokens, &[TokenKind::For]) {
		return for_statement(tokens, diagnostics);
	}
	if tokens.next_is(TokenKind::Return) {
		return return_statement(tokens, diagnostics);
	}
	expression_statement(tokens, diagnostics)
}

fn print_statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	let value = expression(tokens, diagnostics)?;
	expect(tokens, diagnostics, TokenKind::Semicolon, "expected ';' after value")?;
	Ok(Stmt::Print(value))
}

fn return_statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	let keyword = tokens.advance();
	let value = if tokens.next_is(TokenKind::Semicolon) { None } else { Some(expression(tokens, diagnostics)?) };
	expect(tokens, diagnostics, TokenKind::Semicolon, "expected ';' after return value")?;
	Ok(Stmt::Return { keyword, value })
}

fn block(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Vec<Stmt>> {
	let mut statements = Vec::new();
	while !tokens.next_is(TokenKind::RightBrace) && !tokens.is_at_end() {
		match declaration(tokens, diagnostics) {
			Ok(statement) => statements.push(statement),
			Err(ParseError) => {
				synchronize(tokens);
			}
		}
	}
	expect(tokens, diagnostics, TokenKind::RightBrace, "expected '}' after block")?;
	Ok(statements)
}

fn if_statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	expect(tokens, diagnostics, TokenKind::LeftParen, "expected '(' after 'if'")?;
	let condition = expression(tokens, diagnostics)?;
	expect(tokens, diagnostics, TokenKind::RightParen, "expected ')' after if condition")?;
	let then_branch = Box::new(statement(tokens, diagnostics)?);
	let else_branch =
		if matches(tokens, &[TokenKind::Else]) { Some(Box::new(statement(tokens, diagnostics)?)) } else { None };
	Ok(Stmt::If { condition, then_branch, else_branch })
}

fn while_statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	expect(tokens, diagnostics, TokenKind::LeftParen, "expected '(' after 'while'")?;
	let condition = expression(tokens, diagnostics)?;
	expect(tokens, diagnostics, TokenKind::RightParen, "expected ')' after condition")?;
	let body = Box::new(statement(tokens, diagnostics)?);
	Ok(Stmt::While { condition, body })
}

/// Desugars `for (init; cond; incr) body` into a `Block` containing `init`
/// followed by a `While` whose body runs `incr` after the original body.
fn for_statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	expect(tokens, diagnostics, TokenKind::LeftParen, "expected '(' after 'for'")?;

	let initializer = if matches(tokens, &[TokenKind::Semicolon]) {
		None
	} else if matches(tokens, &[TokenKind::Var]) {
		Some(var_declaration(tokens, diagnostics)?)
	} else {
		Some(expression_statement(tokens, diagnostics)?)
	};

	let condition = if tokens.next_is(TokenKind::Semicolon) { None } else { Some(expression(tokens, diagnostics)?) };
	expect(tokens, diagnostics, TokenKind::Semicolon, "expected ';' after loop condition")?;

	let increment = if tokens.next_is(TokenKind::RightParen) { None } else { Some(expression(tokens, diagnostics)?) };
	expect(tokens, diagnostics, TokenKind::RightParen, "expected ')' after for clauses")?;

	let mut body = statement(tokens, diagnostics)?;

	if let Some(increment) = increment {
		body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
	}

	let condition = condition.unwrap_or_else(|| Expr::literal(Value::Bool(true)));
	body = Stmt::While { condition, body: Box::new(body) };

	if let Some(initializer) = initializer {
		body = Stmt::Block(vec![initializer, body]);
	}

	Ok(body)
}

fn expression_statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	let expr = expression(tokens, diagnostics)?;
	expect(tokens, diagnostics, TokenKind::Semicolon, "expected ';' after expression")?;
	Ok(Stmt::Expression(expr))
}

fn expression(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	assignment(tokens, diagnostics)
}

fn assignment(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	let expr = or(tokens, diagnostics)?;

	if tokens.next_is(TokenKind::Equal) {
		let equals_line = tokens.current_line();
		tokens.advance();
		let value = assignment(tokens, diagnostics)?;
		return match expr {
			Expr::Variable { name, .. } => Ok(Expr::assign(name, value)),
			Expr::Get { object, name, .. } => Ok(Expr::set(*object, name, value)),
			_ => {
				diagnostics.push(Diagnostic::new(equals_line, Stage::Parse, "invalid assignment target"));
				Ok(expr)
			}
		};
	}

	Ok(expr)
}

fn or(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	let mut expr = and(tokens, diagnostics)?;
	while tokens.next_is(TokenKind::Or) {
		let operator = tokens.advance();
		let right = and(tokens, diagnostics)?;
		expr = Expr::logical(expr, operator, right);
	}
	Ok(expr)
}

fn and(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	let mut expr = equality(tokens, diagnostics)?;
	while tokens.next_is(TokenKind::And) {
		let operator = tokens.advance();
		let right = equality(tokens, diagnostics)?;
		expr = Expr::logical(expr, operator, right);
	}
	Ok(expr)
}

/// Pops and returns the next token iff its kind is one of `kinds`.
fn take_if(tokens: &mut VecDeque<Token>, kinds: &[TokenKind]) -> Option<Token> {
	if kinds.contains(&tokens.peek().kind) { Some(tokens.advance()) } else { None }
}

/// Each binary precedence level below is intentionally left-associative
/// (iterative `while` loop), not a right-recursive call, so chains like
/// `a - b - c` parse as `(a - b) - c`.
macro_rules! left_associative_level {
	($name:ident, $next:ident, [$($kind:ident),+ $(,)?]) => {
		fn $name(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
			let mut expr = $next(tokens, diagnostics)?;
			while let Some(operator) = take_if(tokens, &[$(TokenKind::$kind),+]) {
				let right = $next(tokens, diagnostics)?;
				expr = Expr::binary(expr, operator, right);
			}
			Ok(expr)
		}
	};
}

left_associative_level!(equality, comparison, [BangEqual, EqualEqual]);
left_associative_level!(comparison, term, [Greater, GreaterEqual, Less, LessEqual]);
left_associative_level!(term, factor, [Minus, Plus]);
left_associative_level!(factor, unary, [Slash, Star]);

fn unary(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	if let Some(operator) = take_if(tokens, &[TokenKind::Bang, TokenKind::Minus]) {
		let right = unary(tokens, diagnostics)?;
		return Ok(Expr::unary(operator, right));
	}
	call(tokens, diagnostics)
}

fn call(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	let mut expr = primary(tokens, diagnostics)?;
	loop {
		if matches(tokens, &[TokenKind::LeftParen]) {
			expr = finish_call(tokens, diagnostics, expr)?;
		} else if matches(tokens, &[TokenKind::Dot]) {
			let name = expect(tokens, diagnostics, TokenKind::Identifier, "expected property name after '.'")?;
			expr = Expr::get(expr, name);
		} else {
			break;
		}
	}
	Ok(expr)
}

fn finish_call(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics, callee: Expr) -> ParseResult<Expr> {
	let mut arguments = Vec::new();
	if !tokens.next_is(TokenKind::RightParen) {
		loop {
			if arguments.len() >= MAX_ARGS {
				let _ = error(tokens, diagnostics, format!("can't have more than {MAX_ARGS} arguments"));
			}
			arguments.push(expression(tokens, diagnostics)?);
			if !matches(tokens, &[TokenKind::Comma]) {
				break;
			}
		}
	}
	let paren = expect(tokens, diagnostics, TokenKind::RightParen, "expected ')' after arguments")?;
	Ok(Expr::call(callee, paren, arguments))
}

fn primary(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	if matches(tokens, &[TokenKind::False]) {
		return Ok(Expr::literal(Value::Bool(false)));
	}
	if matches(tokens, &[TokenKind::True]) {
		return Ok(Expr::literal(Value::Bool(true)));
	}
	if matches(tokens, &[TokenKind::Nil]) {
		return Ok(Expr::literal(Value::Nil));
	}
	if tokens.next_is(TokenKind::Number) {
		let token = tokens.advance();
		let Literal::Number(value) = token.literal else { unreachable!("lexer always attaches a number literal") };
		return Ok(Expr::literal(Value::Number(value)));
	}
	if tokens.next_is(TokenKind::String) {
		let token = tokens.advance();
		let Literal::Str(value) = token.literal else { unreachable!("lexer always attaches a string literal") };
		return Ok(Expr::literal(Value::Str(value)));
	}
	if tokens.next_is(TokenKind::This) {
		return Ok(Expr::this(tokens.advance()));
	}
	if tokens.next_is(TokenKind::Super) {
		let keyword = tokens.advance();
		expect(tokens, diagnostics, TokenKind::Dot, "expected '.' after 'super'")?;
		let method = expect(tokens, diagnostics, TokenKind::Identifier, "expected superclass method name")?;
		return Ok(Expr::super_(keyword, method));
	}
	if tokens.next_is(TokenKind::Identifier) {
		return Ok(Expr::variable(tokens.advance()));
	}
	if matches(tokens, &[TokenKind::LeftParen]) {
		let expr = expression(tokens, diagnostics)?;
		expect(tokens, diagnostics, TokenKind::RightParen, "expected ')' after expression")?;
		return Ok(Expr::grouping(expr));
	}

	Err(error(tokens, diagnostics, "expected expression"))
}
