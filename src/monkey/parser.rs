//! Pratt parser for Monkey.
//!
//! Each token kind that can begin an expression maps to a prefix handler,
//! and each infix operator maps to a handler keyed by its precedence. The
//! mapping is expressed as two small dispatch functions (`prefix_fn`/
//! `infix_fn`) rather than runtime-constructed hash maps, since it is fixed
//! at compile time.

use std::collections::VecDeque;

use crate::diagnostics::{Diagnostic, Diagnostics, Location, Stage};

use super::ast::{Expr, Stmt};
use super::token::{Token, TokenKind};

struct ParseError;
type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
	Lowest,
	Equals,
	LessGreater,
	Sum,
	Product,
	Prefix,
	Call,
}

fn precedence_of(kind: TokenKind) -> Precedence {
	match kind {
		TokenKind::Equal | TokenKind::NotEqual => Precedence::Equals,
		TokenKind::LessThan | TokenKind::GreaterThan => Precedence::LessGreater,
		TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
		TokenKind::Slash | TokenKind::Asterisk => Precedence::Product,
		TokenKind::LeftParen => Precedence::Call,
		_ => Precedence::Lowest,
	}
}

trait TokenQueue {
	fn peek(&self) -> &Token;
	fn advance(&mut self) -> Token;
	fn is_at_end(&self) -> bool;
	fn next_is(&self, kind: TokenKind) -> bool;
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
}

fn error(tokens: &VecDeque<Token>, diagnostics: &mut Diagnostics, message: impl Into<String>) -> ParseError {
	let token = tokens.peek();
	let location = if token.kind == TokenKind::Eof { Location::EndOfFile } else { Location::Lexeme(token.lexeme.clone()) };
	diagnostics.push(Diagnostic::new(token.line, Stage::Parse, message).at(location));
	ParseError
}

fn expect(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics, kind: TokenKind, message: &str) -> ParseResult<Token> {
	if tokens.next_is(kind) { Ok(tokens.advance()) } else { Err(error(tokens, diagnostics, message)) }
}

/// Parses the whole program, recovering at the next statement (after a
/// `;`, or when a parse error leaves the parser stuck mid-statement by
/// simply skipping the offending token) so later statements still get a
/// chance to parse.
pub fn parse(mut tokens: VecDeque<Token>, diagnostics: &mut Diagnostics) -> Vec<Stmt> {
	let mut statements = Vec::new();
	while !tokens.is_at_end() {
		match statement(&mut tokens, diagnostics) {
			Ok(stmt) => statements.push(stmt),
			Err(ParseError) => {
				while !tokens.is_at_end() && !tokens.next_is(TokenKind::Semicolon) {
					tokens.advance();
				}
				if tokens.next_is(TokenKind::Semicolon) {
					tokens.advance();
				}
			}
		}
	}
	statements
}

fn statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	match tokens.peek().kind {
		TokenKind::Let => let_statement(tokens, diagnostics),
		TokenKind::Return => return_statement(tokens, diagnostics),
		_ => expression_statement(tokens, diagnostics),
	}
}

fn let_statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	tokens.advance();
	let name = expect(tokens, diagnostics, TokenKind::Ident, "expected identifier after 'let'")?;
	expect(tokens, diagnostics, TokenKind::Assign, "expected '=' after let binding name")?;
	let value = expression(tokens, diagnostics, Precedence::Lowest)?;
	if tokens.next_is(TokenKind::Semicolon) {
		tokens.advance();
	}
	Ok(Stmt::Let { name, value })
}

fn return_statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	tokens.advance();
	let value = if tokens.next_is(TokenKind::Semicolon) {
		Expr::Nil
	} else {
		expression(tokens, diagnostics, Precedence::Lowest)?
	};
	if tokens.next_is(TokenKind::Semicolon) {
		tokens.advance();
	}
	Ok(Stmt::Return { value })
}

fn expression_statement(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
	let expr = expression(tokens, diagnostics, Precedence::Lowest)?;
	if tokens.next_is(TokenKind::Semicolon) {
		tokens.advance();
	}
	Ok(Stmt::Expression(expr))
}

fn block(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Vec<Stmt>> {
	expect(tokens, diagnostics, TokenKind::LeftBrace, "expected '{'")?;
	let mut statements = Vec::new();
	while !tokens.next_is(TokenKind::RightBrace) && !tokens.is_at_end() {
		statements.push(statement(tokens, diagnostics)?);
	}
	expect(tokens, diagnostics, TokenKind::RightBrace, "expected '}'")?;
	Ok(statements)
}

fn expression(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics, precedence: Precedence) -> ParseResult<Expr> {
	let Some(prefix) = prefix_fn(tokens.peek().kind) else {
		return Err(error(tokens, diagnostics, format!("no prefix parse function for '{}'", tokens.peek().kind)));
	};
	let mut left = prefix(tokens, diagnostics)?;

	while !tokens.next_is(TokenKind::Semicolon) && precedence < precedence_of(tokens.peek().kind) {
		let Some(infix) = infix_fn(tokens.peek().kind) else { break };
		left = infix(tokens, diagnostics, left)?;
	}

	Ok(left)
}

type PrefixFn = fn(&mut VecDeque<Token>, &mut Diagnostics) -> ParseResult<Expr>;
type InfixFn = fn(&mut VecDeque<Token>, &mut Diagnostics, Expr) -> ParseResult<Expr>;

fn prefix_fn(kind: TokenKind) -> Option<PrefixFn> {
	match kind {
		TokenKind::Ident => Some(parse_identifier),
		TokenKind::Int => Some(parse_integer),
		TokenKind::Str => Some(parse_string),
		TokenKind::True | TokenKind::False => Some(parse_boolean),
		TokenKind::Bang | TokenKind::Minus => Some(parse_prefix),
		TokenKind::LeftParen => Some(parse_grouped),
		TokenKind::If => Some(parse_if),
		TokenKind::Function => Some(parse_function_literal),
		_ => None,
	}
}

fn infix_fn(kind: TokenKind) -> Option<InfixFn> {
	match kind {
		TokenKind::Plus
		| TokenKind::Minus
		| TokenKind::Slash
		| TokenKind::Asterisk
		| TokenKind::Equal
		| TokenKind::NotEqual
		| TokenKind::LessThan
		| TokenKind::GreaterThan => Some(parse_infix),
		TokenKind::LeftParen => Some(parse_call),
		_ => None,
	}
}

fn parse_identifier(tokens: &mut VecDeque<Token>, _diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	Ok(Expr::Identifier(tokens.advance()))
}

fn parse_integer(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	let token = tokens.advance();
	match token.lexeme.parse::<i64>() {
		Ok(value) => Ok(Expr::IntegerLiteral(value)),
		Err(_) => Err(error(tokens, diagnostics, format!("could not parse '{}' as an integer", token.lexeme))),
	}
}

fn parse_string(tokens: &mut VecDeque<Token>, _diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	let token = tokens.advance();
	Ok(Expr::StringLiteral(token.lexeme.trim_matches('"').to_owned()))
}

fn parse_boolean(tokens: &mut VecDeque<Token>, _diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	Ok(Expr::Boolean(tokens.advance().kind == TokenKind::True))
}

fn parse_prefix(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	let operator = tokens.advance();
	let right = expression(tokens, diagnostics, Precedence::Prefix)?;
	Ok(Expr::Prefix { operator, right: Box::new(right) })
}

fn parse_infix(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics, left: Expr) -> ParseResult<Expr> {
	let operator = tokens.advance();
	let precedence = precedence_of(operator.kind);
	let right = expression(tokens, diagnostics, precedence)?;
	Ok(Expr::Infix { left: Box::new(left), operator, right: Box::new(right) })
}

fn parse_grouped(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	tokens.advance();
	let expr = expression(tokens, diagnostics, Precedence::Lowest)?;
	expect(tokens, diagnostics, TokenKind::RightParen, "expected ')' after expression")?;
	Ok(expr)
}

fn parse_if(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	tokens.advance();
	expect(tokens, diagnostics, TokenKind::LeftParen, "expected '(' after 'if'")?;
	let condition = expression(tokens, diagnostics, Precedence::Lowest)?;
	expect(tokens, diagnostics, TokenKind::RightParen, "expected ')' after condition")?;
	let consequence = block(tokens, diagnostics)?;
	let alternative =
		if tokens.next_is(TokenKind::Else) {
			tokens.advance();
			Some(block(tokens, diagnostics)?)
		} else {
			None
		};
	Ok(Expr::If { condition: Box::new(condition), consequence, alternative })
}

fn parse_function_literal(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics) -> ParseResult<Expr> {
	tokens.advance();
	expect(tokens, diagnostics, TokenKind::LeftParen, "expected '(' after 'fn'")?;
	let mut params = Vec::new();
	if !tokens.next_is(TokenKind::RightParen) {
		loop {
			params.push(expect(tokens, diagnostics, TokenKind::Ident, "expected parameter name")?);
			if tokens.next_is(TokenKind::Comma) {
				tokens.advance();
			} else {
				break;
			}
		}
	}
	expect(tokens, diagnostics, TokenKind::RightParen, "expected ')' after parameters")?;
	let body = block(tokens, diagnostics)?;
	Ok(Expr::FunctionLiteral { params, body })
}

fn parse_call(tokens: &mut VecDeque<Token>, diagnostics: &mut Diagnostics, callee: Expr) -> ParseResult<Expr> {
	tokens.advance();
	let mut arguments = Vec::new();
	if !tokens.next_is(TokenKind::RightParen) {
		loop {
			arguments.push(expression(tokens, diagnostics, Precedence::Lowest)?);
			if tokens.next_is(TokenKind::Comma) {
				tokens.advance();
			} else {
				break;
			}
		}
	}
	expect(tokens, diagnostics, TokenKind::RightParen, "expected ')' after arguments")?;
	Ok(Expr::Call { callee: Box::new(callee), arguments })
}
