//! Converts Monkey source text into a token stream. Same priority-ordered
//! matching idiom as `lox::lexer` (see that module's doc comment); strings
//! get the same hand-written "no interior quote" scan rather than a regex,
//! so an unterminated string can be reported instead of silently failing
//! to match.

use std::collections::VecDeque;

use strum::IntoEnumIterator;

use crate::diagnostics::{Diagnostic, Diagnostics, Stage};

use super::token::{Token, TokenKind};

fn find_match(remaining: &str) -> Option<(TokenKind, &str)> {
	for kind in TokenKind::iter() {
		if matches!(kind, TokenKind::Illegal | TokenKind::Eof) {
			continue;
		}
		if let Some(found) = kind.pattern().find(remaining) {
			if found.start() == 0 {
				return Some((kind, found.as_str()));
			}
		}
	}
	None
}

pub fn tokenize(source: &str, diagnostics: &mut Diagnostics) -> VecDeque<Token> {
	let mut tokens = VecDeque::new();
	let mut remaining = source;
	let mut line = 1usize;

	while !remaining.is_empty() {
		if remaining.starts_with('"') {
			match remaining[1..].find('"') {
				Some(end) => {
					let lexeme = &remaining[..=end + 1];
					line += lexeme.matches('\n').count();
					tokens.push_back(Token { kind: TokenKind::Str, lexeme: lexeme.to_owned(), line });
					remaining = &remaining[lexeme.len()..];
				}
				None => {
					diagnostics.push(Diagnostic::new(line, Stage::Lex, "unterminated string"));
					remaining = "";
				}
			}
			continue;
		}

		let Some((kind, lexeme)) = find_match(remaining) else {
			let bad = remaining.chars().next().unwrap_or('?');
			diagnostics.push(Diagnostic::new(line, Stage::Lex, format!("unexpected character '{bad}'")));
			remaining = &remaining[bad.len_utf8()..];
			continue;
		};

		line += lexeme.matches('\n').count();
		if !kind.is_trivia() {
			tokens.push_back(Token { kind, lexeme: lexeme.to_owned(), line });
		}
		remaining = &remaining[lexeme.len()..];
	}

	tokens.push_back(Token::eof(line));
	tokens
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(source: &str) -> Vec<TokenKind> {
		let mut diagnostics = Diagnostics::new();
		tokenize(source, &mut diagnostics).into_iter().map(|t| t.kind).collect()
	}

	#[test]
	fn let_statement_tokens() {
		assert_eq!(kinds("let five = 5;"), vec![
			TokenKind::Let,
			TokenKind::Ident,
			TokenKind::Assign,
			TokenKind::Int,
			TokenKind::Semicolon,
			TokenKind::Eof,
		]);
	}

	#[test]
	fn equality_operators_win_over_prefixes() {
		assert_eq!(kinds("== = != !"), vec![
			TokenKind::Equal,
			TokenKind::Assign,
			TokenKind::NotEqual,
			TokenKind::Bang,
			TokenKind::Eof,
		]);
	}
}
