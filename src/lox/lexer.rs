//! Converts Lox source text into a token stream.
//!
//! Each [`TokenKind`] owns a pattern, and at every position we try each
//! kind (via `strum`'s `IntoEnumIterator`) in declaration order, taking the
//! first match — "maximal munch by priority", not "maximal munch by
//! length".

use std::collections::VecDeque;

use strum::IntoEnumIterator;

use crate::diagnostics::{Diagnostic, Diagnostics, Stage};

use super::token::{Literal, Token, TokenKind};

/// Finds the token kind (and matched text) that recognizes the start of
/// `remaining`, trying each kind in declaration order.
fn find_match(remaining: &str) -> Option<(TokenKind, &str)> {
	for kind in TokenKind::iter() {
		if kind == TokenKind::Eof {
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

/// Tokenizes `source`, appending a trailing `Eof` token. Unrecognized
/// characters and unterminated strings are reported as diagnostics and
/// skipped so the rest of the file can still be scanned.
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
					let literal = Literal::Str(lexeme.trim_matches('"').to_owned());
					tokens.push_back(Token { kind: TokenKind::String, lexeme: lexeme.to_owned(), literal, line });
					remaining = &remaining[lexeme.len()..];
				}
				None => {
					diagnostics.push(Diagnostic::new(line, Stage::Lex, "unterminated string"));
					line += remaining.matches('\n').count();
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
			let literal = match kind {
				TokenKind::Number => Literal::Number(lexeme.parse().unwrap_or(0.0)),
				_ => Literal::None,
			};
			tokens.push_back(Token { kind, lexeme: lexeme.to_owned(), literal, line });
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
	fn ends_with_eof() {
		assert_eq!(kinds(""), vec![TokenKind::Eof]);
		assert_eq!(*kinds("1").last().unwrap(), TokenKind::Eof);
	}

	#[test]
	fn two_char_operators_win_over_prefixes() {
		assert_eq!(kinds("!= ! == = <= < >= >"), vec![
			TokenKind::BangEqual,
			TokenKind::Bang,
			TokenKind::EqualEqual,
			TokenKind::Equal,
			TokenKind::LessEqual,
			TokenKind::Less,
			TokenKind::GreaterEqual,
			TokenKind::Greater,
			TokenKind::Eof,
		]);
	}

	#[test]
	fn keywords_win_over_identifiers() {
		assert_eq!(kinds("class notaclass"), vec![TokenKind::Class, TokenKind::Identifier, TokenKind::Eof]);
	}

	#[test]
	fn comment_skipped_slash_kept() {
		assert_eq!(kinds("// hi\n/"), vec![TokenKind::Slash, TokenKind::Eof]);
	}

	#[test]
	fn unterminated_string_reported() {
		let mut diagnostics = Diagnostics::new();
		let tokens = tokenize("\"abc", &mut diagnostics);
		assert!(diagnostics.had_static_error());
		assert_eq!(tokens.len(), 1);
	}

	#[test]
	fn number_literal_payload() {
		let mut diagnostics = Diagnostics::new();
		let tokens = tokenize("3.5", &mut diagnostics);
		assert_eq!(tokens.front().unwrap().literal, Literal::Number(3.5));
	}
}
