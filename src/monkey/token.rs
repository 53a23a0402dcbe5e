//! Token types for the Monkey pipeline, sharing the regex-per-variant
//! lexer idiom with the Lox pipeline's `token.rs` but with its own closed
//! token set.

use convert_case::{Case, Casing};
use regex_macro::regex;
use std::fmt;
use strum_macros::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum TokenKind {
	Whitespace,
	LineComment,

	Assign,
	Equal,
	NotEqual,
	Bang,
	Plus,
	Minus,
	Slash,
	Asterisk,
	LessThan,
	GreaterThan,

	Comma,
	Semicolon,
	LeftParen,
	RightParen,
	LeftBrace,
	RightBrace,

	Function,
	Let,
	True,
	False,
	If,
	Else,
	Return,

	Ident,
	Int,
	Str,

	Illegal,
	Eof,
}

impl TokenKind {
	#[must_use]
	pub fn pattern(self) -> &'static regex_macro::Regex {
		match self {
			Self::Whitespace => regex!(r"^[ \t\r\n]+"),
			Self::LineComment => regex!(r"^//[^\n]*"),

			Self::Equal => regex!(r"^=="),
			Self::Assign => regex!(r"^="),
			Self::NotEqual => regex!(r"^!="),
			Self::Bang => regex!(r"^!"),
			Self::Plus => regex!(r"^\+"),
			Self::Minus => regex!(r"^-"),
			Self::Slash => regex!(r"^/"),
			Self::Asterisk => regex!(r"^\*"),
			Self::LessThan => regex!(r"^<"),
			Self::GreaterThan => regex!(r"^>"),

			Self::Comma => regex!(r"^,"),
			Self::Semicolon => regex!(r"^;"),
			Self::LeftParen => regex!(r"^\("),
			Self::RightParen => regex!(r"^\)"),
			Self::LeftBrace => regex!(r"^\{"),
			Self::RightBrace => regex!(r"^\}"),

			Self::Function => regex!(r"^fn\b"),
			Self::Let => regex!(r"^let\b"),
			Self::True => regex!(r"^true\b"),
			Self::False => regex!(r"^false\b"),
			Self::If => regex!(r"^if\b"),
			Self::Else => regex!(r"^else\b"),
			Self::Return => regex!(r"^return\b"),

			Self::Ident => regex!(r"^[A-Za-z_][A-Za-z0-9_]*"),
			Self::Int => regex!(r"^[0-9]+"),
			Self::Str => regex!(r#"^"[^"]*""#),

			Self::Illegal | Self::Eof => regex!(r"^\x00\x00NEVER\x00\x00"),
		}
	}

	#[must_use]
	pub const fn is_trivia(self) -> bool {
		matches!(self, Self::Whitespace | Self::LineComment)
	}
}

impl fmt::Display for TokenKind {
	fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(formatter, "{}", format!("{self:?}").from_case(Case::Pascal).to_case(Case::Title))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub lexeme: String,
	pub line: usize,
}

impl Token {
	#[must_use]
	pub fn eof(line: usize) -> Self {
		Self { kind: TokenKind::Eof, lexeme: String::new(), line }
	}
}

impl fmt::Display for Token {
	fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(formatter, "{}", self.lexeme)
	}
}
