//! Token types for the Lox pipeline, using a regex-per-variant lexer idiom.

use convert_case::{Case, Casing};
use regex_macro::regex;
use std::fmt;
use strum_macros::EnumIter;

/// Every lexical category Lox source can produce. Declaration order is
/// load-bearing: `find_match` tries variants in this order and takes the
/// first match, so two-character operators must precede their one-character
/// prefixes and keywords must precede `Identifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum TokenKind {
	LeftParen,
	RightParen,
	LeftBrace,
	RightBrace,
	Comma,
	Dot,
	Minus,
	Plus,
	Semicolon,
	Slash,
	Star,

	LineComment,
	Whitespace,

	BangEqual,
	Bang,
	EqualEqual,
	Equal,
	GreaterEqual,
	Greater,
	LessEqual,
	Less,

	And,
	Class,
	Else,
	False,
	Fun,
	For,
	If,
	Nil,
	Or,
	Print,
	Return,
	Super,
	This,
	True,
	Var,
	While,

	Identifier,
	String,
	Number,

	Eof,
}

impl TokenKind {
	/// The anchored pattern used to recognize this kind at the start of the
	/// remaining source. Built once via `regex_macro::regex!`, so there is no
	/// per-call compilation cost.
	#[must_use]
	pub fn pattern(self) -> &'static regex_macro::Regex {
		match self {
			Self::LeftParen => regex!(r"^\("),
			Self::RightParen => regex!(r"^\)"),
			Self::LeftBrace => regex!(r"^\{"),
			Self::RightBrace => regex!(r"^\}"),
			Self::Comma => regex!(r"^,"),
			Self::Dot => regex!(r"^\."),
			Self::Minus => regex!(r"^-"),
			Self::Plus => regex!(r"^\+"),
			Self::Semicolon => regex!(r"^;"),
			Self::Slash => regex!(r"^/"),
			Self::Star => regex!(r"^\*"),

			Self::LineComment => regex!(r"^//[^\n]*"),
			Self::Whitespace => regex!(r"^[ \t\r\n]+"),

			Self::BangEqual => regex!(r"^!="),
			Self::Bang => regex!(r"^!"),
			Self::EqualEqual => regex!(r"^=="),
			Self::Equal => regex!(r"^="),
			Self::GreaterEqual => regex!(r"^>="),
			Self::Greater => regex!(r"^>"),
			Self::LessEqual => regex!(r"^<="),
			Self::Less => regex!(r"^<"),

			Self::And => regex!(r"^and\b"),
			Self::Class => regex!(r"^class\b"),
			Self::Else => regex!(r"^else\b"),
			Self::False => regex!(r"^false\b"),
			Self::Fun => regex!(r"^fun\b"),
			Self::For => regex!(r"^for\b"),
			Self::If => regex!(r"^if\b"),
			Self::Nil => regex!(r"^nil\b"),
			Self::Or => regex!(r"^or\b"),
			Self::Print => regex!(r"^print\b"),
			Self::Return => regex!(r"^return\b"),
			Self::Super => regex!(r"^super\b"),
			Self::This => regex!(r"^this\b"),
			Self::True => regex!(r"^true\b"),
			Self::Var => regex!(r"^var\b"),
			Self::While => regex!(r"^while\b"),

			Self::Identifier => regex!(r"^[A-Za-z_][A-Za-z0-9_]*"),
			Self::String => regex!(r#"^"[^"]*""#),
			Self::Number => regex!(r"^[0-9]+(\.[0-9]+)?"),

			// Never matched directly; the lexer appends a single synthetic
			// `Eof` token once the input is exhausted.
			Self::Eof => regex!(r"^\x00\x00NEVER\x00\x00"),
		}
	}

	/// Whether this kind should be dropped from the emitted token stream.
	#[must_use]
	pub const fn is_trivia(self) -> bool {
		matches!(self, Self::LineComment | Self::Whitespace)
	}
}

impl fmt::Display for TokenKind {
	fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(formatter, "{}", format!("{self:?}").from_case(Case::Pascal).to_case(Case::Title))
	}
}

/// A literal payload captured at lex time, used by the parser to build
/// literal expression nodes without re-parsing the lexeme text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	Number(f64),
	Str(String),
	None,
}

/// One lexeme plus its source position and (if applicable) literal payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub lexeme: String,
	pub literal: Literal,
	pub line: usize,
}

impl Token {
	#[must_use]
	pub fn eof(line: usize) -> Self {
		Self { kind: TokenKind::Eof, lexeme: String::new(), literal: Literal::None, line }
	}
}

impl fmt::Display for Token {
	fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(formatter, "{}", self.lexeme)
	}
}
