//! Tree-walking interpreters for a Lox-family class-based language and a
//! Monkey-family expression-oriented language, sharing one lexer → parser
//! → (resolver) → evaluator pipeline shape.

pub mod cli;
pub mod diagnostics;
pub mod lox;
pub mod monkey;
