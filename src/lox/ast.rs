//! Closed sum types for Lox expressions and statements.
//!
//! A plain tagged `enum` + `match` dispatch rather than a trait-object or
//! trait-delegation visitor: the statement and expression sets are closed
//! and known up front, so a `match` covers every case at compile time and
//! needs no dynamic dispatch.

use std::sync::atomic::{AtomicU32, Ordering};

use super::token::Token;

/// Monotonic id generator for expression nodes, used as the key into the
/// resolver's hop-distance side-table (expression-identity strategy (a):
/// nodes are owned/boxed and move freely, so an address can't be the key).
static NEXT_EXPR_ID: AtomicU32 = AtomicU32::new(0);

pub type ExprId = u32;

fn next_id() -> ExprId {
	NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub enum Expr {
	Literal { id: ExprId, value: super::value::Value },
	Grouping { id: ExprId, inner: Box<Expr> },
	Unary { id: ExprId, operator: Token, right: Box<Expr> },
	Binary { id: ExprId, left: Box<Expr>, operator: Token, right: Box<Expr> },
	Logical { id: ExprId, left: Box<Expr>, operator: Token, right: Box<Expr> },
	Variable { id: ExprId, name: Token },
	Assign { id: ExprId, name: Token, value: Box<Expr> },
	Call { id: ExprId, callee: Box<Expr>, paren: Token, arguments: Vec<Expr> },
	Get { id: ExprId, object: Box<Expr>, name: Token },
	Set { id: ExprId, object: Box<Expr>, name: Token, value: Box<Expr> },
	This { id: ExprId, keyword: Token },
	Super { id: ExprId, keyword: Token, method: Token },
}

impl Expr {
	#[must_use]
	pub const fn id(&self) -> ExprId {
		match self {
			Self::Literal { id, .. }
			| Self::Grouping { id, .. }
			| Self::Unary { id, .. }
			| Self::Binary { id, .. }
			| Self::Logical { id, .. }
			| Self::Variable { id, .. }
			| Self::Assign { id, .. }
			| Self::Call { id, .. }
			| Self::Get { id, .. }
			| Self::Set { id, .. }
			| Self::This { id, .. }
			| Self::Super { id, .. } => *id,
		}
	}

	#[must_use]
	pub fn literal(value: super::value::Value) -> Self {
		Self::Literal { id: next_id(), value }
	}

	#[must_use]
	pub fn grouping(inner: Expr) -> Self {
		Self::Grouping { id: next_id(), inner: Box::new(inner) }
	}

	#[must_use]
	pub fn unary(operator: Token, right: Expr) -> Self {
		Self::Unary { id: next_id(), operator, right: Box::new(right) }
	}

	#[must_use]
	pub fn binary(left: Expr, operator: Token, right: Expr) -> Self {
		Self::Binary { id: next_id(), left: Box::new(left), operator, right: Box::new(right) }
	}

	#[must_use]
	pub fn logical(left: Expr, operator: Token, right: Expr) -> Self {
		Self::Logical { id: next_id(), left: Box::new(left), operator, right: Box::new(right) }
	}

	#[must_use]
	pub fn variable(name: Token) -> Self {
		Self::Variable { id: next_id(), name }
	}

	#[must_use]
	pub fn assign(name: Token, value: Expr) -> Self {
		Self::Assign { id: next_id(), name, value: Box::new(value) }
	}

	#[must_use]
	pub fn call(callee: Expr, paren: Token, arguments: Vec<Expr>) -> Self {
		Self::Call { id: next_id(), callee: Box::new(callee), paren, arguments }
	}

	#[must_use]
	pub fn get(object: Expr, name: Token) -> Self {
		Self::Get { id: next_id(), object: Box::new(object), name }
	}

	#[must_use]
	pub fn set(object: Expr, name: Token, value: Expr) -> Self {
		Self::Set { id: next_id(), object: Box::new(object), name, value: Box::new(value) }
	}

	#[must_use]
	pub fn this(keyword: Token) -> Self {
		Self::This { id: next_id(), keyword }
	}

	#[must_use]
	pub fn super_(keyword: Token, method: Token) -> Self {
		Self::Super { id: next_id(), keyword, method }
	}
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
	pub name: Token,
	pub params: Vec<Token>,
	pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
	Expression(Expr),
	Print(Expr),
	VarDecl { name: Token, initializer: Option<Expr> },
	Block(Vec<Stmt>),
	If { condition: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>> },
	While { condition: Expr, body: Box<Stmt> },
	Function(std::rc::Rc<FunctionDecl>),
	Return { keyword: Token, value: Option<Expr> },
	Class { name: Token, superclass: Option<Expr>, methods: Vec<std::rc::Rc<FunctionDecl>> },
}
