//! Static scope-distance resolver.
//!
//! Walks the AST once before evaluation, tracking declared-but-not-yet-
//! defined names per lexical scope (`scopes: Vec<HashMap<String, bool>>`)
//! and recording, for each variable reference, how many scopes out its
//! binding lives. `FunctionType`/`ClassType` track the enclosing
//! function/class kind so `return`, `this`, and `super` can be rejected
//! outside their valid contexts.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, Diagnostics, Location, Stage};

use super::ast::{Expr, ExprId, FunctionDecl, Stmt};
use super::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionType {
	None,
	Function,
	Method,
	Initializer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassType {
	None,
	Class,
	Subclass,
}

/// The hop-distance side-table produced by a resolve pass: for each
/// expression id that refers to a local binding, how many parent links to
/// walk from the environment active at evaluation time. Absent entries are
/// resolved as globals.
pub type Locals = HashMap<ExprId, u32>;

pub struct Resolver<'d> {
	scopes: Vec<HashMap<String, bool>>,
	locals: Locals,
	current_function: FunctionType,
	current_class: ClassType,
	diagnostics: &'d mut Diagnostics,
}

impl<'d> Resolver<'d> {
	pub fn resolve(program: &[Stmt], diagnostics: &'d mut Diagnostics) -> Locals {
		let mut resolver = Self {
			scopes: Vec::new(),
			locals: HashMap::new(),
			current_function: FunctionType::None,
			current_class: ClassType::None,
			diagnostics,
		};
		resolver.resolve_stmts(program);
		resolver.locals
	}

	fn begin_scope(&mut self) {
		self.scopes.push(HashMap::new());
	}

	fn end_scope(&mut self) {
		self.scopes.pop();
	}

	fn declare(&mut self, name: &Token) {
		if let Some(scope) = self.scopes.last_mut() {
			if scope.contains_key(&name.lexeme) {
				self.diagnostics.push(
					Diagnostic::new(name.line, Stage::Resolve, "already a variable with this name in this scope")
						.at(Location::Lexeme(name.lexeme.clone())),
				);
			}
			scope.insert(name.lexeme.clone(), false);
		}
	}

	fn define(&mut self, name: &Token) {
		if let Some(scope) = self.scopes.last_mut() {
			scope.insert(name.lexeme.clone(), true);
		}
	}

	fn resolve_local(&mut self, id: ExprId, name: &str) {
		for (depth, scope) in self.scopes.iter().rev().enumerate() {
			if scope.contains_key(name) {
				self.locals.insert(id, depth as u32);
				return;
			}
		}
		// Not found in any tracked scope: resolved as a global at eval time.
	}

	fn resolve_stmts(&mut self, statements: &[Stmt]) {
		for statement in statements {
			self.resolve_stmt(statement);
		}
	}

	fn resolve_stmt(&mut self, statement: &Stmt) {
		match statement {
			Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),
			Stmt::VarDecl { name, initializer } => {
				self.declare(name);
				if let Some(initializer) = initializer {
					self.resolve_expr(initializer);
				}
				self.define(name);
			}
			Stmt::Block(statements) => {
				self.begin_scope();
				self.resolve_stmts(statements);
				self.end_scope();
			}
			Stmt::If { condition, then_branch, else_branch } => {
				self.resolve_expr(condition);
				self.resolve_stmt(then_branch);
				if let Some(else_branch) = else_branch {
					self.resolve_stmt(else_branch);
				}
			}
			Stmt::While { condition, body } => {
				self.resolve_expr(condition);
				self.resolve_stmt(body);
			}
			Stmt::Function(declaration) => {
				self.declare(&declaration.name);
				self.define(&declaration.name);
				self.resolve_function(declaration, FunctionType::Function);
			}
			Stmt::Return { keyword, value } => {
				if self.current_function == FunctionType::None {
					self.diagnostics.push(Diagnostic::new(
						keyword.line,
						Stage::Resolve,
						"can't return from top-level code",
					));
				}
				if let Some(value) = value {
					if self.current_function == FunctionType::Initializer {
						self.diagnostics.push(Diagnostic::new(
							keyword.line,
							Stage::Resolve,
							"can't return a value from an initializer",
						));
					}
					self.resolve_expr(value);
				}
			}
			Stmt::Class { name, superclass, methods } => self.resolve_class(name, superclass.as_ref(), methods),
		}
	}

	fn resolve_class(&mut self, name: &Token, superclass: Option<&Expr>, methods: &[std::rc::Rc<FunctionDecl>]) {
		let enclosing_class = self.current_class;
		self.current_class = ClassType::Class;

		self.declare(name);
		self.define(name);

		if let Some(Expr::Variable { name: super_name, .. }) = superclass {
			if super_name.lexeme == name.lexeme {
				self.diagnostics.push(Diagnostic::new(
					super_name.line,
					Stage::Resolve,
					"a class can't inherit from itself",
				));
			}
			self.current_class = ClassType::Subclass;
			self.resolve_expr(superclass.expect("checked Some above"));
			self.begin_scope();
			self.scopes.last_mut().expect("just pushed").insert("super".to_owned(), true);
		}

		self.begin_scope();
		self.scopes.last_mut().expect("just pushed").insert("this".to_owned(), true);

		for method in methods {
			let function_type =
				if method.name.lexeme == "init" { FunctionType::Initializer } else { FunctionType::Method };
			self.resolve_function(method, function_type);
		}

		self.end_scope();
		if superclass.is_some() {
			self.end_scope();
		}

		self.current_class = enclosing_class;
	}

	fn resolve_function(&mut self, declaration: &FunctionDecl, function_type: FunctionType) {
		let enclosing_function = self.current_function;
		self.current_function = function_type;

		self.begin_scope();
		for param in &declaration.params {
			self.declare(param);
			self.define(param);
		}
		self.resolve_stmts(&declaration.body);
		self.end_scope();

		self.current_function = enclosing_function;
	}

	fn resolve_expr(&mut self, expr: &Expr) {
		match expr {
			Expr::Literal { .. } => {}
			Expr::Grouping { inner, .. } => self.resolve_expr(inner),
			Expr::Unary { right, .. } => self.resolve_expr(right),
			Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
				self.resolve_expr(left);
				self.resolve_expr(right);
			}
			Expr::Variable { id, name } => {
				if let Some(scope) = self.scopes.last() {
					if scope.get(&name.lexeme) == Some(&false) {
						self.diagnostics.push(Diagnostic::new(
							name.line,
							Stage::Resolve,
							"can't read local variable in its own initializer",
						));
					}
				}
				self.resolve_local(*id, &name.lexeme);
			}
			Expr::Assign { id, name, value } => {
				self.resolve_expr(value);
				self.resolve_local(*id, &name.lexeme);
			}
			Expr::Call { callee, arguments, .. } => {
				self.resolve_expr(callee);
				for argument in arguments {
					self.resolve_expr(argument);
				}
			}
			Expr::Get { object, .. } => self.resolve_expr(object),
			Expr::Set { object, value, .. } => {
				self.resolve_expr(value);
				self.resolve_expr(object);
			}
			Expr::This { id, keyword } => {
				if self.current_class == ClassType::None {
					self.diagnostics.push(Diagnostic::new(
						keyword.line,
						Stage::Resolve,
						"can't use 'this' outside of a class",
					));
					return;
				}
				self.resolve_local(*id, "this");
			}
			Expr::Super { id, keyword, .. } => {
				match self.current_class {
					ClassType::None => {
						self.diagnostics.push(Diagnostic::new(
							keyword.line,
							Stage::Resolve,
							"can't use 'super' outside of a class",
						));
					}
					ClassType::Class => {
						self.diagnostics.push(Diagnostic::new(
							keyword.line,
							Stage::Resolve,
							"can't use 'super' in a class with no superclass",
						));
					}
					ClassType::Subclass => {}
				}
				self.resolve_local(*id, "super");
			}
		}
	}
}
