//! Tree-walking evaluator for Monkey.
//!
//! A `return` wraps its value in a `Value::ReturnValue` that bubbles,
//! unexamined, through nested block evaluation, and is unwrapped exactly
//! once at the call boundary.

use std::rc::Rc;

use crate::diagnostics::{Diagnostic, Diagnostics, Stage};

use super::ast::{Expr, Stmt};
use super::environment::Environment;
use super::token::TokenKind;
use super::value::{Function, Value};

pub type EvalResult = Result<Value, Diagnostic>;

fn runtime_error(line: usize, message: impl Into<String>) -> Diagnostic {
	Diagnostic::new(line, Stage::Runtime, message.into())
}

pub struct Interpreter {
	env: Environment,
	globals: usize,
	current: usize,
}

impl Interpreter {
	#[must_use]
	pub fn new() -> Self {
		let mut env = Environment::new();
		let globals = env.global();
		super::natives::register(&mut env, globals);
		Self { env, globals, current: globals }
	}

	/// Runs `program` as a single unit and echoes the value it produced to
	/// stdout (the Monkey REPL has no `print` statement; it echoes the
	/// program's result, matching the original source's REPL loop, which
	/// evaluates the whole accumulated input and prints once). Records the
	/// first runtime error into `diagnostics` instead of printing.
	pub fn interpret(&mut self, program: &[Stmt], diagnostics: &mut Diagnostics) {
		let mut result = Value::Nil;
		for statement in program {
			match self.exec_stmt(statement) {
				Ok(value) => result = value,
				Err(diagnostic) => {
					diagnostics.push(diagnostic);
					return;
				}
			}
		}
		println!("{}", result.stringify());
	}

	fn exec_stmt(&mut self, statement: &Stmt) -> EvalResult {
		match statement {
			Stmt::Let { name, value } => {
				let value = self.eval_expr(value)?;
				self.env.define(self.current, &name.lexeme, value);
				Ok(Value::Nil)
			}
			Stmt::Return { value } => {
				let value = self.eval_expr(value)?;
				Ok(Value::ReturnValue(Box::new(value)))
			}
			Stmt::Expression(expr) => self.eval_expr(expr),
		}
	}

	/// Evaluates a block's statements in order, stopping as soon as one
	/// produces a `Value::ReturnValue` so a `return` nested inside an `if`
	/// terminates the whole enclosing function, not just the inner block.
	fn eval_block(&mut self, statements: &[Stmt]) -> EvalResult {
		let mut result = Value::Nil;
		for statement in statements {
			result = self.exec_stmt(statement)?;
			if matches!(result, Value::ReturnValue(_)) {
				return Ok(result);
			}
		}
		Ok(result)
	}

	fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
		match expr {
			Expr::IntegerLiteral(value) => Ok(Value::Integer(*value)),
			Expr::StringLiteral(value) => Ok(Value::Str(value.clone())),
			Expr::Boolean(value) => Ok(Value::Boolean(*value)),
			Expr::Nil => Ok(Value::Nil),
			Expr::Identifier(token) => self
				.env
				.get(self.current, &token.lexeme)
				.ok_or_else(|| runtime_error(token.line, format!("identifier not found: '{}'", token.lexeme))),
			Expr::Prefix { operator, right } => {
				let right = self.eval_expr(right)?;
				match operator.kind {
					TokenKind::Bang => Ok(Value::Boolean(!right.is_truthy())),
					TokenKind::Minus => match right {
						Value::Integer(value) => Ok(Value::Integer(-value)),
						_ => Err(runtime_error(operator.line, format!("unknown operator: -{}", right.type_name()))),
					},
					_ => unreachable!("parser only produces '!' or '-' as prefix operators"),
				}
			}
			Expr::Infix { left, operator, right } => {
				let left = self.eval_expr(left)?;
				let right = self.eval_expr(right)?;
				self.eval_infix(operator.kind, operator.line, left, right)
			}
			Expr::If { condition, consequence, alternative } => {
				if self.eval_expr(condition)?.is_truthy() {
					self.eval_block(consequence)
				} else if let Some(alternative) = alternative {
					self.eval_block(alternative)
				} else {
					Ok(Value::Nil)
				}
			}
			Expr::FunctionLiteral { params, body } => Ok(Value::Function(Rc::new(Function {
				params: params.clone(),
				body: body.clone(),
				closure: self.current,
			}))),
			Expr::Call { callee, arguments } => self.eval_call(callee, arguments),
		}
	}

	fn eval_infix(&self, operator: TokenKind, line: usize, left: Value, right: Value) -> EvalResult {
		match (left, right) {
			(Value::Integer(a), Value::Integer(b)) => match operator {
				TokenKind::Plus => Ok(Value::Integer(a + b)),
				TokenKind::Minus => Ok(Value::Integer(a - b)),
				TokenKind::Asterisk => Ok(Value::Integer(a * b)),
				TokenKind::Slash => Ok(Value::Integer(a / b)),
				TokenKind::LessThan => Ok(Value::Boolean(a < b)),
				TokenKind::GreaterThan => Ok(Value::Boolean(a > b)),
				TokenKind::Equal => Ok(Value::Boolean(a == b)),
				TokenKind::NotEqual => Ok(Value::Boolean(a != b)),
				_ => Err(runtime_error(line, format!("unknown operator: integer {operator} integer"))),
			},
			(Value::Str(a), Value::Str(b)) => match operator {
				TokenKind::Plus => Ok(Value::Str(a + &b)),
				TokenKind::Equal => Ok(Value::Boolean(a == b)),
				TokenKind::NotEqual => Ok(Value::Boolean(a != b)),
				_ => Err(runtime_error(line, format!("unknown operator: string {operator} string"))),
			},
			(a, b) if operator == TokenKind::Equal => Ok(Value::Boolean(a == b)),
			(a, b) if operator == TokenKind::NotEqual => Ok(Value::Boolean(a != b)),
			(a, b) => Err(runtime_error(line, format!("type mismatch: {} {operator} {}", a.type_name(), b.type_name()))),
		}
	}

	fn eval_call(&mut self, callee: &Expr, arguments: &[Expr]) -> EvalResult {
		let callee_name_line = match callee {
			Expr::Identifier(token) => token.line,
			_ => 0,
		};
		let callee = self.eval_expr(callee)?;
		let mut args = Vec::with_capacity(arguments.len());
		for argument in arguments {
			args.push(self.eval_expr(argument)?);
		}

		match callee {
			Value::Function(function) => self.call_function(&function, &args, callee_name_line),
			Value::NativeFunction(native) => {
				if let Some(arity) = native.arity {
					if args.len() != arity {
						return Err(runtime_error(
							callee_name_line,
							format!("expected {arity} arguments but got {}", args.len()),
						));
					}
				}
				(native.call)(&args).map_err(|error| runtime_error(callee_name_line, error.to_string()))
			}
			other => Err(runtime_error(callee_name_line, format!("not a function: {}", other.type_name()))),
		}
	}

	fn call_function(&mut self, function: &Rc<Function>, args: &[Value], line: usize) -> EvalResult {
		if args.len() != function.params.len() {
			return Err(runtime_error(
				line,
				format!("expected {} arguments but got {}", function.params.len(), args.len()),
			));
		}

		let call_scope = self.env.child_of(function.closure);
		for (param, arg) in function.params.iter().zip(args) {
			self.env.define(call_scope, &param.lexeme, arg.clone());
		}

		let previous = self.current;
		self.current = call_scope;
		let result = self.eval_block(&function.body);
		self.current = previous;

		// Unwrap exactly once, at the function-call boundary.
		result.map(|value| match value {
			Value::ReturnValue(inner) => *inner,
			other => other,
		})
	}
}

impl Default for Interpreter {
	fn default() -> Self {
		Self::new()
	}
}
