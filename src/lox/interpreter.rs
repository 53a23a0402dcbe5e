//! Tree-walking evaluator for the Lox pipeline.
//!
//! `current` is a scope index, saved and restored around block/function
//! execution so evaluation can run in a different scope than the one it
//! returns to. Non-local `return` is a control transfer (`Signal::Return`)
//! rather than a special value threaded through every call site.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::diagnostics::{Diagnostic, Diagnostics, Stage};

use super::ast::{Expr, FunctionDecl, Stmt};
use super::environment::Environment;
use super::resolver::Locals;
use super::token::{Token, TokenKind};
use super::value::{Class, Function, Instance, Value};

/// Non-local control transfer: either a `return` unwinding to its call
/// site, or a runtime error unwinding the whole evaluation. Never confused
/// with each other or with a resolver/parse diagnostic.
pub enum Signal {
	Return(Value),
	Error(Diagnostic),
}

pub type EvalResult<T> = Result<T, Signal>;

fn runtime_error(line: usize, message: impl Into<String>) -> Signal {
	Signal::Error(Diagnostic::new(line, Stage::Runtime, message.into()))
}

pub struct Interpreter {
	env: Environment,
	globals: usize,
	current: usize,
	locals: Locals,
}

impl Interpreter {
	#[must_use]
	pub fn new() -> Self {
		let mut env = Environment::new();
		let globals = env.global();
		super::natives::register(&mut env, globals);
		Self { env, globals, current: globals, locals: Locals::new() }
	}

	/// Executes `program`, writing `print` output to stdout directly and
	/// reporting the first runtime error (if any) into `diagnostics`. The
	/// `locals` side-table comes from a prior resolver pass over the same
	/// program.
	pub fn interpret(&mut self, program: &[Stmt], locals: Locals, diagnostics: &mut Diagnostics) {
		self.locals = locals;
		for statement in program {
			if let Err(signal) = self.exec_stmt(statement) {
				match signal {
					Signal::Error(diagnostic) => {
						diagnostics.push(diagnostic);
						return;
					}
					Signal::Return(_) => {
						// A `return` that escapes every function call is an
						// interpreter bug, not a user-facing diagnostic.
						unreachable!("return signal escaped top-level execution");
					}
				}
			}
		}
	}

	fn exec_stmt(&mut self, statement: &Stmt) -> EvalResult<()> {
		match statement {
			Stmt::Expression(expr) => {
				self.eval_expr(expr)?;
				Ok(())
			}
			Stmt::Print(expr) => {
				let value = self.eval_expr(expr)?;
				println!("{}", value.stringify());
				Ok(())
			}
			Stmt::VarDecl { name, initializer } => {
				let value = match initializer {
					Some(expr) => self.eval_expr(expr)?,
					None => Value::Nil,
				};
				self.env.define(self.current, &name.lexeme, value);
				Ok(())
			}
			Stmt::Block(statements) => {
				let scope = self.env.child_of(self.current);
				self.execute_block(statements, scope)
			}
			Stmt::If { condition, then_branch, else_branch } => {
				if self.eval_expr(condition)?.is_truthy() {
					self.exec_stmt(then_branch)
				} else if let Some(else_branch) = else_branch {
					self.exec_stmt(else_branch)
				} else {
					Ok(())
				}
			}
			Stmt::While { condition, body } => {
				while self.eval_expr(condition)?.is_truthy() {
					self.exec_stmt(body)?;
				}
				Ok(())
			}
			Stmt::Function(declaration) => {
				let function =
					Value::Function(Rc::new(Function {
						declaration: Rc::clone(declaration),
						closure: self.current,
						is_initializer: false,
					}));
				self.env.define(self.current, &declaration.name.lexeme, function);
				Ok(())
			}
			Stmt::Return { value, .. } => {
				let value = match value {
					Some(expr) => self.eval_expr(expr)?,
					None => Value::Nil,
				};
				Err(Signal::Return(value))
			}
			Stmt::Class { name, superclass, methods } => self.exec_class(name, superclass.as_ref(), methods),
		}
	}

	/// Executes `statements` under `scope`, restoring `self.current` on
	/// every exit path (normal, return signal, or runtime error).
	fn execute_block(&mut self, statements: &[Stmt], scope: usize) -> EvalResult<()> {
		let previous = self.current;
		self.current = scope;
		let result = statements.iter().try_for_each(|statement| self.exec_stmt(statement));
		self.current = previous;
		result
	}

	fn exec_class(&mut self, name: &Token, superclass_expr: Option<&Expr>, methods: &[Rc<FunctionDecl>]) -> EvalResult<()> {
		let superclass = match superclass_expr {
			Some(expr) => {
				let value = self.eval_expr(expr)?;
				match value {
					Value::Class(class) => Some(class),
					_ => return Err(runtime_error(name.line, "superclass must be a class")),
				}
			}
			None => None,
		};

		self.env.define(self.current, &name.lexeme, Value::Nil);

		let method_scope = if let Some(superclass) = &superclass {
			let scope = self.env.child_of(self.current);
			self.env.define(scope, "super", Value::Class(Rc::clone(superclass)));
			scope
		} else {
			self.current
		};

		let mut method_table = HashMap::new();
		for method in methods {
			let function = Rc::new(Function {
				declaration: Rc::clone(method),
				closure: method_scope,
				is_initializer: method.name.lexeme == "init",
			});
			method_table.insert(method.name.lexeme.clone(), function);
		}

		let class = Value::Class(Rc::new(Class { name: name.lexeme.clone(), superclass, methods: method_table }));
		let assigned = self.env.assign(self.current, &name.lexeme, class);
		debug_assert!(assigned, "class name was just defined above");
		Ok(())
	}

	fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
		match expr {
			Expr::Literal { value, .. } => Ok(value.clone()),
			Expr::Grouping { inner, .. } => self.eval_expr(inner),
			Expr::Unary { operator, right, .. } => self.eval_unary(operator, right),
			Expr::Binary { left, operator, right, .. } => self.eval_binary(left, operator, right),
			Expr::Logical { left, operator, right, .. } => self.eval_logical(left, operator, right),
			Expr::Variable { id, name } => self.lookup_variable(*id, name),
			Expr::Assign { id, name, value } => {
				let value = self.eval_expr(value)?;
				let assigned = match self.locals.get(id) {
					Some(&distance) => self.env.assign_at(self.current, distance, &name.lexeme, value.clone()),
					None => self.env.assign(self.globals, &name.lexeme, value.clone()),
				};
				if !assigned {
					return Err(runtime_error(name.line, format!("undefined variable '{}'", name.lexeme)));
				}
				Ok(value)
			}
			Expr::Call { callee, paren, arguments, .. } => self.eval_call(callee, paren, arguments),
			Expr::Get { object, name, .. } => self.eval_get(object, name),
			Expr::Set { object, name, value, .. } => self.eval_set(object, name, value),
			Expr::This { id, keyword } => self.lookup_variable(*id, keyword),
			Expr::Super { id, keyword, method } => self.eval_super(*id, keyword, method),
		}
	}

	fn lookup_variable(&self, id: super::ast::ExprId, name: &Token) -> EvalResult<Value> {
		let found = match self.locals.get(&id) {
			Some(&distance) => self.env.get_at(self.current, distance, &name.lexeme),
			None => self.env.get(self.globals, &name.lexeme),
		};
		found.ok_or_else(|| runtime_error(name.line, format!("undefined variable '{}'", name.lexeme)))
	}

	fn eval_unary(&mut self, operator: &Token, right: &Expr) -> EvalResult<Value> {
		let right = self.eval_expr(right)?;
		match operator.kind {
			TokenKind::Minus => match right {
				Value::Number(value) => Ok(Value::Number(-value)),
				_ => Err(runtime_error(operator.line, "operand must be a number")),
			},
			TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
			_ => unreachable!("parser only produces '-' or '!' as unary operators"),
		}
	}

	fn eval_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> EvalResult<Value> {
		let left = self.eval_expr(left)?;
		let right = self.eval_expr(right)?;
		match operator.kind {
			TokenKind::Minus => numeric(operator, left, right, |a, b| Value::Number(a - b)),
			TokenKind::Slash => numeric(operator, left, right, |a, b| Value::Number(a / b)),
			TokenKind::Star => numeric(operator, left, right, |a, b| Value::Number(a * b)),
			TokenKind::Greater => numeric(operator, left, right, |a, b| Value::Bool(a > b)),
			TokenKind::GreaterEqual => numeric(operator, left, right, |a, b| Value::Bool(a >= b)),
			TokenKind::Less => numeric(operator, left, right, |a, b| Value::Bool(a < b)),
			TokenKind::LessEqual => numeric(operator, left, right, |a, b| Value::Bool(a <= b)),
			TokenKind::Plus => match (left, right) {
				(Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
				(Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
				_ => Err(runtime_error(operator.line, "operands must be two numbers or two strings")),
			},
			TokenKind::EqualEqual => Ok(Value::Bool(left == right)),
			TokenKind::BangEqual => Ok(Value::Bool(left != right)),
			_ => unreachable!("parser only produces binary operators listed above"),
		}
	}

	fn eval_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> EvalResult<Value> {
		let left = self.eval_expr(left)?;
		match operator.kind {
			TokenKind::Or if left.is_truthy() => Ok(left),
			TokenKind::And if !left.is_truthy() => Ok(left),
			_ => self.eval_expr(right),
		}
	}

	fn eval_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> EvalResult<Value> {
		let callee = self.eval_expr(callee)?;
		let mut args = Vec::with_capacity(arguments.len());
		for argument in arguments {
			args.push(self.eval_expr(argument)?);
		}

		match callee {
			Value::Function(function) => self.call_function(&function, &args, paren),
			Value::NativeFunction(native) => {
				if args.len() != native.arity {
					return Err(runtime_error(
						paren.line,
						format!("expected {} arguments but got {}", native.arity, args.len()),
					));
				}
				(native.call)(&args).map_err(|error| runtime_error(paren.line, error.to_string()))
			}
			Value::Class(class) => self.instantiate(&class, &args, paren),
			_ => Err(runtime_error(paren.line, "can only call functions and classes")),
		}
	}

	fn call_function(&mut self, function: &Rc<Function>, args: &[Value], paren: &Token) -> EvalResult<Value> {
		if args.len() != function.declaration.params.len() {
			return Err(runtime_error(
				paren.line,
				format!("expected {} arguments but got {}", function.declaration.params.len(), args.len()),
			));
		}

		let call_scope = self.env.child_of(function.closure);
		for (param, arg) in function.declaration.params.iter().zip(args) {
			self.env.define(call_scope, &param.lexeme, arg.clone());
		}

		let previous = self.current;
		self.current = call_scope;
		let result = function.declaration.body.iter().try_for_each(|statement| self.exec_stmt(statement));
		self.current = previous;

		match result {
			Ok(()) => {
				if function.is_initializer {
					Ok(self.env.get_at(function.closure, 0, "this").unwrap_or(Value::Nil))
				} else {
					Ok(Value::Nil)
				}
			}
			Err(Signal::Return(value)) => {
				if function.is_initializer {
					Ok(self.env.get_at(function.closure, 0, "this").unwrap_or(Value::Nil))
				} else {
					Ok(value)
				}
			}
			Err(error @ Signal::Error(_)) => Err(error),
		}
	}

	fn instantiate(&mut self, class: &Rc<Class>, args: &[Value], paren: &Token) -> EvalResult<Value> {
		let instance = Rc::new(RefCell::new(Instance { class: Rc::clone(class), fields: HashMap::new() }));
		if let Some(initializer) = class.find_method("init") {
			let bound = self.bind(&initializer, Rc::clone(&instance));
			self.call_function(&bound, args, paren)?;
		} else if !args.is_empty() {
			return Err(runtime_error(paren.line, format!("expected 0 arguments but got {}", args.len())));
		}
		Ok(Value::Instance(instance))
	}

	fn eval_get(&mut self, object: &Expr, name: &Token) -> EvalResult<Value> {
		let object = self.eval_expr(object)?;
		let Value::Instance(instance) = object else {
			return Err(runtime_error(name.line, "only instances have properties"));
		};

		if let Some(value) = instance.borrow().fields.get(&name.lexeme) {
			return Ok(value.clone());
		}

		let class = Rc::clone(&instance.borrow().class);
		if let Some(method) = class.find_method(&name.lexeme) {
			return Ok(Value::Function(self.bind(&method, instance)));
		}

		Err(runtime_error(name.line, format!("undefined property '{}'", name.lexeme)))
	}

	fn eval_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> EvalResult<Value> {
		let object = self.eval_expr(object)?;
		let Value::Instance(instance) = object else {
			return Err(runtime_error(name.line, "only instances have fields"));
		};
		let value = self.eval_expr(value)?;
		instance.borrow_mut().fields.insert(name.lexeme.clone(), value.clone());
		Ok(value)
	}

	/// Returns a copy of `method` closed over a fresh scope binding `this`
	/// to `instance`, so the same method value accessed twice always binds
	/// independently but resolves `this` to the same instance.
	fn bind(&mut self, method: &Rc<Function>, instance: Rc<RefCell<Instance>>) -> Rc<Function> {
		let scope = self.env.child_of(method.closure);
		self.env.define(scope, "this", Value::Instance(instance));
		Rc::new(Function {
			declaration: Rc::clone(&method.declaration),
			closure: scope,
			is_initializer: method.is_initializer,
		})
	}

	fn eval_super(&mut self, id: super::ast::ExprId, keyword: &Token, method: &Token) -> EvalResult<Value> {
		let distance = *self.locals.get(&id).expect("resolver always resolves 'super'");
		let Some(Value::Class(superclass)) = self.env.get_at(self.current, distance, "super") else {
			unreachable!("resolver guarantees 'super' is bound to a class");
		};
		let Some(Value::Instance(instance)) =
			self.env.get_at(self.current, distance.saturating_sub(1), "this")
		else {
			unreachable!("resolver guarantees 'this' is bound one scope inside 'super'");
		};

		let Some(found) = superclass.find_method(&method.lexeme) else {
			return Err(runtime_error(keyword.line, format!("undefined property '{}'", method.lexeme)));
		};
		Ok(Value::Function(self.bind(&found, instance)))
	}
}

impl Default for Interpreter {
	fn default() -> Self {
		Self::new()
	}
}

fn numeric(operator: &Token, left: Value, right: Value, apply: impl Fn(f64, f64) -> Value) -> EvalResult<Value> {
	match (left, right) {
		(Value::Number(a), Value::Number(b)) => Ok(apply(a, b)),
		_ => Err(runtime_error(operator.line, "operands must be numbers")),
	}
}
