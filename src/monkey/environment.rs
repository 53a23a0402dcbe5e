//! Arena-indexed lexical environment for Monkey. Same arena shape as
//! `lox::environment`, but every lookup walks the parent chain by name —
//! Monkey has no resolver pass, so there is no hop-distance side-table to
//! consult.

use std::collections::HashMap;

use super::value::Value;

#[derive(Debug, Default)]
struct Scope {
	parent: Option<usize>,
	variables: HashMap<String, Value>,
}

#[derive(Debug)]
pub struct Environment {
	scopes: Vec<Scope>,
}

impl Environment {
	#[must_use]
	pub fn new() -> Self {
		Self { scopes: vec![Scope::default()] }
	}

	#[must_use]
	pub const fn global(&self) -> usize {
		0
	}

	pub fn child_of(&mut self, parent: usize) -> usize {
		self.scopes.push(Scope { parent: Some(parent), variables: HashMap::new() });
		self.scopes.len() - 1
	}

	pub fn define(&mut self, scope: usize, name: &str, value: Value) {
		self.scope_mut(scope).variables.insert(name.to_owned(), value);
	}

	#[must_use]
	pub fn get(&self, scope: usize, name: &str) -> Option<Value> {
		let mut current = Some(scope);
		while let Some(index) = current {
			let data = self.scope_ref(index);
			if let Some(value) = data.variables.get(name) {
				return Some(value.clone());
			}
			current = data.parent;
		}
		None
	}

	/// Monkey has no block-level reassignment restriction: `let` simply
	/// redefines in the current scope, and there is no bare `=` assignment
	/// expression at all (matching the original source's grammar, which
	/// only ever binds via `let`).
	fn scope_ref(&self, index: usize) -> &Scope {
		self.scopes.get(index).expect("scope index out of bounds")
	}

	fn scope_mut(&mut self, index: usize) -> &mut Scope {
		self.scopes.get_mut(index).expect("scope index out of bounds")
	}
}

impl Default for Environment {
	fn default() -> Self {
		Self::new()
	}
}
