//! Arena-indexed lexical environment tree.
//!
//! Scopes live in a `Vec<Scope>` arena addressed by index rather than
//! linked through `Rc<RefCell<_>>`, so a closure only needs to remember
//! the index of the scope it closed over.

use std::collections::HashMap;

use super::value::Value;

/// One lexical scope: a name→value map plus a link to its parent. The
/// global scope (index 0) has no parent.
#[derive(Debug, Default)]
pub struct Scope {
	parent: Option<usize>,
	variables: HashMap<String, Value>,
}

/// The arena of all scopes created during one interpreter session. A scope
/// is never freed early; it lives as long as the arena itself (the whole
/// session), since closures may reference any scope by index indefinitely.
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

	/// Creates a new child scope of `parent`, returning its index.
	pub fn child_of(&mut self, parent: usize) -> usize {
		self.scopes.push(Scope { parent: Some(parent), variables: HashMap::new() });
		self.scopes.len() - 1
	}

	/// Declares `name` in `scope`, shadowing any binding of the same name in
	/// an ancestor scope. Redeclaration within the very same scope simply
	/// overwrites, matching `var`'s re-binding semantics at global scope;
	/// the resolver is responsible for rejecting redeclaration elsewhere.
	pub fn define(&mut self, scope: usize, name: &str, value: Value) {
		self.scope_mut(scope).variables.insert(name.to_owned(), value);
	}

	/// Walks from `scope` up through `distance` parent links and reads
	/// `name` directly there.
	#[must_use]
	pub fn get_at(&self, scope: usize, distance: u32, name: &str) -> Option<Value> {
		let target = self.ancestor(scope, distance);
		self.scope_ref(target).variables.get(name).cloned()
	}

	/// Walks from `scope` up through the parent chain by name, used by
	/// globals (no resolver entry) and by Monkey (no resolver at all).
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

	/// Writes `value` for `name` exactly `distance` parents up from `scope`.
	/// Returns `false` if that scope has no existing binding for `name`
	/// (assignment, unlike declaration, never creates a new binding).
	pub fn assign_at(&mut self, scope: usize, distance: u32, name: &str, value: Value) -> bool {
		let target = self.ancestor(scope, distance);
		self.assign_in(target, name, value)
	}

	/// Walks from `scope` up the parent chain by name, assigning the first
	/// match found. Returns `false` if no ancestor declares `name`.
	pub fn assign(&mut self, scope: usize, name: &str, value: Value) -> bool {
		let mut current = Some(scope);
		while let Some(index) = current {
			if self.scope_ref(index).variables.contains_key(name) {
				return self.assign_in(index, name, value);
			}
			current = self.scope_ref(index).parent;
		}
		false
	}

	fn assign_in(&mut self, scope: usize, name: &str, value: Value) -> bool {
		let data = self.scope_mut(scope);
		if let Some(slot) = data.variables.get_mut(name) {
			*slot = value;
			true
		} else {
			false
		}
	}

	fn ancestor(&self, scope: usize, distance: u32) -> usize {
		let mut current = scope;
		for _ in 0..distance {
			current = self.scope_ref(current).parent.expect("resolver distance exceeds scope depth");
		}
		current
	}

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

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn block_shadows_parent() {
		let mut env = Environment::new();
		let global = env.global();
		env.define(global, "a", Value::Number(1.0));
		let block = env.child_of(global);
		env.define(block, "a", Value::Number(2.0));
		assert_eq!(env.get(block, "a"), Some(Value::Number(2.0)));
		assert_eq!(env.get(global, "a"), Some(Value::Number(1.0)));
	}

	#[test]
	fn get_at_matches_hop_distance() {
		let mut env = Environment::new();
		let global = env.global();
		env.define(global, "a", Value::Number(1.0));
		let inner = env.child_of(env.child_of(global));
		assert_eq!(env.get_at(inner, 2, "a"), Some(Value::Number(1.0)));
	}

	#[test]
	fn assign_never_creates_binding() {
		let mut env = Environment::new();
		let global = env.global();
		assert!(!env.assign(global, "missing", Value::Nil));
	}
}
