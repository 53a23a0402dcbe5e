//! Builtin ("native") function registry.
//!
//! A `phf::phf_map!` static map from name to implementation, rather than a
//! hand-rolled `match` in the call site.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::environment::Environment;
use super::value::{NativeFunction, Value};

fn native_clock(args: &[Value]) -> anyhow::Result<Value> {
	debug_assert!(args.is_empty(), "arity is checked by the caller");
	let elapsed = SystemTime::now().duration_since(UNIX_EPOCH)?;
	Ok(Value::Number(elapsed.as_secs_f64()))
}

static NATIVES: phf::Map<&'static str, (usize, fn(&[Value]) -> anyhow::Result<Value>)> = phf::phf_map! {
	"clock" => (0, native_clock as fn(&[Value]) -> anyhow::Result<Value>),
};

/// Defines every native function in `scope` (normally the global scope).
pub fn register(env: &mut Environment, scope: usize) {
	for (&name, &(arity, call)) in &NATIVES {
		env.define(scope, name, Value::NativeFunction(Rc::new(NativeFunction { name, arity, call })));
	}
}
