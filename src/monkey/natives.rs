//! Builtin function registry for Monkey, using the same `phf::phf_map!`
//! idiom as `lox::natives`.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::environment::Environment;
use super::value::{NativeFunction, Value};

fn native_len(args: &[Value]) -> anyhow::Result<Value> {
	let Some(argument) = args.first() else { anyhow::bail!("'len' expects one argument") };
	match argument {
		Value::Str(value) => Ok(Value::Integer(value.chars().count() as i64)),
		other => anyhow::bail!("argument to 'len' not supported, got {}", other.type_name()),
	}
}

fn native_clock(args: &[Value]) -> anyhow::Result<Value> {
	debug_assert!(args.is_empty(), "arity is checked by the caller");
	let elapsed = SystemTime::now().duration_since(UNIX_EPOCH)?;
	Ok(Value::Integer(elapsed.as_secs().try_into().unwrap_or(i64::MAX)))
}

static NATIVES: phf::Map<&'static str, (Option<usize>, fn(&[Value]) -> anyhow::Result<Value>)> = phf::phf_map! {
	"len" => (Some(1), native_len as fn(&[Value]) -> anyhow::Result<Value>),
	"clock" => (Some(0), native_clock as fn(&[Value]) -> anyhow::Result<Value>),
};

pub fn register(env: &mut Environment, scope: usize) {
	for (&name, &(arity, call)) in &NATIVES {
		env.define(scope, name, Value::NativeFunction(Rc::new(NativeFunction { name, arity, call })));
	}
}
