//! The four built-ins that don't need access to an output sink (`print` is handled directly in
//! `super::Evaluator` instead, since it's the one built-in with a side effect). Dispatched through
//! a `phf::Map` keyed by name, mirroring the teacher's constant built-in table.

use crate::evaluator::value::{NumberValue, RuntimeValue};

pub type BuiltinFunction = fn(&[RuntimeValue]) -> anyhow::Result<RuntimeValue>;

pub static BUILTINS: phf::Map<&'static str, BuiltinFunction> = phf::phf_map! {
	"len" => len,
	"type" => type_of,
	"stringify" => stringify,
	"toNumber" => to_number,
};

fn len(arguments: &[RuntimeValue]) -> anyhow::Result<RuntimeValue> {
	let [argument] = arguments else { anyhow::bail!("\"len\" expects exactly one argument") };
	let length = match argument {
		RuntimeValue::String(value) => value.chars().count(),
		RuntimeValue::List(list) => list.borrow().len(),
		other => anyhow::bail!("\"len\" requires a string or list, found {}", other.type_name()),
	};
	Ok(RuntimeValue::Number(NumberValue::Int(length as i64)))
}

fn type_of(arguments: &[RuntimeValue]) -> anyhow::Result<RuntimeValue> {
	let [argument] = arguments else { anyhow::bail!("\"type\" expects exactly one argument") };
	Ok(RuntimeValue::String(argument.type_name().to_owned()))
}

fn stringify(arguments: &[RuntimeValue]) -> anyhow::Result<RuntimeValue> {
	let [argument] = arguments else { anyhow::bail!("\"stringify\" expects exactly one argument") };
	Ok(RuntimeValue::String(argument.stringify()))
}

/// Identity on numbers, parses strings (erroring if unparseable), maps booleans to `0`/`1`.
fn to_number(arguments: &[RuntimeValue]) -> anyhow::Result<RuntimeValue> {
	let [argument] = arguments else { anyhow::bail!("\"toNumber\" expects exactly one argument") };
	let number = match argument {
		RuntimeValue::Number(number) => *number,
		RuntimeValue::Bool(value) => NumberValue::Int(i64::from(*value)),
		RuntimeValue::String(value) => {
			if let Ok(parsed) = value.parse::<i64>() {
				NumberValue::Int(parsed)
			} else if let Ok(parsed) = value.parse::<f64>() {
				NumberValue::Float(parsed)
			} else {
				anyhow::bail!("Cannot convert \"{value}\" to a number")
			}
		},
		other => anyhow::bail!("Cannot convert {} to a number", other.type_name()),
	};
	Ok(RuntimeValue::Number(number))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn len_counts_list_elements() {
		let list = RuntimeValue::list_of(vec![RuntimeValue::Null, RuntimeValue::Null]);
		let result = len(&[list]).unwrap();
		assert!(matches!(result, RuntimeValue::Number(NumberValue::Int(2))));
	}

	#[test]
	fn to_number_parses_strings() {
		let result = to_number(&[RuntimeValue::String("42".to_owned())]).unwrap();
		assert!(matches!(result, RuntimeValue::Number(NumberValue::Int(42))));
	}

	#[test]
	fn to_number_rejects_unparseable_strings() {
		assert!(to_number(&[RuntimeValue::String("abc".to_owned())]).is_err());
	}
}
