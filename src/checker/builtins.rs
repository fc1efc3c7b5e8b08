//! Type rules for the five host-provided functions, checked ahead of the user function table so
//! that a program can't shadow them by declaring a function with the same name (the registration
//! pass never inserts them, so any attempt is simply a second, unrelated function with that name
//! and these rules still take priority at the call site).

use crate::ast::{is_builtin, TypeAnnotation};

use super::Checker;

/// Returns `Some(return type)` if `name` is a built-in and its call was checked against the
/// built-in's rules (pushing any arity/type errors onto `checker`), or `None` if `name` isn't one
/// of the five built-ins at all.
pub(super) fn check_builtin_call(checker: &mut Checker, name: &str, argument_types: &[TypeAnnotation]) -> Option<TypeAnnotation> {
	if !is_builtin(name) {
		return None;
	}

	Some(match name {
		"print" => TypeAnnotation::Void,
		"len" => {
			require_arity(checker, name, argument_types, 1);
			if let Some(argument) = argument_types.first() {
				if !matches!(argument, TypeAnnotation::String | TypeAnnotation::List { .. }) {
					checker.errors.push(format!("\"len\" requires a string or list argument, found {argument}"));
				}
			}
			TypeAnnotation::int(32)
		},
		"type" | "stringify" => {
			require_arity(checker, name, argument_types, 1);
			TypeAnnotation::String
		},
		"toNumber" => {
			require_arity(checker, name, argument_types, 1);
			TypeAnnotation::int(32)
		},
		_ => unreachable!("is_builtin only accepts the names matched above"),
	})
}

fn require_arity(checker: &mut Checker, name: &str, argument_types: &[TypeAnnotation], expected: usize) {
	if argument_types.len() != expected {
		checker.errors.push(format!("\"{name}\" expects {expected} argument(s), found {}", argument_types.len()));
	}
}
