//! An advisory type-inference pass that runs once the whole `Program` has been parsed. It fills
//! in the `type_annotation` field left blank by `let name := expr` declarations, using a
//! best-effort walk of the expression and the declarations seen so far in the same function body.
//!
//! This pass is advisory, not authoritative: it exists so that downstream AST consumers usually
//! see a concrete type on an inferred declaration instead of `None`, but it is not what makes a
//! program type-correct. The checker re-derives and verifies every type independently against its
//! own scoped symbol table, so a gap or mistake here can never let an ill-typed program through.

use std::collections::HashMap;

use crate::ast::{BinaryOperator, Expression, LiteralValue, Program, Statement, TypeAnnotation};

type Locals = HashMap<String, TypeAnnotation>;
type Functions = HashMap<String, TypeAnnotation>;

pub fn infer_types(program: &mut Program) {
	let functions = collect_function_return_types(&program.body);
	let mut locals = Locals::new();
	infer_block(&mut program.body, &functions, &mut locals);
}

fn collect_function_return_types(body: &[Statement]) -> Functions {
	let mut functions = Functions::new();
	for statement in body {
		if let Statement::FunctionDeclaration { name, return_type, .. } = statement {
			functions.insert(name.clone(), return_type.clone());
		}
	}
	functions
}

fn infer_block(body: &mut [Statement], functions: &Functions, locals: &mut Locals) {
	for statement in body {
		infer_statement(statement, functions, locals);
	}
}

fn infer_statement(statement: &mut Statement, functions: &Functions, locals: &mut Locals) {
	match statement {
		Statement::VariableDeclaration { name, type_annotation, initializer, .. } => {
			let inferred = infer_expression(initializer, functions, locals);
			if type_annotation.is_none() {
				*type_annotation = inferred.clone();
			}
			if let Some(annotation) = type_annotation.clone().or(inferred) {
				locals.insert(name.clone(), annotation);
			}
		},
		Statement::Assignment { value, .. } | Statement::Expression(value) => {
			infer_expression(value, functions, locals);
		},
		Statement::ListPush { target, value } => {
			infer_expression(target, functions, locals);
			infer_expression(value, functions, locals);
		},
		Statement::Return(Some(value)) => {
			infer_expression(value, functions, locals);
		},
		Statement::Return(None) => {},
		Statement::Block(body) => {
			let mut inner = locals.clone();
			infer_block(body, functions, &mut inner);
		},
		Statement::FunctionDeclaration { params, body, .. } => {
			let mut inner = Locals::new();
			for param in params.iter() {
				inner.insert(param.name.clone(), param.type_annotation.clone());
			}
			infer_block(body, functions, &mut inner);
		},
		Statement::If { condition, consequent, alternate } => {
			infer_expression(condition, functions, locals);
			let mut consequent_scope = locals.clone();
			infer_block(consequent, functions, &mut consequent_scope);
			if let Some(alternate) = alternate {
				let mut alternate_scope = locals.clone();
				infer_block(alternate, functions, &mut alternate_scope);
			}
		},
		Statement::While { condition, body } => {
			infer_expression(condition, functions, locals);
			let mut inner = locals.clone();
			infer_block(body, functions, &mut inner);
		},
		Statement::For { variable, iterable, body, is_index } => {
			let iterable_type = infer_expression(iterable, functions, locals);
			let mut inner = locals.clone();
			let loop_variable_type = if *is_index {
				Some(TypeAnnotation::int(32))
			} else {
				match iterable_type {
					Some(TypeAnnotation::List { element }) => Some(*element),
					_ => None,
				}
			};
			if let Some(annotation) = loop_variable_type {
				inner.insert(variable.clone(), annotation);
			}
			infer_block(body, functions, &mut inner);
		},
	}
}

/// Returns this expression's static type if it can be determined without a full scope-aware
/// checker, i.e. without reporting an error when it can't. Recurses into subexpressions purely to
/// keep advisory information flowing (e.g. annotating nested list literals), not to validate
/// anything.
fn infer_expression(expression: &mut Expression, functions: &Functions, locals: &Locals) -> Option<TypeAnnotation> {
	match expression {
		Expression::Literal(literal) => Some(match literal {
			LiteralValue::Int(_) => TypeAnnotation::int(32),
			LiteralValue::Float(_) => TypeAnnotation::float(32),
			LiteralValue::Bool(_) => TypeAnnotation::Bool,
			LiteralValue::String(_) => TypeAnnotation::String,
			LiteralValue::Null => TypeAnnotation::Void,
		}),
		Expression::Variable(name) => locals.get(name).cloned(),
		Expression::Binary { operator, left, right } => {
			let left_type = infer_expression(left, functions, locals);
			let right_type = infer_expression(right, functions, locals);
			if operator.is_comparison() {
				return Some(TypeAnnotation::Bool);
			}
			match (left_type, right_type) {
				(Some(TypeAnnotation::Int { bits: left }), Some(TypeAnnotation::Int { bits: right })) if matches!(operator, BinaryOperator::Divide) => {
					Some(TypeAnnotation::int(left.max(right)))
				},
				(Some(left), Some(right)) if left.is_numeric() && right.is_numeric() => Some(left.wider(&right)),
				_ => None,
			}
		},
		Expression::FunctionCall { callee, arguments } => {
			for argument in arguments.iter_mut() {
				infer_expression(argument, functions, locals);
			}
			builtin_return_type(callee).or_else(|| functions.get(callee).cloned())
		},
		Expression::List(elements) => {
			let mut element_type = None;
			for element in elements.iter_mut() {
				let inferred = infer_expression(element, functions, locals);
				element_type = element_type.or(inferred);
			}
			Some(TypeAnnotation::list(element_type.unwrap_or(TypeAnnotation::Void)))
		},
		Expression::Index { object, index } => {
			infer_expression(index, functions, locals);
			match infer_expression(object, functions, locals) {
				Some(TypeAnnotation::List { element }) => Some(*element),
				_ => None,
			}
		},
	}
}

fn builtin_return_type(name: &str) -> Option<TypeAnnotation> {
	match name {
		"print" => Some(TypeAnnotation::Void),
		"len" => Some(TypeAnnotation::int(32)),
		"type" | "stringify" => Some(TypeAnnotation::String),
		"toNumber" => Some(TypeAnnotation::int(32)),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use crate::lexer::tokenize;
	use crate::parser::parse;

	use super::*;

	#[test]
	fn fills_in_inferred_declaration_type() {
		let mut tokens = tokenize("let x := 2 + 3").unwrap();
		let program = parse(&mut tokens).unwrap();
		match &program.body[0] {
			Statement::VariableDeclaration { type_annotation, .. } => {
				assert_eq!(type_annotation.as_ref(), Some(&TypeAnnotation::int(32)));
			},
			_ => panic!("expected a variable declaration"),
		}
	}

	#[test]
	fn mixed_int_float_infers_float() {
		let mut tokens = tokenize("let x := 2 + 3.0").unwrap();
		let program = parse(&mut tokens).unwrap();
		match &program.body[0] {
			Statement::VariableDeclaration { type_annotation, .. } => {
				assert_eq!(type_annotation.as_ref(), Some(&TypeAnnotation::float(32)));
			},
			_ => panic!("expected a variable declaration"),
		}
	}

	#[test]
	fn explicit_annotation_is_left_untouched() {
		let mut tokens = tokenize("let x: i64 = 2 + 3").unwrap();
		let program = parse(&mut tokens).unwrap();
		match &program.body[0] {
			Statement::VariableDeclaration { type_annotation, .. } => {
				assert_eq!(type_annotation.as_ref(), Some(&TypeAnnotation::int(64)));
			},
			_ => panic!("expected a variable declaration"),
		}
	}
}
