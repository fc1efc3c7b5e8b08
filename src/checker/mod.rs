//! The type checker. Walks a `Program` once, after the parser's advisory inference pass, and
//! produces an ordered list of error messages. An empty list means the program is well-typed and
//! may proceed to evaluation; checking never stops at the first error; it keeps accumulating for
//! as long as its own recursion can continue to make sense of the tree.

mod builtins;

use std::collections::HashMap;

use crate::ast::{BinaryOperator, Expression, LiteralValue, Parameter, Program, Statement, TypeAnnotation};

/// A named binding visible in some scope, with the mutability rules from §3/§4.2: a `const`
/// binding can never be reassigned, and a `let` binding in an outer scope blocks a `const`
/// shadowing it in the same name (checked in `define_symbol`).
#[derive(Debug, Clone)]
struct Symbol {
	annotation: TypeAnnotation,
	mutable: bool,
}

#[derive(Debug, Clone)]
struct FunctionSymbol {
	params: Vec<Parameter>,
	return_type: TypeAnnotation,
}

struct Checker {
	functions: HashMap<String, FunctionSymbol>,
	scopes: Vec<HashMap<String, Symbol>>,
	errors: Vec<String>,
	current_return_type: Option<TypeAnnotation>,
}

/// Type-checks a whole program and returns the accumulated error messages, in the order they
/// were discovered. An empty vector means the program type-checks cleanly.
#[must_use]
pub fn check(program: &Program) -> Vec<String> {
	let mut checker = Checker { functions: HashMap::new(), scopes: vec![HashMap::new()], errors: Vec::new(), current_return_type: None };
	checker.register_functions(&program.body);
	checker.check_block(&program.body);
	checker.errors
}

impl Checker {
	fn register_functions(&mut self, body: &[Statement]) {
		for statement in body {
			if let Statement::FunctionDeclaration { name, params, return_type, .. } = statement {
				if self.functions.contains_key(name) {
					self.errors.push(format!("Duplicate function declaration \"{name}\""));
					continue;
				}
				self.functions.insert(name.clone(), FunctionSymbol { params: params.clone(), return_type: return_type.clone() });
			}
		}
	}

	fn push_scope(&mut self) {
		self.scopes.push(HashMap::new());
	}

	fn pop_scope(&mut self) {
		self.scopes.pop();
	}

	/// Enforces §4.2's `defineSymbol` rules: no redefinition within the current scope, and no
	/// shadowing a `const` from an outer scope.
	fn define_symbol(&mut self, name: &str, annotation: TypeAnnotation, mutable: bool) {
		let current = self.scopes.last().expect("checker always has at least the global scope");
		if current.contains_key(name) {
			self.errors.push(format!("Duplicate declaration of \"{name}\" in this scope"));
			return;
		}

		for scope in self.scopes[..self.scopes.len() - 1].iter().rev() {
			if let Some(outer) = scope.get(name) {
				if !outer.mutable {
					self.errors.push(format!("Cannot redeclare \"{name}\": an outer \"const\" binding with that name already exists"));
					return;
				}
				break;
			}
		}

		self.scopes.last_mut().expect("checked above").insert(name.to_owned(), Symbol { annotation, mutable });
	}

	fn resolve(&self, name: &str) -> Option<&Symbol> {
		self.scopes.iter().rev().find_map(|scope| scope.get(name))
	}

	/// Pre-registers every declaration visible in this statement sequence (so later statements may
	/// reference a binding introduced earlier in the same block, per §4.2), then checks each
	/// statement in textual order.
	fn check_block(&mut self, body: &[Statement]) {
		for statement in body {
			if let Statement::VariableDeclaration { name, mutable, type_annotation, initializer } = statement {
				let annotation = type_annotation.clone().unwrap_or_else(|| self.type_of(initializer));
				self.define_symbol(name, annotation, *mutable);
			}
		}
		for statement in body {
			self.check_statement(statement);
		}
	}

	fn check_statement(&mut self, statement: &Statement) {
		match statement {
			Statement::VariableDeclaration { name, type_annotation, initializer, .. } => {
				let inferred = self.type_of(initializer);
				if let Some(annotation) = type_annotation {
					if !annotation.matches(&inferred) {
						self.errors.push(format!("Variable \"{name}\" declared as {annotation} but initialized with {inferred}"));
					}
				}
			},
			Statement::Assignment { target, value } => {
				let value_type = self.type_of(value);
				match self.resolve(target).cloned() {
					None => self.errors.push(format!("Assignment to undefined variable \"{target}\"")),
					Some(symbol) if !symbol.mutable => {
						self.errors.push(format!("Cannot assign to immutable variable \"{target}\""));
					},
					Some(symbol) if !symbol.annotation.matches(&value_type) => {
						self.errors.push(format!("Cannot assign {value_type} to \"{target}\" of type {}", symbol.annotation));
					},
					Some(_) => {},
				}
			},
			Statement::Expression(expression) => {
				self.type_of(expression);
			},
			Statement::Block(body) => {
				self.push_scope();
				self.check_block(body);
				self.pop_scope();
			},
			Statement::ListPush { target, value } => self.check_list_push(target, value),
			Statement::Return(argument) => self.check_return(argument.as_ref()),
			Statement::If { condition, consequent, alternate } => {
				let condition_type = self.type_of(condition);
				if condition_type != TypeAnnotation::Bool {
					self.errors.push(format!("If-condition must be bool, found {condition_type}"));
				}
				self.push_scope();
				self.check_block(consequent);
				self.pop_scope();
				if let Some(alternate) = alternate {
					self.push_scope();
					self.check_block(alternate);
					self.pop_scope();
				}
			},
			Statement::While { condition, body } => {
				let condition_type = self.type_of(condition);
				if condition_type != TypeAnnotation::Bool {
					self.errors.push(format!("While-condition must be bool, found {condition_type}"));
				}
				self.push_scope();
				self.check_block(body);
				self.pop_scope();
			},
			Statement::For { variable, iterable, body, is_index } => self.check_for(variable, iterable, body, *is_index),
			Statement::FunctionDeclaration { name, params, return_type, body } => self.check_function_declaration(name, params, return_type, body),
		}
	}

	fn check_list_push(&mut self, target: &Expression, value: &Expression) {
		let target_type = self.type_of(target);
		let TypeAnnotation::List { element } = &target_type else {
			self.errors.push(format!("Cannot push to non-list type {target_type}"));
			return;
		};

		if let Expression::Variable(name) = target {
			if let Some(symbol) = self.resolve(name) {
				if !symbol.mutable {
					self.errors.push(format!("Cannot push to immutable list \"{name}\""));
				}
			}
		}

		if matches!(element.as_ref(), TypeAnnotation::Void) {
			return;
		}

		let value_type = self.type_of(value);
		// The evaluator always spreads a pushed list's elements rather than appending it as one
		// element (§4.3), so a list-typed value is only compatible when *its* element type matches,
		// never by matching the whole list type against `element` directly.
		let compatible = match &value_type {
			TypeAnnotation::List { element: pushed } => element.matches(pushed),
			_ => element.matches(&value_type),
		};
		if !compatible {
			self.errors.push(format!("Cannot push {value_type} onto a list of {element}"));
		}
	}

	fn check_return(&mut self, argument: Option<&Expression>) {
		let Some(expected) = self.current_return_type.clone() else {
			self.errors.push("Return statement outside of a function".to_owned());
			return;
		};

		match argument {
			None if expected != TypeAnnotation::Void => {
				self.errors.push(format!("Missing return value; function declares return type {expected}"));
			},
			None => {},
			Some(argument) => {
				let actual = self.type_of(argument);
				if !expected.matches(&actual) {
					self.errors.push(format!("Return type mismatch: expected {expected}, found {actual}"));
				}
			},
		}
	}

	fn check_for(&mut self, variable: &str, iterable: &Expression, body: &[Statement], is_index: bool) {
		let iterable_type = self.type_of(iterable);
		let element_type = match &iterable_type {
			TypeAnnotation::List { element } => (**element).clone(),
			other => {
				self.errors.push(format!("For-loop iterable must be a list, found {other}"));
				TypeAnnotation::Void
			},
		};

		self.push_scope();
		let loop_type = if is_index { TypeAnnotation::int(32) } else { element_type };
		self.define_symbol(variable, loop_type, false);
		self.check_block(body);
		self.pop_scope();
	}

	fn check_function_declaration(&mut self, name: &str, params: &[Parameter], return_type: &TypeAnnotation, body: &[Statement]) {
		self.push_scope();
		for param in params {
			self.define_symbol(&param.name, param.type_annotation.clone(), false);
		}

		let outer_return_type = self.current_return_type.replace(return_type.clone());
		self.check_block(body);
		self.current_return_type = outer_return_type;
		self.pop_scope();

		if !matches!(return_type, TypeAnnotation::Void) && !body_always_returns(body) {
			self.errors.push(format!("Function \"{name}\" does not return a value on every path, but declares return type {return_type}"));
		}
	}

	/// Derives an expression's static type, pushing an error and returning `TypeAnnotation::Void`
	/// as a sentinel wherever the expression is itself ill-typed, so that checking the surrounding
	/// construct can continue without cascading unrelated errors.
	fn type_of(&mut self, expression: &Expression) -> TypeAnnotation {
		match expression {
			Expression::Literal(literal) => type_of_literal(literal),
			Expression::Variable(name) => match self.resolve(name) {
				Some(symbol) => symbol.annotation.clone(),
				None => {
					self.errors.push(format!("Undefined variable \"{name}\""));
					TypeAnnotation::Void
				},
			},
			Expression::Binary { operator, left, right } => self.type_of_binary(*operator, left, right),
			Expression::FunctionCall { callee, arguments } => self.type_of_call(callee, arguments),
			Expression::List(elements) => self.type_of_list(elements),
			Expression::Index { object, index } => self.type_of_index(object, index),
		}
	}

	fn type_of_binary(&mut self, operator: BinaryOperator, left: &Expression, right: &Expression) -> TypeAnnotation {
		let left_type = self.type_of(left);
		let right_type = self.type_of(right);

		if operator.is_equality() {
			return TypeAnnotation::Bool;
		}

		if !left_type.is_numeric() || !right_type.is_numeric() {
			self.errors.push(format!("Operator \"{operator}\" requires two numbers, found {left_type} and {right_type}"));
			return TypeAnnotation::Void;
		}

		if operator.is_comparison() {
			return TypeAnnotation::Bool;
		}

		if matches!(operator, BinaryOperator::Divide) {
			if let (TypeAnnotation::Int { .. }, TypeAnnotation::Int { .. }) = (&left_type, &right_type) {
				return left_type;
			}
		}

		left_type.wider(&right_type)
	}

	fn type_of_call(&mut self, callee: &str, arguments: &[Expression]) -> TypeAnnotation {
		let argument_types: Vec<TypeAnnotation> = arguments.iter().map(|argument| self.type_of(argument)).collect();

		if let Some(result) = builtins::check_builtin_call(self, callee, &argument_types) {
			return result;
		}

		let Some(function) = self.functions.get(callee).cloned() else {
			self.errors.push(format!("Call to undefined function \"{callee}\""));
			return TypeAnnotation::Void;
		};

		if function.params.len() != argument_types.len() {
			self.errors.push(format!(
				"Function \"{callee}\" expects {} argument(s), found {}",
				function.params.len(),
				argument_types.len()
			));
			return function.return_type;
		}

		for (index, (parameter, actual)) in function.params.iter().zip(argument_types.iter()).enumerate() {
			if !parameter.type_annotation.matches(actual) {
				self.errors.push(format!(
					"Argument {} to \"{callee}\" should be {}, found {actual}",
					index + 1,
					parameter.type_annotation
				));
			}
		}

		function.return_type
	}

	fn type_of_list(&mut self, elements: &[Expression]) -> TypeAnnotation {
		let Some((first, rest)) = elements.split_first() else {
			return TypeAnnotation::list(TypeAnnotation::Void);
		};

		let element_type = self.type_of(first);
		for element in rest {
			let other = self.type_of(element);
			if !element_type.matches(&other) {
				self.errors.push(format!("List elements must share a type: found both {element_type} and {other}"));
			}
		}

		TypeAnnotation::list(element_type)
	}

	fn type_of_index(&mut self, object: &Expression, index: &Expression) -> TypeAnnotation {
		let object_type = self.type_of(object);
		let index_type = self.type_of(index);

		if !matches!(index_type, TypeAnnotation::Int { .. }) {
			self.errors.push(format!("Index must be an integer, found {index_type}"));
		}

		match object_type {
			TypeAnnotation::List { element } => *element,
			other => {
				self.errors.push(format!("Cannot index into non-list type {other}"));
				TypeAnnotation::Void
			},
		}
	}
}

fn type_of_literal(literal: &LiteralValue) -> TypeAnnotation {
	match literal {
		LiteralValue::Int(_) => TypeAnnotation::int(32),
		LiteralValue::Float(_) => TypeAnnotation::float(32),
		LiteralValue::Bool(_) => TypeAnnotation::Bool,
		LiteralValue::String(_) => TypeAnnotation::String,
		LiteralValue::Null => TypeAnnotation::Void,
	}
}

/// True if every control-flow path through `body` is guaranteed to hit a `Return`. Used to reject
/// non-`void` functions that can fall off the end of their body without returning a value.
fn body_always_returns(body: &[Statement]) -> bool {
	body.iter().any(statement_always_returns)
}

fn statement_always_returns(statement: &Statement) -> bool {
	match statement {
		Statement::Return(_) => true,
		Statement::Block(body) => body_always_returns(body),
		Statement::If { consequent, alternate: Some(alternate), .. } => body_always_returns(consequent) && body_always_returns(alternate),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use crate::lexer::tokenize;
	use crate::parser::parse;

	use super::check;

	fn errors_for(source: &str) -> Vec<String> {
		let mut tokens = tokenize(source).unwrap();
		let program = parse(&mut tokens).unwrap();
		check(&program)
	}

	#[test]
	fn accepts_well_typed_program() {
		let errors = errors_for("fn main():void { let x := 2 + 3 * 4; print(x) }");
		assert!(errors.is_empty(), "{errors:?}");
	}

	#[test]
	fn rejects_mutation_of_const() {
		let errors = errors_for("fn main():void { const k := 1; k = 2 }");
		assert!(errors.iter().any(|error| error.contains("immutable") && error.contains('k')), "{errors:?}");
	}

	#[test]
	fn rejects_undefined_variable() {
		let errors = errors_for("fn main():void { print(missing) }");
		assert!(errors.iter().any(|error| error.contains("Undefined variable")), "{errors:?}");
	}

	#[test]
	fn rejects_missing_return_on_non_void_function() {
		let errors = errors_for("fn f():int { let x := 1 }");
		assert!(errors.iter().any(|error| error.contains("does not return")), "{errors:?}");
	}

	#[test]
	fn accepts_if_else_with_returns_on_both_branches() {
		let errors = errors_for("fn f(n:int):int { if (n == 0) { return 1 } else { return 2 } }");
		assert!(errors.is_empty(), "{errors:?}");
	}

	#[test]
	fn rejects_duplicate_function_declarations() {
		let errors = errors_for("fn f():void { } fn f():void { }");
		assert!(errors.iter().any(|error| error.contains("Duplicate function")), "{errors:?}");
	}

	#[test]
	fn rejects_arity_mismatch() {
		let errors = errors_for("fn add(a:int, b:int):int { return a + b } fn main():void { print(add(1)) }");
		assert!(errors.iter().any(|error| error.contains("argument")), "{errors:?}");
	}
}
