//! The tree-walking evaluator. Executes a type-checked `Program` directly against the AST: no
//! intermediate bytecode, no compilation step. State is kept to what §4.3 names: a global
//! environment, a function table, and a `should_return`/`return_value` pair used to unwind a
//! `ReturnStatement` back to the nearest active call frame.

pub mod builtins;
pub mod environment;
pub mod value;

use std::io::Write;

use crate::ast::{BinaryOperator, Expression, LiteralValue, Parameter, Program, Statement};

use environment::Environment;
use value::{ListHandle, NumberValue, RuntimeValue};

#[derive(Clone)]
struct UserFunction {
	params: Vec<Parameter>,
	body: Vec<Statement>,
}

pub struct Evaluator<'out> {
	globals: Environment,
	functions: std::collections::HashMap<String, UserFunction>,
	should_return: bool,
	return_value: RuntimeValue,
	call_depth: usize,
	max_depth: usize,
	output: &'out mut dyn Write,
}

/// Runs a whole program to completion, writing `print` output to `output`. `max_depth` bounds
/// recursive user function calls (§5); breaching it raises a runtime "stack overflow" error
/// instead of exhausting the host stack.
pub fn evaluate(program: &Program, max_depth: usize, output: &mut dyn Write) -> anyhow::Result<()> {
	let mut evaluator = Evaluator {
		globals: Environment::root(),
		functions: std::collections::HashMap::new(),
		should_return: false,
		return_value: RuntimeValue::Null,
		call_depth: 0,
		max_depth,
		output,
	};
	evaluator.run(program)
}

impl Evaluator<'_> {
	fn run(&mut self, program: &Program) -> anyhow::Result<()> {
		for statement in &program.body {
			if let Statement::FunctionDeclaration { name, params, body, .. } = statement {
				anyhow::ensure!(
					self.functions.insert(name.clone(), UserFunction { params: params.clone(), body: body.clone() }).is_none(),
					"Duplicate function declaration \"{name}\""
				);
			}
		}

		let global_env = self.globals.clone();
		for statement in &program.body {
			// Bare top-level expression statements are skipped by design (§4.3 point 2); function
			// declarations were already consumed above.
			if matches!(statement, Statement::FunctionDeclaration { .. } | Statement::Expression(_)) {
				continue;
			}
			self.execute_statement(&global_env, statement)?;
		}

		if self.functions.contains_key("main") {
			let main = self.functions["main"].clone();
			let frame = Environment::child(&self.globals);
			self.execute_block(&frame, &main.body)?;
		}

		Ok(())
	}

	fn execute_block(&mut self, env: &Environment, body: &[Statement]) -> anyhow::Result<()> {
		for statement in body {
			self.execute_statement(env, statement)?;
			if self.should_return {
				break;
			}
		}
		Ok(())
	}

	fn execute_statement(&mut self, env: &Environment, statement: &Statement) -> anyhow::Result<()> {
		match statement {
			Statement::VariableDeclaration { name, mutable, initializer, .. } => {
				let value = self.evaluate_expression(env, initializer)?;
				env.define(name, value, *mutable)
			},
			Statement::Assignment { target, value } => {
				let value = self.evaluate_expression(env, value)?;
				env.assign(target, value)
			},
			Statement::Expression(expression) => self.evaluate_expression(env, expression).map(drop),
			Statement::Block(body) => {
				let inner = Environment::child(env);
				self.execute_block(&inner, body)
			},
			Statement::ListPush { target, value } => self.execute_list_push(env, target, value),
			Statement::Return(argument) => {
				self.return_value = match argument {
					Some(argument) => self.evaluate_expression(env, argument)?,
					None => RuntimeValue::Null,
				};
				self.should_return = true;
				Ok(())
			},
			Statement::If { condition, consequent, alternate } => {
				if self.evaluate_expression(env, condition)?.is_truthy() {
					let inner = Environment::child(env);
					self.execute_block(&inner, consequent)
				} else if let Some(alternate) = alternate {
					let inner = Environment::child(env);
					self.execute_block(&inner, alternate)
				} else {
					Ok(())
				}
			},
			Statement::While { condition, body } => {
				while self.evaluate_expression(env, condition)?.is_truthy() {
					let inner = Environment::child(env);
					self.execute_block(&inner, body)?;
					if self.should_return {
						break;
					}
				}
				Ok(())
			},
			Statement::For { variable, iterable, body, is_index } => self.execute_for(env, variable, iterable, body, *is_index),
			Statement::FunctionDeclaration { .. } => Ok(()),
		}
	}

	fn execute_list_push(&mut self, env: &Environment, target: &Expression, value: &Expression) -> anyhow::Result<()> {
		let list = self.expect_list(env, target)?;
		let value = self.evaluate_expression(env, value)?;
		match value {
			RuntimeValue::List(pushed) => list.borrow_mut().extend(pushed.borrow().iter().cloned()),
			other => list.borrow_mut().push(other),
		}
		Ok(())
	}

	fn execute_for(&mut self, env: &Environment, variable: &str, iterable: &Expression, body: &[Statement], is_index: bool) -> anyhow::Result<()> {
		let list = self.expect_list(env, iterable)?;
		let snapshot: Vec<RuntimeValue> = list.borrow().clone();

		for (index, element) in snapshot.into_iter().enumerate() {
			let inner = Environment::child(env);
			let loop_value = if is_index { RuntimeValue::Number(NumberValue::Int(index as i64)) } else { element };
			inner.define(variable, loop_value, false)?;
			self.execute_block(&inner, body)?;
			if self.should_return {
				break;
			}
		}
		Ok(())
	}

	fn expect_list(&mut self, env: &Environment, expression: &Expression) -> anyhow::Result<ListHandle> {
		match self.evaluate_expression(env, expression)? {
			RuntimeValue::List(list) => Ok(list),
			other => anyhow::bail!("Expected a list, found {}", other.type_name()),
		}
	}

	fn evaluate_expression(&mut self, env: &Environment, expression: &Expression) -> anyhow::Result<RuntimeValue> {
		match expression {
			Expression::Literal(literal) => Ok(evaluate_literal(literal)),
			Expression::Variable(name) => env.get(name),
			Expression::Binary { operator, left, right } => self.evaluate_binary(env, *operator, left, right),
			Expression::FunctionCall { callee, arguments } => self.evaluate_call(env, callee, arguments),
			Expression::List(elements) => {
				let mut values = Vec::with_capacity(elements.len());
				for element in elements {
					values.push(self.evaluate_expression(env, element)?);
				}
				Ok(RuntimeValue::list_of(values))
			},
			Expression::Index { object, index } => self.evaluate_index(env, object, index),
		}
	}

	/// Left operand evaluates before the right, per §4.3 — observable through `print` side
	/// effects and list mutation inside either operand.
	fn evaluate_binary(&mut self, env: &Environment, operator: BinaryOperator, left: &Expression, right: &Expression) -> anyhow::Result<RuntimeValue> {
		let left = self.evaluate_expression(env, left)?;
		let right = self.evaluate_expression(env, right)?;

		if operator.is_equality() {
			let equal = left.value_equals(&right);
			return Ok(RuntimeValue::Bool(if matches!(operator, BinaryOperator::Equal) { equal } else { !equal }));
		}

		let (RuntimeValue::Number(left), RuntimeValue::Number(right)) = (&left, &right) else {
			anyhow::bail!("Operator \"{operator}\" requires two numbers, found {} and {}", left.type_name(), right.type_name());
		};

		if operator.is_comparison() {
			use std::cmp::Ordering;
			let ordering = left.compare(*right);
			let result = match operator {
				BinaryOperator::LessThan => ordering == Ordering::Less,
				BinaryOperator::LessEqual => ordering != Ordering::Greater,
				BinaryOperator::GreaterThan => ordering == Ordering::Greater,
				BinaryOperator::GreaterEqual => ordering != Ordering::Less,
				_ => unreachable!("equality operators handled above"),
			};
			return Ok(RuntimeValue::Bool(result));
		}

		let result = match operator {
			BinaryOperator::Add => left.add(*right),
			BinaryOperator::Subtract => left.subtract(*right),
			BinaryOperator::Multiply => left.multiply(*right),
			BinaryOperator::Divide => left.divide(*right)?,
			BinaryOperator::Modulo => left.modulo(*right)?,
			_ => unreachable!("comparison and equality operators handled above"),
		};
		Ok(RuntimeValue::Number(result))
	}

	fn evaluate_call(&mut self, env: &Environment, callee: &str, arguments: &[Expression]) -> anyhow::Result<RuntimeValue> {
		if callee == "print" {
			return self.call_print(env, arguments);
		}

		let mut values = Vec::with_capacity(arguments.len());
		for argument in arguments {
			values.push(self.evaluate_expression(env, argument)?);
		}

		if let Some(builtin) = builtins::BUILTINS.get(callee) {
			return builtin(&values);
		}

		self.call_user_function(callee, values)
	}

	fn call_print(&mut self, env: &Environment, arguments: &[Expression]) -> anyhow::Result<RuntimeValue> {
		let mut rendered = Vec::with_capacity(arguments.len());
		for argument in arguments {
			rendered.push(self.evaluate_expression(env, argument)?.stringify());
		}
		writeln!(self.output, "{}", rendered.join(" "))?;
		Ok(RuntimeValue::Null)
	}

	fn call_user_function(&mut self, callee: &str, arguments: Vec<RuntimeValue>) -> anyhow::Result<RuntimeValue> {
		let Some(function) = self.functions.get(callee).cloned() else {
			anyhow::bail!("Call to undefined function \"{callee}\"");
		};
		anyhow::ensure!(
			function.params.len() == arguments.len(),
			"Function \"{callee}\" expects {} argument(s), found {}",
			function.params.len(),
			arguments.len()
		);

		anyhow::ensure!(self.call_depth < self.max_depth, "Stack overflow: exceeded maximum call depth of {}", self.max_depth);
		self.call_depth += 1;

		// Parented to the global root, not the caller's environment: JAL has no closures or
		// first-class functions, so a callee never sees the caller's locals (lexical-to-global).
		let frame = Environment::child(&self.globals);
		for (parameter, value) in function.params.iter().zip(arguments) {
			frame.define(&parameter.name, value, false)?;
		}

		let outer_should_return = std::mem::replace(&mut self.should_return, false);
		let outer_return_value = std::mem::replace(&mut self.return_value, RuntimeValue::Null);

		let result = self.execute_block(&frame, &function.body);

		let returned = std::mem::replace(&mut self.return_value, outer_return_value);
		self.should_return = outer_should_return;
		self.call_depth -= 1;

		result?;
		Ok(returned)
	}

	fn evaluate_index(&mut self, env: &Environment, object: &Expression, index: &Expression) -> anyhow::Result<RuntimeValue> {
		let list = self.expect_list(env, object)?;
		let RuntimeValue::Number(NumberValue::Int(index)) = self.evaluate_expression(env, index)? else {
			anyhow::bail!("Index must be an integer");
		};

		let list = list.borrow();
		let resolved = usize::try_from(index).ok().filter(|&index| index < list.len());
		Ok(resolved.map_or(RuntimeValue::Null, |index| list[index].clone()))
	}
}

fn evaluate_literal(literal: &LiteralValue) -> RuntimeValue {
	match literal {
		LiteralValue::Int(value) => RuntimeValue::Number(NumberValue::Int(*value)),
		LiteralValue::Float(value) => RuntimeValue::Number(NumberValue::Float(*value)),
		LiteralValue::Bool(value) => RuntimeValue::Bool(*value),
		LiteralValue::String(value) => RuntimeValue::String(value.clone()),
		LiteralValue::Null => RuntimeValue::Null,
	}
}

#[cfg(test)]
mod tests {
	use crate::lexer::tokenize;
	use crate::parser::parse;

	use super::*;

	fn run(source: &str) -> String {
		let mut tokens = tokenize(source).unwrap();
		let program = parse(&mut tokens).unwrap();
		assert!(crate::checker::check(&program).is_empty());
		let mut output = Vec::new();
		evaluate(&program, 10_000, &mut output).unwrap();
		String::from_utf8(output).unwrap()
	}

	#[test]
	fn arithmetic_and_print() {
		assert_eq!(run("fn main():void { let x := 2 + 3 * 4; print(x) }"), "14\n");
	}

	#[test]
	fn integer_division_truncates() {
		assert_eq!(run("fn main():void { print(7 / 2) }"), "3\n");
	}

	#[test]
	fn list_push_and_spread() {
		assert_eq!(run("fn main():void { let a := [1]; a << 2; a << [3,4]; print(len(a)) }"), "4\n");
	}

	#[test]
	fn recursive_function() {
		assert_eq!(
			run("fn fact(n:int):int { if (n == 0) { return 1 } else { return n * fact(n - 1) } } fn main():void { print(fact(5)) }"),
			"120\n"
		);
	}

	#[test]
	fn stack_overflow_is_a_runtime_error() {
		let mut tokens = tokenize("fn f(n:int):int { return f(n + 1) } fn main():void { print(f(0)) }").unwrap();
		let program = parse(&mut tokens).unwrap();
		assert!(crate::checker::check(&program).is_empty());
		let mut output = Vec::new();
		let result = evaluate(&program, 64, &mut output);
		assert!(result.is_err());
	}
}
