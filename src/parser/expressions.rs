//! Expression parsing: a table of binary-operator precedence levels, climbed from lowest to
//! highest, bottoming out at postfix index access and primary expressions. The levels are data
//! (a slice of token/operator pairs per level) rather than one hand-written function per
//! precedence tier, so adding or reordering an operator is a one-line change to `LEVELS`.

use crate::ast::{BinaryOperator, Expression, LiteralValue};
use crate::lexer::TokenType;

use super::{parse_arguments, TokenQueue, TokenQueueFunctionality};

/// Precedence levels from loosest-binding to tightest-binding. Comparison and equality share a
/// level (JAL doesn't chain comparisons, so there's no ambiguity in treating `<` and `==` as
/// equally loose), additive binds tighter than that, and multiplicative binds tightest of all.
const LEVELS: &[&[(TokenType, BinaryOperator)]] = &[
	&[
		(TokenType::EqualEqual, BinaryOperator::Equal),
		(TokenType::NotEqual, BinaryOperator::NotEqual),
		(TokenType::LessThan, BinaryOperator::LessThan),
		(TokenType::LessEqual, BinaryOperator::LessEqual),
		(TokenType::GreaterThan, BinaryOperator::GreaterThan),
		(TokenType::GreaterEqual, BinaryOperator::GreaterEqual),
	],
	&[(TokenType::Plus, BinaryOperator::Add), (TokenType::Minus, BinaryOperator::Subtract)],
	&[
		(TokenType::Asterisk, BinaryOperator::Multiply),
		(TokenType::ForwardSlash, BinaryOperator::Divide),
		(TokenType::Percent, BinaryOperator::Modulo),
	],
];

pub fn parse_expression(tokens: &mut TokenQueue) -> anyhow::Result<Expression> {
	parse_level(tokens, 0)
}

fn parse_level(tokens: &mut TokenQueue, level: usize) -> anyhow::Result<Expression> {
	let Some(operators) = LEVELS.get(level) else {
		return parse_postfix(tokens);
	};

	let mut left = parse_level(tokens, level + 1)?;

	while let Some(&(_, operator)) = operators.iter().find(|(token_type, _)| tokens.next_is(*token_type)) {
		tokens.pop_front();
		let right = parse_level(tokens, level + 1)?;
		left = Expression::Binary { operator, left: Box::new(left), right: Box::new(right) };
	}

	Ok(left)
}

/// Applies zero or more trailing `[index]` accesses to a primary expression, left to right, so
/// that `matrix[0][1]` parses as `Index(Index(matrix, 0), 1)`.
fn parse_postfix(tokens: &mut TokenQueue) -> anyhow::Result<Expression> {
	let mut expression = parse_primary(tokens)?;

	while tokens.next_is(TokenType::OpenBracket) {
		tokens.pop(TokenType::OpenBracket)?;
		let index = parse_expression(tokens)?;
		tokens.pop(TokenType::CloseBracket)?;
		expression = Expression::Index { object: Box::new(expression), index: Box::new(index) };
	}

	Ok(expression)
}

fn parse_primary(tokens: &mut TokenQueue) -> anyhow::Result<Expression> {
	match tokens.peek_type()? {
		TokenType::Number => parse_number(tokens),
		TokenType::String => parse_string(tokens),
		TokenType::Minus => parse_negation(tokens),
		TokenType::OpenParen => parse_parenthesized(tokens),
		TokenType::OpenBracket => parse_list_literal(tokens),
		TokenType::Identifier if tokens.peek_type2()? == TokenType::OpenParen => parse_call(tokens),
		TokenType::Identifier => {
			let name = tokens.pop(TokenType::Identifier)?.value;
			match name.as_str() {
				"true" => Ok(Expression::Literal(LiteralValue::Bool(true))),
				"false" => Ok(Expression::Literal(LiteralValue::Bool(false))),
				"null" => Ok(Expression::Literal(LiteralValue::Null)),
				_ => Ok(Expression::Variable(name)),
			}
		},
		other => anyhow::bail!("Unexpected token {other} in expression (at token {})", tokens.current_index()),
	}
}

fn parse_number(tokens: &mut TokenQueue) -> anyhow::Result<Expression> {
	let value = tokens.pop(TokenType::Number)?.value;
	if value.contains('.') {
		let parsed: f64 = value.parse().map_err(|_| anyhow::anyhow!("Malformed float literal \"{value}\""))?;
		Ok(Expression::Literal(LiteralValue::Float(parsed)))
	} else {
		let parsed: i64 = value.parse().map_err(|_| anyhow::anyhow!("Malformed integer literal \"{value}\""))?;
		Ok(Expression::Literal(LiteralValue::Int(parsed)))
	}
}

fn parse_string(tokens: &mut TokenQueue) -> anyhow::Result<Expression> {
	let raw = tokens.pop(TokenType::String)?.value;
	let unquoted = raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')).unwrap_or(&raw);
	Ok(Expression::Literal(LiteralValue::String(unquoted.to_owned())))
}

/// Unary minus is folded into a `0 - expr` binary subtraction rather than carrying its own AST
/// node, since the checker and evaluator already know how to widen and evaluate `Subtract`.
fn parse_negation(tokens: &mut TokenQueue) -> anyhow::Result<Expression> {
	tokens.pop(TokenType::Minus)?;
	let operand = parse_postfix(tokens)?;
	Ok(Expression::Binary {
		operator: BinaryOperator::Subtract,
		left: Box::new(Expression::Literal(LiteralValue::Int(0))),
		right: Box::new(operand),
	})
}

fn parse_parenthesized(tokens: &mut TokenQueue) -> anyhow::Result<Expression> {
	tokens.pop(TokenType::OpenParen)?;
	let inner = parse_expression(tokens)?;
	tokens.pop(TokenType::CloseParen)?;
	Ok(inner)
}

fn parse_list_literal(tokens: &mut TokenQueue) -> anyhow::Result<Expression> {
	tokens.pop(TokenType::OpenBracket)?;
	let mut elements = Vec::new();
	while !tokens.next_is(TokenType::CloseBracket) {
		elements.push(parse_expression(tokens)?);
		if tokens.next_is(TokenType::Comma) {
			tokens.pop(TokenType::Comma)?;
		} else {
			break;
		}
	}
	tokens.pop(TokenType::CloseBracket)?;
	Ok(Expression::List(elements))
}

fn parse_call(tokens: &mut TokenQueue) -> anyhow::Result<Expression> {
	let callee = tokens.pop(TokenType::Identifier)?.value;
	let arguments = parse_arguments(tokens)?;
	Ok(Expression::FunctionCall { callee, arguments })
}

#[cfg(test)]
mod tests {
	use crate::lexer::tokenize;

	use super::*;

	fn parse(source: &str) -> Expression {
		let mut tokens = tokenize(source).unwrap();
		let expression = parse_expression(&mut tokens).unwrap();
		assert_eq!(tokens.len(), 1, "expected only Eof left over");
		expression
	}

	#[test]
	fn multiplication_binds_tighter_than_addition() {
		let expression = parse("2 + 3 * 4");
		match expression {
			Expression::Binary { operator: BinaryOperator::Add, right, .. } => {
				assert!(matches!(*right, Expression::Binary { operator: BinaryOperator::Multiply, .. }));
			},
			_ => panic!("expected a top-level addition"),
		}
	}

	#[test]
	fn comparison_binds_looser_than_addition() {
		let expression = parse("1 + 1 == 2");
		assert!(matches!(expression, Expression::Binary { operator: BinaryOperator::Equal, .. }));
	}

	#[test]
	fn nested_index_access_is_left_associative() {
		let expression = parse("matrix[0][1]");
		match expression {
			Expression::Index { object, .. } => assert!(matches!(*object, Expression::Index { .. })),
			_ => panic!("expected a nested index expression"),
		}
	}

	#[test]
	fn parses_function_call_with_arguments() {
		let expression = parse("add(1, 2)");
		match expression {
			Expression::FunctionCall { callee, arguments } => {
				assert_eq!(callee, "add");
				assert_eq!(arguments.len(), 2);
			},
			_ => panic!("expected a function call"),
		}
	}

	#[test]
	fn unary_minus_desugars_to_subtraction_from_zero() {
		let expression = parse("-x");
		assert!(matches!(expression, Expression::Binary { operator: BinaryOperator::Subtract, .. }));
	}
}
