//! Statement-level parsing: declarations, control flow, assignment, and list push. Dispatch is a
//! single match over the next one or two tokens, per spec: keywords route directly, an
//! `identifier =` pair is an assignment, an `identifier <<` pair is a list push, and anything
//! else falls through to a bare expression statement.

use super::{parse_block_body, parse_parameters, parse_type_annotation, skip_optional_semicolon, TokenQueue, TokenQueueFunctionality};
use crate::ast::Statement;
use crate::lexer::TokenType;

use super::expressions::parse_expression;

pub fn parse_statement(tokens: &mut TokenQueue) -> anyhow::Result<Statement> {
	let statement = match tokens.peek_type()? {
		TokenType::Let => parse_variable_declaration(tokens, true),
		TokenType::Const => parse_variable_declaration(tokens, false),
		TokenType::Fn => parse_function_declaration(tokens),
		TokenType::Return => parse_return(tokens),
		TokenType::If => parse_if(tokens),
		TokenType::While => parse_while(tokens),
		TokenType::For => parse_for(tokens),
		TokenType::OpenBrace => Ok(Statement::Block(parse_block_body(tokens)?)),
		TokenType::Identifier if tokens.peek_type2()? == TokenType::Equal => parse_assignment(tokens),
		TokenType::Identifier if tokens.peek_type2()? == TokenType::ListPush => parse_list_push(tokens),
		_ => Ok(Statement::Expression(parse_expression(tokens)?)),
	}?;
	skip_optional_semicolon(tokens);
	Ok(statement)
}

fn parse_variable_declaration(tokens: &mut TokenQueue, mutable: bool) -> anyhow::Result<Statement> {
	tokens.pop(if mutable { TokenType::Let } else { TokenType::Const })?;
	let name = tokens.pop(TokenType::Identifier)?.value;

	let type_annotation = if tokens.next_is(TokenType::Colon) {
		tokens.pop(TokenType::Colon)?;
		let annotation = parse_type_annotation(tokens)?;
		tokens.pop(TokenType::Equal)?;
		Some(annotation)
	} else {
		tokens.pop(TokenType::InferAssign)?;
		None
	};

	let initializer = parse_expression(tokens)?;
	Ok(Statement::VariableDeclaration {
		name,
		mutable,
		type_annotation,
		initializer,
	})
}

fn parse_assignment(tokens: &mut TokenQueue) -> anyhow::Result<Statement> {
	let target = tokens.pop(TokenType::Identifier)?.value;
	tokens.pop(TokenType::Equal)?;
	let value = parse_expression(tokens)?;
	Ok(Statement::Assignment { target, value })
}

fn parse_list_push(tokens: &mut TokenQueue) -> anyhow::Result<Statement> {
	let target_name = tokens.pop(TokenType::Identifier)?.value;
	tokens.pop(TokenType::ListPush)?;
	let value = parse_expression(tokens)?;
	Ok(Statement::ListPush {
		target: crate::ast::Expression::Variable(target_name),
		value,
	})
}

fn parse_function_declaration(tokens: &mut TokenQueue) -> anyhow::Result<Statement> {
	tokens.pop(TokenType::Fn)?;
	let name = tokens.pop(TokenType::Identifier)?.value;
	let params = parse_parameters(tokens)?;
	tokens.pop(TokenType::Colon)?;
	let return_type = parse_type_annotation(tokens)?;
	let body = parse_block_body(tokens)?;
	Ok(Statement::FunctionDeclaration { name, params, return_type, body })
}

fn parse_return(tokens: &mut TokenQueue) -> anyhow::Result<Statement> {
	tokens.pop(TokenType::Return)?;
	if tokens.next_is(TokenType::CloseBrace) || tokens.next_is(TokenType::Semicolon) {
		return Ok(Statement::Return(None));
	}
	Ok(Statement::Return(Some(parse_expression(tokens)?)))
}

fn parse_if(tokens: &mut TokenQueue) -> anyhow::Result<Statement> {
	tokens.pop(TokenType::If)?;
	tokens.pop(TokenType::OpenParen)?;
	let condition = parse_expression(tokens)?;
	tokens.pop(TokenType::CloseParen)?;
	let consequent = parse_block_body(tokens)?;
	let alternate = if tokens.next_is(TokenType::Else) {
		tokens.pop(TokenType::Else)?;
		Some(parse_block_body(tokens)?)
	} else {
		None
	};
	Ok(Statement::If { condition, consequent, alternate })
}

fn parse_while(tokens: &mut TokenQueue) -> anyhow::Result<Statement> {
	tokens.pop(TokenType::While)?;
	tokens.pop(TokenType::OpenParen)?;
	let condition = parse_expression(tokens)?;
	tokens.pop(TokenType::CloseParen)?;
	let body = parse_block_body(tokens)?;
	Ok(Statement::While { condition, body })
}

/// `for name (of|in) expr { ... }`. `of` yields the index of each element as the loop variable,
/// `in` yields the element itself; `is_index` records which.
fn parse_for(tokens: &mut TokenQueue) -> anyhow::Result<Statement> {
	tokens.pop(TokenType::For)?;
	let variable = tokens.pop(TokenType::Identifier)?.value;

	let is_index = match tokens.peek_type()? {
		TokenType::Of => {
			tokens.pop(TokenType::Of)?;
			true
		},
		TokenType::In => {
			tokens.pop(TokenType::In)?;
			false
		},
		other => anyhow::bail!("Expected \"of\" or \"in\" in for-loop, found {other} (at token {})", tokens.current_index()),
	};

	let iterable = parse_expression(tokens)?;
	let body = parse_block_body(tokens)?;
	Ok(Statement::For { variable, iterable, body, is_index })
}

#[cfg(test)]
mod tests {
	use crate::lexer::tokenize;
	use crate::parser::parse;

	#[test]
	fn parses_inferred_and_typed_declarations() {
		let mut tokens = tokenize("let a := 1; const b: string = \"hi\"").unwrap();
		let program = parse(&mut tokens).unwrap();
		assert_eq!(program.body.len(), 2);
	}

	#[test]
	fn parses_for_of_and_for_in() {
		let mut tokens = tokenize("for i of xs { } for v in xs { }").unwrap();
		let program = parse(&mut tokens).unwrap();
		assert_eq!(program.body.len(), 2);
	}

	#[test]
	fn rejects_malformed_declaration() {
		let mut tokens = tokenize("let := 1").unwrap();
		assert!(parse(&mut tokens).is_err());
	}
}
