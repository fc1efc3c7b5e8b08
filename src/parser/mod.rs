//! The parser: recursive-descent, with operator-precedence climbing for binary expressions.
//! Consumes the token stream produced by `lexer::tokenize` and yields a `Program`. See
//! `expressions` for the precedence table and `infer` for the advisory type-inference pass that
//! runs over the finished AST.

use std::collections::VecDeque;

use crate::ast::{Expression, Parameter, Program, Statement, TypeAnnotation};
use crate::lexer::{Token, TokenType};

pub mod expressions;
pub mod infer;
pub mod statements;

/// A trait for treating a `VecDeque<Token>` as a queue that can be parsed. All parser submodules
/// take `&mut TokenQueue` so that parsing is just repeatedly popping tokens off the front.
pub type TokenQueue = VecDeque<Token>;

pub trait TokenQueueFunctionality {
	/// Removes and returns the next token if it matches `token_type`. Otherwise returns a fatal
	/// parse error naming both the expected and the actual token type, plus the token's position
	/// in the stream.
	fn pop(&mut self, token_type: TokenType) -> anyhow::Result<Token>;

	/// Returns the type of the next token without removing it, or `Eof` semantics apply if the
	/// stream is exhausted (which shouldn't happen, since `Eof` is always the final token).
	fn peek_type(&self) -> anyhow::Result<TokenType>;

	/// Returns the type of the token *after* the next one, used for the assignment/list-push
	/// lookahead in statement dispatch.
	fn peek_type2(&self) -> anyhow::Result<TokenType>;

	fn peek_value(&self) -> anyhow::Result<String>;

	fn next_is(&self, token_type: TokenType) -> bool;

	fn current_index(&self) -> usize;
}

impl TokenQueueFunctionality for TokenQueue {
	fn pop(&mut self, token_type: TokenType) -> anyhow::Result<Token> {
		let actual = self.peek_type()?;
		if actual != token_type {
			anyhow::bail!("Expected {token_type}, found {actual} (at token {})", self.current_index());
		}
		Ok(self.pop_front().expect("peek_type just confirmed a token is present"))
	}

	fn peek_type(&self) -> anyhow::Result<TokenType> {
		Ok(self.front().ok_or_else(|| anyhow::anyhow!("Unexpected end of token stream"))?.token_type)
	}

	fn peek_type2(&self) -> anyhow::Result<TokenType> {
		Ok(self.get(1).ok_or_else(|| anyhow::anyhow!("Unexpected end of token stream"))?.token_type)
	}

	fn peek_value(&self) -> anyhow::Result<String> {
		Ok(self.front().ok_or_else(|| anyhow::anyhow!("Unexpected end of token stream"))?.value.clone())
	}

	fn next_is(&self, token_type: TokenType) -> bool {
		self.front().is_some_and(|token| token.token_type == token_type)
	}

	fn current_index(&self) -> usize {
		self.front().map_or(usize::MAX, |token| token.index)
	}
}

/// Parses a full token stream into a `Program`. This is the parser's only public entry point;
/// everything else in this module is reachable only through statement/expression dispatch.
///
/// # Errors
///
/// On the first unexpected token. Parse errors are always fatal: there is no error recovery.
pub fn parse(tokens: &mut TokenQueue) -> anyhow::Result<Program> {
	let mut body = Vec::new();
	while !tokens.next_is(TokenType::Eof) {
		body.push(statements::parse_statement(tokens)?);
	}
	let mut program = Program { body };
	infer::infer_types(&mut program);
	Ok(program)
}

/// Consumes an optional trailing semicolon after a statement. JAL's grammar doesn't require
/// semicolons between statements (blocks are brace-delimited, not semicolon-terminated), but the
/// example programs in the language surface use them freely as separators, so parsing one when
/// present (and skipping it otherwise) keeps both styles valid.
pub(crate) fn skip_optional_semicolon(tokens: &mut TokenQueue) {
	if tokens.next_is(TokenType::Semicolon) {
		tokens.pop_front();
	}
}

pub(crate) fn parse_block_body(tokens: &mut TokenQueue) -> anyhow::Result<Vec<Statement>> {
	tokens.pop(TokenType::OpenBrace)?;
	let mut body = Vec::new();
	while !tokens.next_is(TokenType::CloseBrace) {
		body.push(statements::parse_statement(tokens)?);
	}
	tokens.pop(TokenType::CloseBrace)?;
	Ok(body)
}

pub(crate) fn parse_type_annotation(tokens: &mut TokenQueue) -> anyhow::Result<TypeAnnotation> {
	if tokens.next_is(TokenType::OpenBracket) {
		tokens.pop(TokenType::OpenBracket)?;
		let element = parse_type_annotation(tokens)?;
		tokens.pop(TokenType::CloseBracket)?;
		return Ok(TypeAnnotation::list(element));
	}

	let name = tokens.pop(TokenType::Identifier)?.value;
	match name.as_str() {
		"int" | "i32" => Ok(TypeAnnotation::int(32)),
		"i8" => Ok(TypeAnnotation::int(8)),
		"i16" => Ok(TypeAnnotation::int(16)),
		"i64" => Ok(TypeAnnotation::int(64)),
		"float" | "f32" => Ok(TypeAnnotation::float(32)),
		"f64" => Ok(TypeAnnotation::float(64)),
		"bool" => Ok(TypeAnnotation::Bool),
		"string" => Ok(TypeAnnotation::String),
		"void" => Ok(TypeAnnotation::Void),
		"list" => Ok(TypeAnnotation::list(TypeAnnotation::Void)),
		other => anyhow::bail!("Unknown type name \"{other}\""),
	}
}

pub(crate) fn parse_parameters(tokens: &mut TokenQueue) -> anyhow::Result<Vec<Parameter>> {
	tokens.pop(TokenType::OpenParen)?;
	let mut params = Vec::new();
	while !tokens.next_is(TokenType::CloseParen) {
		let name = tokens.pop(TokenType::Identifier)?.value;
		tokens.pop(TokenType::Colon)?;
		let type_annotation = parse_type_annotation(tokens)?;
		params.push(Parameter { name, type_annotation });

		if tokens.next_is(TokenType::Comma) {
			tokens.pop(TokenType::Comma)?;
		} else {
			break;
		}
	}
	tokens.pop(TokenType::CloseParen)?;
	Ok(params)
}

pub(crate) fn parse_arguments(tokens: &mut TokenQueue) -> anyhow::Result<Vec<Expression>> {
	tokens.pop(TokenType::OpenParen)?;
	let mut arguments = Vec::new();
	while !tokens.next_is(TokenType::CloseParen) {
		arguments.push(expressions::parse_expression(tokens)?);
		if tokens.next_is(TokenType::Comma) {
			tokens.pop(TokenType::Comma)?;
		} else {
			break;
		}
	}
	tokens.pop(TokenType::CloseParen)?;
	Ok(arguments)
}
