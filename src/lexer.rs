//! The lexer. This is a thin, deliberately simple character scan: it has no opinion about what a
//! valid JAL program looks like, it just turns a source string into a flat stream of tokens that
//! the parser consumes. All of the real design decisions live downstream in `parser`, `checker`,
//! and `evaluator`.

use std::collections::VecDeque;
use std::fmt;

use convert_case::Casing as _;
use strum::IntoEnumIterator as _;

/// A type of token in JAL source code. Variants are matched against the front of the remaining
/// source in declaration order, so keywords must be declared before `Identifier` or they'll be
/// tokenized as identifiers instead.
#[derive(strum_macros::EnumIter, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TokenType {
	Let,
	Const,
	Fn,
	Return,
	If,
	Else,
	While,
	For,
	Of,
	In,

	Identifier,
	Number,
	String,

	InferAssign, // :=
	Colon,
	Equal,
	EqualEqual,
	NotEqual,
	LessEqual,
	GreaterEqual,
	LessThan,
	GreaterThan,
	Plus,
	Minus,
	Asterisk,
	Percent,
	ForwardSlash,
	ListPush, // <<
	Comma,
	Semicolon,

	OpenBrace,
	CloseBrace,
	OpenBracket,
	CloseBracket,
	OpenParen,
	CloseParen,

	LineComment,
	Whitespace,

	Eof,
}

impl TokenType {
	fn pattern(self) -> &'static regex_macro::Regex {
		match self {
			// Keywords (must precede Identifier)
			Self::Let => regex_macro::regex!(r"^let\b"),
			Self::Const => regex_macro::regex!(r"^const\b"),
			Self::Fn => regex_macro::regex!(r"^fn\b"),
			Self::Return => regex_macro::regex!(r"^return\b"),
			Self::If => regex_macro::regex!(r"^if\b"),
			Self::Else => regex_macro::regex!(r"^else\b"),
			Self::While => regex_macro::regex!(r"^while\b"),
			Self::For => regex_macro::regex!(r"^for\b"),
			Self::Of => regex_macro::regex!(r"^of\b"),
			Self::In => regex_macro::regex!(r"^in\b"),

			// Multi-character operators (must precede their single-character prefixes)
			Self::InferAssign => regex_macro::regex!("^:="),
			Self::EqualEqual => regex_macro::regex!("^=="),
			Self::NotEqual => regex_macro::regex!("^!="),
			Self::LessEqual => regex_macro::regex!("^<="),
			Self::GreaterEqual => regex_macro::regex!("^>="),
			Self::ListPush => regex_macro::regex!("^<<"),

			// Literals
			Self::String => regex_macro::regex!(r#"(?s)^"[^"]*""#),
			Self::Number => regex_macro::regex!(r"^\d+(\.\d+)?"),
			Self::Identifier => regex_macro::regex!(r"^[A-Za-z_]\w*"),

			// Single-character operators and punctuation
			Self::Colon => regex_macro::regex!("^:"),
			Self::Equal => regex_macro::regex!("^="),
			Self::LessThan => regex_macro::regex!("^<"),
			Self::GreaterThan => regex_macro::regex!("^>"),
			Self::Plus => regex_macro::regex!(r"^\+"),
			Self::Minus => regex_macro::regex!("^-"),
			Self::Asterisk => regex_macro::regex!(r"^\*"),
			Self::Percent => regex_macro::regex!("^%"),
			Self::ForwardSlash => regex_macro::regex!("^/"),
			Self::Comma => regex_macro::regex!("^,"),
			Self::Semicolon => regex_macro::regex!("^;"),

			Self::OpenBrace => regex_macro::regex!(r"^\{"),
			Self::CloseBrace => regex_macro::regex!(r"^\}"),
			Self::OpenBracket => regex_macro::regex!(r"^\["),
			Self::CloseBracket => regex_macro::regex!(r"^\]"),
			Self::OpenParen => regex_macro::regex!(r"^\("),
			Self::CloseParen => regex_macro::regex!(r"^\)"),

			// Ignored tokens
			Self::LineComment => regex_macro::regex!(r"^//[^\n\r]*"),
			Self::Whitespace => regex_macro::regex!(r"^\s"),

			// Never matched directly against source; only ever appended at the end of a stream.
			Self::Eof => regex_macro::regex!(r"^\x00\x00never\x00\x00"),
		}
	}

	#[must_use]
	pub fn get_match(self, code: &str) -> Option<String> {
		self.pattern().find(code).map(|matched| matched.as_str().to_owned())
	}

	fn find_match(code: &str) -> Option<(Self, String)> {
		for token_type in Self::iter() {
			if token_type == Self::Eof {
				continue;
			}
			if let Some(matched) = token_type.get_match(code) {
				return Some((token_type, matched));
			}
		}
		None
	}
}

impl fmt::Display for TokenType {
	/// Title-cases the variant name (`OpenBrace` -> `Open Brace`) for parse error messages, the
	/// same way the teacher's own `TokenType::Display` dresses up its variant names.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", format!("{self:?}").to_case(convert_case::Case::Title))
	}
}

/// A single token produced by `tokenize`. `index` is this token's position in the returned
/// stream, used by the parser to report *where* an unexpected token was found; JAL errors don't
/// carry source line/column information (see the crate's top-level Non-goals).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Token {
	pub token_type: TokenType,
	pub value: String,
	pub index: usize,
}

/// Tokenizes a string of JAL source code into a queue of tokens terminated by `Eof`.
///
/// # Errors
///
/// If a piece of text doesn't match the start of any known token type (e.g. stray characters
/// like `@` or an unterminated string).
pub fn tokenize(source: &str) -> anyhow::Result<VecDeque<Token>> {
	let mut remaining = source;
	let mut tokens = Vec::new();

	while !remaining.is_empty() {
		let Some((token_type, value)) = TokenType::find_match(remaining) else {
			anyhow::bail!("Unrecognized token at: {}", remaining.lines().next().unwrap_or(remaining));
		};

		let length = value.len();
		if token_type != TokenType::Whitespace && token_type != TokenType::LineComment {
			tokens.push(Token {
				token_type,
				value,
				index: tokens.len(),
			});
		}

		remaining = remaining.get(length..).ok_or_else(|| anyhow::anyhow!("Internal lexer error: token length out of bounds"))?;
	}

	let eof_index = tokens.len();
	tokens.push(Token {
		token_type: TokenType::Eof,
		value: String::new(),
		index: eof_index,
	});

	Ok(VecDeque::from(tokens))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenizes_arithmetic_and_print() {
		let tokens = tokenize("let x := 2 + 3 * 4; print(x)").unwrap();
		let types: Vec<_> = tokens.iter().map(|token| token.token_type).collect();
		assert_eq!(
			types,
			vec![
				TokenType::Let,
				TokenType::Identifier,
				TokenType::InferAssign,
				TokenType::Number,
				TokenType::Plus,
				TokenType::Number,
				TokenType::Asterisk,
				TokenType::Number,
				TokenType::Identifier,
				TokenType::OpenParen,
				TokenType::Identifier,
				TokenType::CloseParen,
				TokenType::Eof,
			]
		);
	}

	#[test]
	fn distinguishes_list_push_from_less_than() {
		let tokens = tokenize("a << b").unwrap();
		assert_eq!(tokens[1].token_type, TokenType::ListPush);

		let tokens = tokenize("a < b").unwrap();
		assert_eq!(tokens[1].token_type, TokenType::LessThan);
	}

	#[test]
	fn rejects_unknown_characters() {
		assert!(tokenize("let x := @").is_err());
	}

	#[test]
	fn skips_comments_and_whitespace() {
		let tokens = tokenize("// a comment\n\tlet x := 1").unwrap();
		let types: Vec<_> = tokens.iter().map(|token| token.token_type).collect();
		assert_eq!(types, vec![TokenType::Let, TokenType::Identifier, TokenType::InferAssign, TokenType::Number, TokenType::Eof]);
	}
}
