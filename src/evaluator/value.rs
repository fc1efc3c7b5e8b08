//! The runtime value model. Distinct from `ast::TypeAnnotation` on purpose: the checker tracks
//! integer bit width, the evaluator doesn't need to and never converts back, so the two stay as
//! separate tagged unions that never mix.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type ListHandle = Rc<RefCell<Vec<RuntimeValue>>>;

/// A number at runtime. Bit width is gone by this point (per the data model's invariant), but
/// int-vs-float is kept, since it's the only thing that distinguishes `7 / 2 == 3` from
/// `7.0 / 2 == 3.5` once the checker's static types are no longer available to the evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
	Int(i64),
	Float(f64),
}

impl NumberValue {
	fn as_f64(self) -> f64 {
		match self {
			Self::Int(value) => value as f64,
			Self::Float(value) => value,
		}
	}

	fn both_int(self, other: Self) -> Option<(i64, i64)> {
		match (self, other) {
			(Self::Int(left), Self::Int(right)) => Some((left, right)),
			_ => None,
		}
	}

	pub fn add(self, other: Self) -> Self {
		self.both_int(other).map_or_else(|| Self::Float(self.as_f64() + other.as_f64()), |(l, r)| Self::Int(l.wrapping_add(r)))
	}

	pub fn subtract(self, other: Self) -> Self {
		self.both_int(other).map_or_else(|| Self::Float(self.as_f64() - other.as_f64()), |(l, r)| Self::Int(l.wrapping_sub(r)))
	}

	pub fn multiply(self, other: Self) -> Self {
		self.both_int(other).map_or_else(|| Self::Float(self.as_f64() * other.as_f64()), |(l, r)| Self::Int(l.wrapping_mul(r)))
	}

	/// Errors on a zero divisor in either representation, per §4.3 ("/ errors on divisor 0").
	pub fn divide(self, other: Self) -> anyhow::Result<Self> {
		if let Some((left, right)) = self.both_int(other) {
			anyhow::ensure!(right != 0, "Division by zero");
			return Ok(Self::Int(left / right));
		}
		anyhow::ensure!(other.as_f64() != 0.0, "Division by zero");
		Ok(Self::Float(self.as_f64() / other.as_f64()))
	}

	pub fn modulo(self, other: Self) -> anyhow::Result<Self> {
		if let Some((left, right)) = self.both_int(other) {
			anyhow::ensure!(right != 0, "Modulo by zero");
			return Ok(Self::Int(left % right));
		}
		anyhow::ensure!(other.as_f64() != 0.0, "Modulo by zero");
		Ok(Self::Float(self.as_f64() % other.as_f64()))
	}

	pub fn compare(self, other: Self) -> std::cmp::Ordering {
		self.as_f64().partial_cmp(&other.as_f64()).unwrap_or(std::cmp::Ordering::Equal)
	}
}

impl fmt::Display for NumberValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(value) => write!(f, "{value}"),
			Self::Float(value) => write!(f, "{value}"),
		}
	}
}

#[derive(Debug, Clone)]
pub enum RuntimeValue {
	Null,
	Bool(bool),
	Number(NumberValue),
	String(String),
	List(ListHandle),
}

impl RuntimeValue {
	pub fn list_of(elements: Vec<Self>) -> Self {
		Self::List(Rc::new(RefCell::new(elements)))
	}

	/// Coercion to boolean for use in `if`/`while` conditions, per §4.3: `null` is false, a bool
	/// is itself, a number is `!= 0`, a string or list is non-empty.
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Null => false,
			Self::Bool(value) => *value,
			Self::Number(number) => number.as_f64() != 0.0,
			Self::String(value) => !value.is_empty(),
			Self::List(list) => !list.borrow().is_empty(),
		}
	}

	/// `==`/`!=` semantics: value equality for scalars, reference equality for lists (two
	/// distinct list literals with identical contents are not equal).
	pub fn value_equals(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(left), Self::Bool(right)) => left == right,
			(Self::Number(left), Self::Number(right)) => left.compare(*right) == std::cmp::Ordering::Equal,
			(Self::String(left), Self::String(right)) => left == right,
			(Self::List(left), Self::List(right)) => Rc::ptr_eq(left, right),
			_ => false,
		}
	}

	/// The name reported by the `type` built-in: one of `"null"`, `"array"`, `"boolean"`,
	/// `"number"`, `"string"`.
	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "boolean",
			Self::Number(_) => "number",
			Self::String(_) => "string",
			Self::List(_) => "array",
		}
	}

	/// The formatter shared by `print` and `stringify`: lists render recursively as
	/// `[e1, e2, ...]`, strings unquoted, `null` as the literal text `null`.
	pub fn stringify(&self) -> String {
		match self {
			Self::Null => "null".to_owned(),
			Self::Bool(value) => value.to_string(),
			Self::Number(number) => number.to_string(),
			Self::String(value) => value.clone(),
			Self::List(list) => {
				let rendered: Vec<String> = list.borrow().iter().map(Self::stringify).collect();
				format!("[{}]", rendered.join(", "))
			},
		}
	}
}
