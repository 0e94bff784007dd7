use crate::error::LexErrorKind;
use crate::lexer::{Lexer, NumberKind, TokenKind};
use std::fmt;

/// Kind tag of a literal, used in messages and dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
	String,
	Integer,
	Float,
	Bool,
}

impl LiteralKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			LiteralKind::String => "string",
			LiteralKind::Integer => "integer",
			LiteralKind::Float => "float",
			LiteralKind::Bool => "bool",
		}
	}
}

impl fmt::Display for LiteralKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Typed payload of a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	String(String),
	Integer(i64),
	Float(f64),
	Bool(bool),
}

/// One typed scalar inside an entry, together with the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
	value: Value,
	raw: String,
}

impl Literal {
	pub fn string(text: impl Into<String>) -> Self {
		let text = text.into();
		Literal {
			raw: text.clone(),
			value: Value::String(text),
		}
	}

	pub fn integer(value: i64) -> Self {
		Literal {
			raw: value.to_string(),
			value: Value::Integer(value),
		}
	}

	pub fn float(value: f64) -> Self {
		Literal {
			raw: value.to_string(),
			value: Value::Float(value),
		}
	}

	pub fn bool(value: bool) -> Self {
		Literal {
			raw: value.to_string(),
			value: Value::Bool(value),
		}
	}

	/// Convert the text of a number token, keeping it as the raw text.
	pub fn from_number(kind: NumberKind, raw: &str) -> Result<Self, LexErrorKind> {
		let value = match kind {
			NumberKind::Integer => raw
				.parse::<i64>()
				.map(Value::Integer)
				.map_err(|_| LexErrorKind::IntegerOutOfRange {
					text: raw.to_string(),
				})?,
			NumberKind::Float => raw
				.parse::<f64>()
				.map(Value::Float)
				.map_err(|_| LexErrorKind::MalformedNumber {
					text: raw.to_string(),
				})?,
		};
		Ok(Literal {
			value,
			raw: raw.to_string(),
		})
	}

	/// Type free text (an overlay value) using the file format's rules.
	///
	/// A lone number becomes an integer or float, a lone `true`/`false`
	/// becomes a bool, a lone quoted string has its escapes processed.
	/// Anything else is kept as a trimmed string.
	pub fn infer(text: &str) -> Self {
		let trimmed = text.trim();
		let mut lexer = Lexer::new(trimmed.as_bytes());
		if let (Ok(token), Ok(end)) = (lexer.next_token(), lexer.next_token())
			&& end.is_eof()
		{
			match token.kind {
				TokenKind::Number(kind) => {
					if let Ok(literal) = Literal::from_number(kind, &token.text) {
						return literal;
					}
				}
				TokenKind::Quoted => return Literal::string(token.text),
				TokenKind::Name if token.text == "true" => return Literal::bool(true),
				TokenKind::Name if token.text == "false" => return Literal::bool(false),
				_ => {}
			}
		}
		Literal::string(trimmed)
	}

	pub fn value(&self) -> &Value {
		&self.value
	}

	/// The text this literal was created from.
	pub fn raw(&self) -> &str {
		&self.raw
	}

	pub fn kind(&self) -> LiteralKind {
		match self.value {
			Value::String(_) => LiteralKind::String,
			Value::Integer(_) => LiteralKind::Integer,
			Value::Float(_) => LiteralKind::Float,
			Value::Bool(_) => LiteralKind::Bool,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match &self.value {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	/// Integer value, parsing the raw text of other kinds.
	pub fn to_int(&self) -> Option<i64> {
		match self.value {
			Value::Integer(n) => Some(n),
			_ => self.raw.trim().parse().ok(),
		}
	}

	/// Float value; integers widen, other kinds parse their raw text.
	pub fn to_float(&self) -> Option<f64> {
		match self.value {
			Value::Float(n) => Some(n),
			Value::Integer(n) => Some(n as f64),
			_ => self.raw.trim().parse().ok(),
		}
	}

	pub fn to_bool(&self) -> Option<bool> {
		match self.value {
			Value::Bool(b) => Some(b),
			_ => {
				let raw = self.raw.trim();
				if raw.eq_ignore_ascii_case("true") {
					Some(true)
				} else if raw.eq_ignore_ascii_case("false") {
					Some(false)
				} else {
					None
				}
			}
		}
	}

	/// Render to text by type. Strings come back verbatim, without any macro
	/// expansion.
	pub fn render(&self) -> String {
		match &self.value {
			Value::String(s) => s.clone(),
			Value::Integer(n) => n.to_string(),
			Value::Float(n) => format!("{:.6}", n),
			Value::Bool(b) => b.to_string(),
		}
	}
}

impl fmt::Display for Literal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}){}", self.kind(), self.render())
	}
}
