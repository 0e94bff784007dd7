use std::fmt;

/// Numeric flavor decided by the number state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
	/// Digits with an optional sign.
	Integer,
	/// Has a fraction or an exponent.
	Float,
}

/// Classification of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	/// Bareword usable as an entry or section name.
	Name,
	/// Bareword that can only be a value (contains `$` or `\`, or starts with `-`).
	Str,
	/// Text of a `"..."` string with escapes already processed.
	Quoted,
	Number(NumberKind),
	Equals,
	Colon,
	OpenBrace,
	CloseBrace,
	Eof,
}

impl TokenKind {
	pub fn describe(&self) -> &'static str {
		match self {
			TokenKind::Name => "a name",
			TokenKind::Str => "a string",
			TokenKind::Quoted => "a quoted string",
			TokenKind::Number(_) => "a number",
			TokenKind::Equals => "'='",
			TokenKind::Colon => "':'",
			TokenKind::OpenBrace => "'{'",
			TokenKind::CloseBrace => "'}'",
			TokenKind::Eof => "end of input",
		}
	}
}

/// A classified piece of input along with the line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub text: String,
	pub line: usize,
}

impl Token {
	pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
		Token {
			kind,
			text: text.into(),
			line,
		}
	}

	pub fn is_eof(&self) -> bool {
		self.kind == TokenKind::Eof
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.kind {
			TokenKind::Name | TokenKind::Str | TokenKind::Number(_) => {
				write!(f, "\"{}\"", self.text)
			}
			TokenKind::Quoted => write!(f, "quoted string \"{}\"", self.text),
			_ => f.write_str(self.kind.describe()),
		}
	}
}
