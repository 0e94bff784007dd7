use std::path::PathBuf;

/// Library-level structured errors for nestcfg.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum CfgError {
	#[error("line {line}: {kind}")]
	Lexical { line: usize, kind: LexErrorKind },

	#[error("line {line}: expected {expected}, but got {found}")]
	Structural {
		line: usize,
		expected: &'static str,
		found: String,
	},

	#[error("bad macro reference in \"{text}\": {kind}")]
	Reference {
		text: String,
		kind: ReferenceErrorKind,
	},

	#[error("No entry at path: {path}")]
	UnknownPath { path: String },

	#[error("Index {index} out of range for {path} ({len} values)")]
	IndexOutOfRange {
		path: String,
		index: usize,
		len: usize,
	},

	#[error("Invalid entry path: \"{path}\"")]
	InvalidPath { path: String },

	#[error("Value {path}[{index}] is a {found}, not a {expected}")]
	TypeMismatch {
		path: String,
		index: usize,
		expected: &'static str,
		found: &'static str,
	},

	#[error("Invalid assignment \"{text}\", expected PATH=VALUE")]
	InvalidAssignment { text: String },

	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to export configuration")]
	Export {
		#[source]
		source: toml::ser::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

impl CfgError {
	/// Source line the error was detected on, for errors raised while scanning
	/// or parsing.
	pub fn line(&self) -> Option<usize> {
		match self {
			CfgError::Lexical { line, .. } | CfgError::Structural { line, .. } => Some(*line),
			_ => None,
		}
	}
}

/// What went wrong while turning bytes into tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
	#[error("malformed number \"{text}\"")]
	MalformedNumber { text: String },

	#[error("integer out of range \"{text}\"")]
	IntegerOutOfRange { text: String },

	#[error("malformed hex escape")]
	BadHexEscape,

	#[error("end of input inside a quoted string")]
	UnterminatedString,

	#[error("quoted string is not valid UTF-8")]
	InvalidUtf8,

	#[error("unexpected character {0:?}")]
	UnexpectedChar(char),
}

/// What went wrong inside a `$(path,index)` reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceErrorKind {
	#[error("index is required")]
	MissingIndex,

	#[error("invalid index")]
	InvalidIndex,

	#[error("unterminated reference")]
	Unterminated,

	#[error("index {index} out of range for {path} ({len} values)")]
	IndexOutOfRange {
		path: String,
		index: usize,
		len: usize,
	},
}

/// Result type alias using CfgError.
pub type Result<T> = std::result::Result<T, CfgError>;
