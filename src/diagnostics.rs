//! Warning and error collection.
//!
//! Fatal problems travel as `Err(CfgError)`. Everything recorded here is
//! non-fatal: warnings, and errors a recovering parse stepped over. Both are
//! counted separately and echoed through `tracing` as they arrive.

use crate::error::CfgError;
use std::fmt;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	Warning,
	Error,
}

impl Severity {
	pub fn as_str(&self) -> &'static str {
		match self {
			Severity::Warning => "warning",
			Severity::Error => "error",
		}
	}
}

/// A `(line, message)` pair with its severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	pub severity: Severity,
	pub line: Option<usize>,
	pub message: String,
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.line {
			Some(line) => write!(f, "{}: {}: {}", self.severity.as_str(), line, self.message),
			None => write!(f, "{}: {}", self.severity.as_str(), self.message),
		}
	}
}

/// Running record of diagnostics for one load.
#[derive(Debug, Default)]
pub struct Diagnostics {
	source: String,
	records: Vec<Diagnostic>,
	errors: Vec<CfgError>,
	warning_count: usize,
}

impl Diagnostics {
	/// Diagnostics for input named `source` (a file path or `<input>`).
	pub fn new(source: impl Into<String>) -> Self {
		Diagnostics {
			source: source.into(),
			..Default::default()
		}
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn warning(&mut self, line: usize, message: impl Into<String>) {
		let message = message.into();
		warn!(source = %self.source, line, "{}", message);
		self.warning_count += 1;
		self.records.push(Diagnostic {
			severity: Severity::Warning,
			line: Some(line),
			message,
		});
	}

	/// Record an error that was recovered from.
	pub fn error(&mut self, err: CfgError) {
		let line = err.line();
		let message = match &err {
			// The line is carried separately.
			CfgError::Lexical { kind, .. } => kind.to_string(),
			CfgError::Structural {
				expected, found, ..
			} => format!("expected {}, but got {}", expected, found),
			other => other.to_string(),
		};
		error!(source = %self.source, line, "{}", message);
		self.records.push(Diagnostic {
			severity: Severity::Error,
			line,
			message,
		});
		self.errors.push(err);
	}

	pub fn warning_count(&self) -> usize {
		self.warning_count
	}

	pub fn error_count(&self) -> usize {
		self.errors.len()
	}

	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}

	/// Recorded errors in the order they were found.
	pub fn errors(&self) -> &[CfgError] {
		&self.errors
	}

	/// Every diagnostic in the order it was recorded.
	pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
		self.records.iter()
	}

	/// Move the records of `other` into this collection.
	pub fn extend(&mut self, other: Diagnostics) {
		self.warning_count += other.warning_count;
		self.records.extend(other.records);
		self.errors.extend(other.errors);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::LexErrorKind;

	#[test]
	fn test_counts_are_separate() {
		let mut diags = Diagnostics::new("test.conf");
		diags.warning(3, "something odd");
		diags.warning(4, "something else");
		diags.error(CfgError::Lexical {
			line: 5,
			kind: LexErrorKind::BadHexEscape,
		});

		assert_eq!(diags.warning_count(), 2);
		assert_eq!(diags.error_count(), 1);
		assert!(diags.has_errors());
		assert_eq!(diags.source(), "test.conf");
	}

	#[test]
	fn test_display() {
		let mut diags = Diagnostics::new("x");
		diags.warning(2, "redefined");
		diags.error(CfgError::Structural {
			line: 7,
			expected: "'{'",
			found: "'='".to_string(),
		});
		let lines: Vec<_> = diags.iter().map(|d| d.to_string()).collect();
		assert_eq!(
			lines,
			vec![
				"warning: 2: redefined".to_string(),
				"error: 7: expected '{', but got '='".to_string(),
			]
		);
	}

	#[test]
	fn test_extend() {
		let mut a = Diagnostics::new("a");
		a.warning(1, "w");
		let mut b = Diagnostics::new("b");
		b.warning(1, "w");
		b.error(CfgError::UnknownPath {
			path: "x".to_string(),
		});
		a.extend(b);
		assert_eq!(a.warning_count(), 2);
		assert_eq!(a.error_count(), 1);
		assert_eq!(a.iter().count(), 3);
	}
}
