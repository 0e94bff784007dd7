use crate::diagnostics::Diagnostics;
use crate::error::{CfgError, Result};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::store::{Literal, Store};
use std::collections::HashSet;
use tracing::debug;

/// Store and diagnostics produced by one parse.
#[derive(Debug)]
pub struct ParseOutcome {
	pub store: Store,
	pub diagnostics: Diagnostics,
}

/// Recursive-descent parser for one input buffer.
///
/// ```text
/// Top     := (Name '{' Section)* EOF
/// Section := (Name '=' Value | Name '{' Section)* '}'
/// ```
///
/// Section names are kept on a context stack while descending; an
/// assignment's path is the stack joined with `.` plus its own name.
/// Redeclaring a path inside the same input replaces the earlier value and
/// records a warning.
#[derive(Debug)]
pub struct Parser<'a> {
	lexer: Lexer<'a>,
	context: Vec<String>,
	depth: usize,
	defined: HashSet<String>,
	store: Store,
	diagnostics: Diagnostics,
}

fn unexpected(token: &Token, expected: &'static str) -> CfgError {
	CfgError::Structural {
		line: token.line,
		expected,
		found: token.to_string(),
	}
}

impl<'a> Parser<'a> {
	/// Parser for `input`; `source` names it in diagnostics.
	pub fn new(source: &str, input: &'a [u8]) -> Self {
		Self::with_store(source, input, Store::new())
	}

	/// Parser that writes into an existing store, overriding what is there.
	pub fn with_store(source: &str, input: &'a [u8], store: Store) -> Self {
		Parser {
			lexer: Lexer::new(input),
			context: Vec::new(),
			depth: 0,
			defined: HashSet::new(),
			store,
			diagnostics: Diagnostics::new(source),
		}
	}

	/// Parse the whole input, stopping at the first error.
	pub fn parse(mut self) -> Result<ParseOutcome> {
		while self.top_level()? {}
		debug_assert!(self.context.is_empty());
		Ok(self.finish())
	}

	/// Parse the whole input, recording errors instead of stopping.
	///
	/// After an error the rest of the enclosing top-level section is skipped.
	/// Values stored before the error are kept.
	pub fn parse_recovering(mut self) -> ParseOutcome {
		loop {
			match self.top_level() {
				Ok(true) => {}
				Ok(false) => break,
				Err(err) => {
					self.diagnostics.error(err);
					if !self.synchronize() {
						break;
					}
				}
			}
		}
		self.finish()
	}

	fn finish(self) -> ParseOutcome {
		debug!(
			source = self.diagnostics.source(),
			entries = self.store.len(),
			warnings = self.diagnostics.warning_count(),
			errors = self.diagnostics.error_count(),
			"parsed configuration"
		);
		ParseOutcome {
			store: self.store,
			diagnostics: self.diagnostics,
		}
	}

	fn next(&mut self) -> Result<Token> {
		let token = self.lexer.next_token()?;
		match token.kind {
			TokenKind::OpenBrace => self.depth += 1,
			TokenKind::CloseBrace => self.depth = self.depth.saturating_sub(1),
			_ => {}
		}
		Ok(token)
	}

	/// Skip to brace depth zero. Returns false if the input ran out first.
	fn synchronize(&mut self) -> bool {
		self.context.clear();
		while self.depth > 0 {
			match self.next() {
				Ok(token) if token.is_eof() => return false,
				Ok(_) => {}
				Err(err) => self.diagnostics.error(err),
			}
		}
		true
	}

	/// One top-level section. Returns false at end of input.
	fn top_level(&mut self) -> Result<bool> {
		let token = self.next()?;
		match token.kind {
			TokenKind::Eof => Ok(false),
			TokenKind::Name => {
				let open = self.next()?;
				if open.kind != TokenKind::OpenBrace {
					return Err(unexpected(&open, "a '{'"));
				}
				self.context.push(token.text);
				self.section()?;
				Ok(true)
			}
			_ => Err(unexpected(&token, "a section name or end of input")),
		}
	}

	/// Body of a section whose name is already on the context stack, up to
	/// and including its closing brace. Nested sections push onto the
	/// context stack instead of recursing, so nesting depth is bounded only
	/// by memory.
	fn section(&mut self) -> Result<()> {
		let base = self.context.len().saturating_sub(1);
		while self.context.len() > base {
			let token = self.next()?;
			match token.kind {
				TokenKind::Name => {
					let next = self.next()?;
					match next.kind {
						TokenKind::Equals => self.assignment(token)?,
						TokenKind::OpenBrace => self.context.push(token.text),
						_ => return Err(unexpected(&next, "a '=' or a '{'")),
					}
				}
				TokenKind::CloseBrace => {
					self.context.pop();
				}
				_ => return Err(unexpected(&token, "a name or a '}'")),
			}
		}
		Ok(())
	}

	fn assignment(&mut self, name: Token) -> Result<()> {
		let value = self.next()?;
		let literal = match value.kind {
			TokenKind::Name | TokenKind::Str | TokenKind::Quoted => Literal::string(value.text),
			TokenKind::Number(kind) => Literal::from_number(kind, &value.text).map_err(|kind| {
				CfgError::Lexical {
					line: value.line,
					kind,
				}
			})?,
			_ => return Err(unexpected(&value, "a value")),
		};

		self.context.push(name.text);
		let path = self.context.join(".");
		self.context.pop();

		let replaced = self
			.store
			.insert_or_update(&path, literal)
			.map_err(|_| CfgError::Structural {
				line: name.line,
				expected: "a valid entry name",
				found: format!("\"{}\"", path),
			})?;

		if !self.defined.insert(path.clone()) {
			self.diagnostics
				.warning(name.line, format!("{} redefined, previous value replaced", path));
		} else if replaced {
			debug!(path = %path, "overriding value from an earlier source");
		}
		Ok(())
	}
}
