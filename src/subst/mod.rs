//! Macro substitution for string values.
//!
//! A string may embed `$(dotted.path,index)` references. They are expanded
//! when the string is read back, never while parsing, so a reference can
//! point at an entry declared further down the file.
//!
//! Rules:
//! - A `$` not followed by `(` is plain text.
//! - The index is mandatory; `$(path)` and an unterminated reference are errors.
//! - A reference to an unknown path is left in the output unchanged.
//! - Substituted text is never scanned again, so self-referential or cyclic
//!   entries cannot loop.

use crate::error::{CfgError, ReferenceErrorKind, Result};
use crate::store::Literal;
use std::ops::Range;
use tracing::debug;

/// Read access the engine needs from a store.
pub trait Lookup {
	/// Literal list stored at `path`, if any.
	fn lookup(&self, path: &str) -> Option<&[Literal]>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	CopyingText,
	SeenDollar,
	SeenOpener,
	CopyingName,
	ReadingIndex,
	Substituting,
}

fn reference_error(raw: &str, kind: ReferenceErrorKind) -> CfgError {
	CfgError::Reference {
		text: raw.to_string(),
		kind,
	}
}

/// Expand every `$(path,index)` reference in `raw` in a single pass.
pub fn resolve<L: Lookup + ?Sized>(lookup: &L, raw: &str) -> Result<String> {
	let mut out = String::with_capacity(raw.len());
	let mut state = State::CopyingText;
	let mut pos = 0;
	let mut reference_start = 0;
	let mut name: Range<usize> = 0..0;
	let mut index: usize = 0;
	let mut index_digits = 0;

	loop {
		let ch = raw[pos..].chars().next();
		match state {
			State::CopyingText => match ch {
				None => break,
				Some('$') => {
					reference_start = pos;
					pos += 1;
					state = State::SeenDollar;
				}
				Some(c) => {
					out.push(c);
					pos += c.len_utf8();
				}
			},
			State::SeenDollar => match ch {
				Some('(') => {
					pos += 1;
					state = State::SeenOpener;
				}
				// Not a reference: keep the '$' and look at this char again.
				_ => {
					out.push('$');
					state = State::CopyingText;
				}
			},
			State::SeenOpener => {
				name = pos..pos;
				index = 0;
				index_digits = 0;
				state = State::CopyingName;
			}
			State::CopyingName => match ch {
				None => return Err(reference_error(raw, ReferenceErrorKind::Unterminated)),
				Some(')') => return Err(reference_error(raw, ReferenceErrorKind::MissingIndex)),
				Some(',') => {
					name.end = pos;
					pos += 1;
					state = State::ReadingIndex;
				}
				Some(c) => pos += c.len_utf8(),
			},
			State::ReadingIndex => match ch {
				Some(c) if c.is_ascii_digit() => {
					index = index
						.checked_mul(10)
						.and_then(|n| n.checked_add(c as usize - '0' as usize))
						.ok_or_else(|| reference_error(raw, ReferenceErrorKind::InvalidIndex))?;
					index_digits += 1;
					pos += 1;
				}
				Some(')') if index_digits > 0 => {
					pos += 1;
					state = State::Substituting;
				}
				Some(')') => return Err(reference_error(raw, ReferenceErrorKind::MissingIndex)),
				Some(_) => return Err(reference_error(raw, ReferenceErrorKind::InvalidIndex)),
				None => return Err(reference_error(raw, ReferenceErrorKind::Unterminated)),
			},
			State::Substituting => {
				let path = &raw[name.clone()];
				match lookup.lookup(path) {
					None => {
						debug!(path, index, "unresolved reference left in place");
						out.push_str(&raw[reference_start..pos]);
					}
					Some(literals) => match literals.get(index) {
						Some(literal) => out.push_str(&literal.render()),
						None => {
							return Err(reference_error(
								raw,
								ReferenceErrorKind::IndexOutOfRange {
									path: path.to_string(),
									index,
									len: literals.len(),
								},
							));
						}
					},
				}
				state = State::CopyingText;
			}
		}
	}

	Ok(out)
}
