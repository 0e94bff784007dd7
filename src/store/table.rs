use crate::error::{CfgError, Result};
use crate::store::entry::Entry;
use crate::store::literal::{Literal, LiteralKind};
use crate::subst::{self, Lookup};
use std::collections::BTreeMap;
use std::fmt;

/// Validate a dotted path given to a programmatic write.
///
/// Surrounding whitespace is trimmed; every `.`-separated segment must be
/// non-empty and free of whitespace, `=`, braces and quotes.
pub fn normalize_path(path: &str) -> Result<String> {
	let trimmed = path.trim();
	let valid = !trimmed.is_empty()
		&& trimmed.split('.').all(|segment| {
			!segment.is_empty()
				&& !segment
					.chars()
					.any(|c| c.is_whitespace() || matches!(c, '=' | '{' | '}' | '"' | '#'))
		});
	if valid {
		Ok(trimmed.to_string())
	} else {
		Err(CfgError::InvalidPath {
			path: path.to_string(),
		})
	}
}

/// Path-keyed table of entries.
///
/// Entries are kept in a `BTreeMap`, ordered by ascending byte-wise comparison
/// of their dotted paths. That order is only relied on for iteration and
/// dumps.
///
/// Two write policies exist and stay separate:
/// - [`Store::insert_or_update`] replaces an entry's whole literal list
///   (a redeclared `name = value`, an overlay).
/// - [`Store::append`] / [`Store::prepend`] grow the list and keep what
///   was there.
#[derive(Debug, Clone, Default)]
pub struct Store {
	entries: BTreeMap<String, Entry>,
}

impl Store {
	pub fn new() -> Self {
		Self::default()
	}

	fn entry_mut(&mut self, path: &str) -> Result<&mut Entry> {
		let path = normalize_path(path)?;
		Ok(self
			.entries
			.entry(path.clone())
			.or_insert_with(|| Entry::new(path)))
	}

	/// Set `path` to exactly one literal, creating the entry if needed.
	/// Returns true if an existing value was overwritten.
	pub fn insert_or_update(&mut self, path: &str, literal: Literal) -> Result<bool> {
		Ok(self.entry_mut(path)?.set(literal))
	}

	/// Add a literal at the end of the list at `path`, creating the entry if needed.
	pub fn append(&mut self, path: &str, literal: Literal) -> Result<()> {
		self.entry_mut(path)?.append(literal);
		Ok(())
	}

	/// Add a literal at the front of the list at `path`, creating the entry if needed.
	pub fn prepend(&mut self, path: &str, literal: Literal) -> Result<()> {
		self.entry_mut(path)?.prepend(literal);
		Ok(())
	}

	/// Replace the literal at `index` of an existing entry. An index past the
	/// end appends.
	pub fn replace_at(&mut self, path: &str, index: usize, literal: Literal) -> Result<Option<Literal>> {
		Ok(self.entry_mut_existing(path)?.replace_at(index, literal))
	}

	/// Empty the literal list at `path`. The entry itself stays.
	pub fn clear(&mut self, path: &str) -> Result<()> {
		self.entry_mut_existing(path)?.clear();
		Ok(())
	}

	fn entry_mut_existing(&mut self, path: &str) -> Result<&mut Entry> {
		self.entries
			.get_mut(path.trim())
			.ok_or_else(|| CfgError::UnknownPath {
				path: path.to_string(),
			})
	}

	pub fn find(&self, path: &str) -> Option<&Entry> {
		self.entries.get(path.trim())
	}

	pub fn contains(&self, path: &str) -> bool {
		self.find(path).is_some()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entries in ascending path order.
	pub fn iter(&self) -> impl Iterator<Item = &Entry> {
		self.entries.values()
	}

	/// Number of literals at `path`.
	pub fn value_count(&self, path: &str) -> Result<usize> {
		self.require(path).map(Entry::len)
	}

	fn require(&self, path: &str) -> Result<&Entry> {
		self.find(path).ok_or_else(|| CfgError::UnknownPath {
			path: path.to_string(),
		})
	}

	pub fn get(&self, path: &str, index: usize) -> Result<&Literal> {
		let entry = self.require(path)?;
		entry.get(index).ok_or_else(|| CfgError::IndexOutOfRange {
			path: path.to_string(),
			index,
			len: entry.len(),
		})
	}

	/// Text of the literal at `path[index]`. Strings are macro-expanded,
	/// other kinds are rendered by type.
	pub fn get_str(&self, path: &str, index: usize) -> Result<String> {
		self.render(self.get(path, index)?)
	}

	pub fn get_int(&self, path: &str, index: usize) -> Result<i64> {
		let literal = self.get(path, index)?;
		literal
			.to_int()
			.ok_or_else(|| mismatch(path, index, LiteralKind::Integer, literal))
	}

	pub fn get_float(&self, path: &str, index: usize) -> Result<f64> {
		let literal = self.get(path, index)?;
		literal
			.to_float()
			.ok_or_else(|| mismatch(path, index, LiteralKind::Float, literal))
	}

	pub fn get_bool(&self, path: &str, index: usize) -> Result<bool> {
		let literal = self.get(path, index)?;
		literal
			.to_bool()
			.ok_or_else(|| mismatch(path, index, LiteralKind::Bool, literal))
	}

	/// Expand the macro references in `raw` against this store.
	pub fn resolve(&self, raw: &str) -> Result<String> {
		subst::resolve(self, raw)
	}

	/// Render a literal to text, expanding macros in strings.
	pub fn render(&self, literal: &Literal) -> Result<String> {
		match literal.as_str() {
			Some(raw) => self.resolve(raw),
			None => Ok(literal.render()),
		}
	}
}

fn mismatch(path: &str, index: usize, expected: LiteralKind, found: &Literal) -> CfgError {
	CfgError::TypeMismatch {
		path: path.to_string(),
		index,
		expected: expected.as_str(),
		found: found.kind().as_str(),
	}
}

impl Lookup for Store {
	fn lookup(&self, path: &str) -> Option<&[Literal]> {
		self.entries.get(path).map(Entry::literals)
	}
}

/// Dump every entry, one literal per indented line. Strings are shown
/// expanded when their references resolve, raw otherwise.
impl fmt::Display for Store {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for entry in self.iter() {
			writeln!(f, "{}:", entry.path())?;
			for literal in entry {
				let text = self.render(literal).unwrap_or_else(|_| literal.render());
				writeln!(f, "\t({}){}", literal.kind(), text)?;
			}
		}
		Ok(())
	}
}
