use crate::store::literal::Literal;

/// A path-addressed, ordered list of literals.
///
/// Indexes are 0-based. Iteration hands out a fresh slice iterator on every
/// call, so nested or repeated walks over the same entry never interfere.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
	path: String,
	literals: Vec<Literal>,
}

impl Entry {
	pub(crate) fn new(path: String) -> Self {
		Entry {
			path,
			literals: Vec::new(),
		}
	}

	/// Fully qualified dotted path of this entry.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Final path segment.
	pub fn name(&self) -> &str {
		self.path.rsplit('.').next().unwrap_or(&self.path)
	}

	pub fn literals(&self) -> &[Literal] {
		&self.literals
	}

	pub fn len(&self) -> usize {
		self.literals.len()
	}

	pub fn is_empty(&self) -> bool {
		self.literals.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Literal> {
		self.literals.get(index)
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Literal> {
		self.literals.iter()
	}

	/// Replace the whole list with a single literal (last write wins).
	/// Returns true if earlier literals were discarded.
	pub fn set(&mut self, literal: Literal) -> bool {
		let replaced = !self.literals.is_empty();
		self.literals.clear();
		self.literals.push(literal);
		replaced
	}

	pub fn append(&mut self, literal: Literal) {
		self.literals.push(literal);
	}

	pub fn prepend(&mut self, literal: Literal) {
		self.literals.insert(0, literal);
	}

	/// Replace the literal at `index`, returning the old one. An index past
	/// the end appends instead and returns `None`.
	pub fn replace_at(&mut self, index: usize, literal: Literal) -> Option<Literal> {
		match self.literals.get_mut(index) {
			Some(slot) => Some(std::mem::replace(slot, literal)),
			None => {
				self.literals.push(literal);
				None
			}
		}
	}

	pub fn clear(&mut self) {
		self.literals.clear();
	}
}

impl<'a> IntoIterator for &'a Entry {
	type Item = &'a Literal;
	type IntoIter = std::slice::Iter<'a, Literal>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry() -> Entry {
		Entry::new("section.name".to_string())
	}

	#[test]
	fn test_append_preserves_order() {
		let mut e = entry();
		e.append(Literal::string("x"));
		e.append(Literal::string("y"));
		assert_eq!(e.get(0).unwrap().as_str(), Some("x"));
		assert_eq!(e.get(1).unwrap().as_str(), Some("y"));
		assert!(e.get(2).is_none());
	}

	#[test]
	fn test_prepend() {
		let mut e = entry();
		e.append(Literal::integer(2));
		e.prepend(Literal::integer(1));
		let values: Vec<_> = e.iter().map(|l| l.to_int().unwrap()).collect();
		assert_eq!(values, vec![1, 2]);
	}

	#[test]
	fn test_set_discards_previous_values() {
		let mut e = entry();
		assert!(!e.set(Literal::integer(1)));
		e.append(Literal::integer(2));
		assert!(e.set(Literal::integer(3)));
		assert_eq!(e.len(), 1);
		assert_eq!(e.get(0).unwrap().to_int(), Some(3));
	}

	#[test]
	fn test_replace_at() {
		let mut e = entry();
		e.append(Literal::string("a"));
		e.append(Literal::string("b"));

		let old = e.replace_at(1, Literal::string("c"));
		assert_eq!(old, Some(Literal::string("b")));
		assert_eq!(e.get(1).unwrap().as_str(), Some("c"));

		// Past the end appends.
		assert_eq!(e.replace_at(9, Literal::string("d")), None);
		assert_eq!(e.len(), 3);
		assert_eq!(e.get(2).unwrap().as_str(), Some("d"));
	}

	#[test]
	fn test_nested_iteration_is_independent() {
		let mut e = entry();
		e.append(Literal::integer(1));
		e.append(Literal::integer(2));

		let mut pairs = Vec::new();
		for outer in &e {
			for inner in &e {
				pairs.push((outer.to_int().unwrap(), inner.to_int().unwrap()));
			}
		}
		assert_eq!(pairs, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
	}

	#[test]
	fn test_clear_and_name() {
		let mut e = entry();
		e.append(Literal::bool(true));
		e.clear();
		assert!(e.is_empty());
		assert_eq!(e.name(), "name");
	}
}
