//! Overlays applied on top of loaded config files.
//!
//! This module handles:
//! - `path=value` assignments from the command line
//! - Environment variables mapped onto dotted paths
//!
//! Overlays write through [`Store::insert_or_update`], the same entry point a
//! parsed `name = value` uses, so the last writer wins.

use crate::error::{CfgError, Result};
use crate::store::{Literal, Store, normalize_path};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Default prefix for environment overlays.
pub const DEFAULT_ENV_PREFIX: &str = "NESTCFG";

static ASSIGNMENT_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\s*([^\s=]+)\s*=(.*)$").expect("valid assignment pattern"));

/// A single `path=value` write.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
	pub path: String,
	pub literal: Literal,
}

impl Assignment {
	pub fn new(path: &str, literal: Literal) -> Result<Self> {
		Ok(Assignment {
			path: normalize_path(path)?,
			literal,
		})
	}

	/// Parse `section.name=value`. The value is typed with [`Literal::infer`].
	pub fn parse(text: &str) -> Result<Self> {
		let captures = ASSIGNMENT_RE
			.captures(text)
			.ok_or_else(|| CfgError::InvalidAssignment {
				text: text.to_string(),
			})?;
		Self::new(&captures[1], Literal::infer(&captures[2]))
	}

	pub fn apply(&self, store: &mut Store) -> Result<()> {
		store.insert_or_update(&self.path, self.literal.clone())?;
		debug!(path = %self.path, value = %self.literal, "applied overlay");
		Ok(())
	}
}

impl FromStr for Assignment {
	type Err = CfgError;

	fn from_str(s: &str) -> Result<Self> {
		Assignment::parse(s)
	}
}

/// Map environment variables onto assignments.
///
/// `PREFIX_SECTION_A__NAME_1=value` becomes `section_a.name_1=value`: the
/// prefix and its `_` are stripped, `__` separates path segments and the
/// result is lowercased. Variables that do not map to a valid path are
/// skipped with a warning.
pub fn env_assignments<I>(prefix: &str, vars: I) -> Vec<Assignment>
where
	I: IntoIterator<Item = (String, String)>,
{
	let mut assignments: Vec<Assignment> = vars
		.into_iter()
		.filter_map(|(name, value)| {
			let rest = name.strip_prefix(prefix)?.strip_prefix('_')?;
			let path = rest.to_lowercase().replace("__", ".");
			match Assignment::new(&path, Literal::infer(&value)) {
				Ok(assignment) => Some(assignment),
				Err(_) => {
					warn!(variable = %name, "environment variable does not map to a config path");
					None
				}
			}
		})
		.collect();
	// The process environment has no stable order.
	assignments.sort_by(|a, b| a.path.cmp(&b.path));
	assignments
}

/// Environment overlay read from the current process.
pub fn process_env_assignments(prefix: &str) -> Vec<Assignment> {
	env_assignments(prefix, std::env::vars())
}

/// Apply assignments in order.
pub fn apply_all(store: &mut Store, assignments: &[Assignment]) -> Result<()> {
	for assignment in assignments {
		assignment.apply(store)?;
	}
	Ok(())
}
