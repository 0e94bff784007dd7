//! Export of a store as a flat TOML document.
//!
//! Every entry becomes one key, the quoted dotted path. Entries holding a
//! single literal export as a scalar, all others as an array. Strings are
//! exported with their macro references expanded.

use crate::error::{CfgError, Result};
use crate::store::{Literal, Store, Value};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Scalar {
	String(String),
	Integer(i64),
	Float(f64),
	Bool(bool),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Exported {
	Single(Scalar),
	List(Vec<Scalar>),
}

fn scalar(store: &Store, literal: &Literal) -> Result<Scalar> {
	Ok(match literal.value() {
		Value::String(_) => Scalar::String(store.render(literal)?),
		Value::Integer(n) => Scalar::Integer(*n),
		Value::Float(n) => Scalar::Float(*n),
		Value::Bool(b) => Scalar::Bool(*b),
	})
}

/// Render the whole store as TOML.
pub fn to_toml(store: &Store) -> Result<String> {
	let mut table = BTreeMap::new();
	for entry in store.iter() {
		let mut values = entry
			.iter()
			.map(|literal| scalar(store, literal))
			.collect::<Result<Vec<_>>>()?;
		let exported = if values.len() == 1 {
			Exported::Single(values.remove(0))
		} else {
			Exported::List(values)
		};
		table.insert(entry.path().to_string(), exported);
	}
	toml::to_string(&table).map_err(|source| CfgError::Export { source })
}
