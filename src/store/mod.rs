//! Typed, path-addressed value store.
//!
//! This module handles:
//! - Literals (string, integer, float, bool) that keep their source text
//! - Entries holding ordered literal lists
//! - The path-keyed table with overwrite and accumulate write policies

pub mod entry;
pub mod literal;
pub mod table;

pub use entry::Entry;
pub use literal::{Literal, LiteralKind, Value};
pub use table::{Store, normalize_path};
