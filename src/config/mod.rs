//! Configuration loading and parsing for nestcfg.
//!
//! This module handles:
//! - Structural parsing of token streams into a store
//! - Strict and error-recovering parse modes
//! - Config file reading and directory cascade discovery

pub mod cascade;
pub mod parser;

use crate::error::Result;
use crate::store::Store;

pub use cascade::{
	CONFIG_FILE_NAME, check_config_file, discover_configs, load_cascade, load_file,
	parse_config_file, read_config_file, user_config_path,
};
pub use parser::{ParseOutcome, Parser};

/// Name used in diagnostics for buffers that did not come from a file.
pub const ANONYMOUS_SOURCE: &str = "<input>";

/// Parse a fully buffered config, stopping at the first error.
pub fn load(buffer: &[u8]) -> Result<Store> {
	load_named(ANONYMOUS_SOURCE, buffer).map(|outcome| outcome.store)
}

/// Parse a buffer named `source`, keeping its warnings.
pub fn load_named(source: &str, buffer: &[u8]) -> Result<ParseOutcome> {
	Parser::new(source, buffer).parse()
}

/// Parse a buffer named `source`, recording every error instead of stopping.
pub fn load_recovering(source: &str, buffer: &[u8]) -> ParseOutcome {
	Parser::new(source, buffer).parse_recovering()
}
