use crate::config::parser::{ParseOutcome, Parser};
use crate::diagnostics::Diagnostics;
use crate::error::{CfgError, Result};
use crate::store::Store;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in each directory of the cascade and in the home directory.
pub const CONFIG_FILE_NAME: &str = ".nestcfg.conf";

/// Read a whole config file into memory.
pub fn read_config_file(path: &Path) -> Result<Vec<u8>> {
	std::fs::read(path).map_err(|source| {
		if source.kind() == std::io::ErrorKind::NotFound {
			CfgError::ConfigNotFound {
				path: path.to_path_buf(),
			}
		} else {
			CfgError::ConfigReadError {
				path: path.to_path_buf(),
				source,
			}
		}
	})
}

/// Parse a config file into `store`, stopping at the first error.
pub fn parse_config_file(path: &Path, store: Store) -> Result<ParseOutcome> {
	let content = read_config_file(path)?;
	debug!(path = %path.display(), bytes = content.len(), "loading config file");
	Parser::with_store(&path.display().to_string(), &content, store).parse()
}

/// Load a single config file into a fresh store.
pub fn load_file(path: &Path) -> Result<Store> {
	parse_config_file(path, Store::new()).map(|outcome| outcome.store)
}

/// Parse a config file collecting every error. Only I/O problems fail.
pub fn check_config_file(path: &Path) -> Result<ParseOutcome> {
	let content = read_config_file(path)?;
	Ok(Parser::new(&path.display().to_string(), &content).parse_recovering())
}

/// Discover the config files that apply to `start_dir`.
///
/// The cascade order is:
/// 1. ~/.nestcfg.conf, if it exists
/// 2. `.nestcfg.conf` in each ancestor of `start_dir`, outermost first
/// 3. `.nestcfg.conf` in `start_dir` itself
///
/// Files are returned in load order, so the most specific one is loaded last
/// and its values win.
pub fn discover_configs(start_dir: &Path) -> Result<Vec<PathBuf>> {
	let mut configs: Vec<PathBuf> = start_dir
		.ancestors()
		.map(|dir| dir.join(CONFIG_FILE_NAME))
		.filter(|path| path.is_file())
		.collect();
	configs.reverse();

	// A home directory above start_dir was already picked up by the walk.
	if let Ok(user_path) = user_config_path()
		&& user_path.is_file()
		&& !configs.contains(&user_path)
	{
		configs.insert(0, user_path);
	}

	Ok(configs)
}

/// Load every file in order into one store; later files override earlier ones.
pub fn load_cascade(paths: &[PathBuf]) -> Result<ParseOutcome> {
	let mut store = Store::new();
	let mut diagnostics = Diagnostics::new("cascade");

	for path in paths {
		let outcome = parse_config_file(path, store)?;
		store = outcome.store;
		diagnostics.extend(outcome.diagnostics);
	}

	Ok(ParseOutcome { store, diagnostics })
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(CfgError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	#[test]
	fn test_read_missing_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("missing.conf");
		match read_config_file(&path) {
			Err(CfgError::ConfigNotFound { path: p }) => assert_eq!(p, path),
			other => panic!("Expected ConfigNotFound, got {:?}", other),
		}
	}

	#[test]
	fn test_load_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("app.conf");
		fs::write(&path, "app { port = 8080 }").unwrap();

		let store = load_file(&path).unwrap();
		assert_eq!(store.get_int("app.port", 0).unwrap(), 8080);
	}

	#[test]
	fn test_check_config_file_collects_errors() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("bad.conf");
		fs::write(&path, "a { x = 1. }\nb { y = 2 }\nc { z }\n").unwrap();

		let outcome = check_config_file(&path).unwrap();
		assert_eq!(outcome.diagnostics.error_count(), 2);
		assert_eq!(outcome.store.get_int("b.y", 0).unwrap(), 2);
		assert!(outcome.diagnostics.source().ends_with("bad.conf"));
	}

	#[test]
	fn test_discover_configs_outermost_first() {
		let temp_dir = tempfile::tempdir().unwrap();
		let nested = temp_dir.path().join("project").join("sub");
		fs::create_dir_all(&nested).unwrap();

		let outer = temp_dir.path().join(CONFIG_FILE_NAME);
		let inner = nested.join(CONFIG_FILE_NAME);
		fs::write(&outer, "a { b = 1 }").unwrap();
		fs::write(&inner, "a { b = 2 }").unwrap();

		let found = discover_configs(&nested).unwrap();
		let outer_pos = found.iter().position(|p| p == &outer).unwrap();
		let inner_pos = found.iter().position(|p| p == &inner).unwrap();
		assert!(outer_pos < inner_pos);
		assert_eq!(found.last(), Some(&inner));
	}

	#[test]
	fn test_load_cascade_most_specific_wins() {
		let temp_dir = tempfile::tempdir().unwrap();
		let first = temp_dir.path().join("first.conf");
		let second = temp_dir.path().join("second.conf");
		fs::write(&first, "a { b = 1 c = \"kept\" }").unwrap();
		fs::write(&second, "a { b = 2 }").unwrap();

		let outcome = load_cascade(&[first, second]).unwrap();
		assert_eq!(outcome.store.get_int("a.b", 0).unwrap(), 2);
		assert_eq!(outcome.store.get_str("a.c", 0).unwrap(), "kept");
		assert_eq!(outcome.diagnostics.warning_count(), 0);
	}

	#[test]
	fn test_user_config_path() {
		let path = user_config_path();
		assert!(path.is_ok());
		let path = path.unwrap();
		assert!(path.ends_with(CONFIG_FILE_NAME));
	}
}
