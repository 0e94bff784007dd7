//! nestcfg - parser and typed store for nested curly-brace configuration files.
//!
//! This library provides the core functionality for nestcfg, including:
//! - A hand-written lexer for the configuration format
//! - A recursive-descent parser that builds dotted paths from nested sections
//! - A path-keyed store of typed literal lists
//! - Lazy `$(path,index)` macro substitution when strings are read back
//! - Command-line and environment overlays, file cascade discovery, TOML export
//!
//! # Example
//!
//! ```
//! use nestcfg::config::load;
//! use nestcfg::overlay::Assignment;
//!
//! let mut store = load(br#"
//! server {
//!     host = "localhost"
//!     port = 8080
//!     url = "http://$(server.host,0):$(server.port,0)/"
//! }
//! "#).unwrap();
//!
//! Assignment::parse("server.port=9090").unwrap().apply(&mut store).unwrap();
//!
//! assert_eq!(store.get_int("server.port", 0).unwrap(), 9090);
//! assert_eq!(store.get_str("server.url", 0).unwrap(), "http://localhost:9090/");
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod lexer;
pub mod overlay;
pub mod store;
pub mod subst;

pub use config::{ParseOutcome, Parser, load};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CfgError, Result};
pub use store::{Entry, Literal, LiteralKind, Store, Value};
