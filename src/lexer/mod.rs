//! Tokenizer for the configuration format.
//!
//! This module handles:
//! - Byte classification and bareword scanning
//! - The number state machine (sign, digits, fraction, exponent)
//! - Quoted strings with escape sequences
//! - Comments and line tracking

pub mod scanner;
pub mod token;

pub use scanner::{Lexer, tokenize};
pub use token::{NumberKind, Token, TokenKind};
