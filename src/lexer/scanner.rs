use crate::error::{CfgError, LexErrorKind, Result};
use crate::lexer::token::{NumberKind, Token, TokenKind};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
	Invalid,
	Alpha,
	Digit,
	Punct,
	Space,
}

/// Byte classes, computed once at compile time.
///
/// Besides letters, the bareword alphabet includes the symbols
/// `-+~!@$()%^&*_|\;<>,?/[].` so that paths, macro references and most
/// unquoted values lex as a single word.
const CHAR_CLASSES: [CharClass; 256] = build_char_classes();

const fn build_char_classes() -> [CharClass; 256] {
	let mut table = [CharClass::Invalid; 256];

	let mut i = b'a';
	while i <= b'z' {
		table[i as usize] = CharClass::Alpha;
		table[(i - b'a' + b'A') as usize] = CharClass::Alpha;
		i += 1;
	}

	let mut i = b'0';
	while i <= b'9' {
		table[i as usize] = CharClass::Digit;
		i += 1;
	}

	let symbols = b"-+~!@$()%^&*_|\\;<>,?/[].";
	let mut i = 0;
	while i < symbols.len() {
		table[symbols[i] as usize] = CharClass::Alpha;
		i += 1;
	}

	let punct = b"#{}\":=";
	let mut i = 0;
	while i < punct.len() {
		table[punct[i] as usize] = CharClass::Punct;
		i += 1;
	}

	let space = b" \t\x0c\r\n";
	let mut i = 0;
	while i < space.len() {
		table[space[i] as usize] = CharClass::Space;
		i += 1;
	}

	table
}

fn class_of(byte: u8) -> CharClass {
	CHAR_CLASSES[byte as usize]
}

fn lexical(line: usize, kind: LexErrorKind) -> CfgError {
	CfgError::Lexical { line, kind }
}

/// States of the number scanner. Every state that is not accepting must see
/// a digit next, otherwise the number is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberState {
	Start,
	Sign,
	Integer,
	Dot,
	Fraction,
	Exponent,
	ExponentSign,
	ExponentDigits,
}

/// Hand-written scanner over a fully buffered input.
///
/// Uses a single byte of lookahead and counts lines for diagnostics. Errors
/// always consume at least one byte, so a caller can keep pulling tokens after
/// a failure.
#[derive(Debug)]
pub struct Lexer<'a> {
	src: &'a [u8],
	pos: usize,
	line: usize,
	finished: bool,
}

impl<'a> Lexer<'a> {
	pub fn new(src: &'a [u8]) -> Self {
		Lexer {
			src,
			pos: 0,
			line: 1,
			finished: false,
		}
	}

	/// Line the scanner is currently on (1-based).
	pub fn line(&self) -> usize {
		self.line
	}

	fn peek(&self) -> Option<u8> {
		self.src.get(self.pos).copied()
	}

	fn peek_next(&self) -> Option<u8> {
		self.src.get(self.pos + 1).copied()
	}

	fn bump(&mut self) -> Option<u8> {
		let byte = self.peek()?;
		self.pos += 1;
		Some(byte)
	}

	/// Scan the next token. Returns `Eof` forever once the input is exhausted.
	pub fn next_token(&mut self) -> Result<Token> {
		let token = self.scan()?;
		trace!(line = token.line, kind = ?token.kind, text = %token.text, "token");
		Ok(token)
	}

	fn scan(&mut self) -> Result<Token> {
		loop {
			let line = self.line;
			let Some(ch) = self.peek() else {
				return Ok(Token::new(TokenKind::Eof, "", line));
			};

			match ch {
				b'#' => self.skip_comment(),
				b'=' => return Ok(self.single(TokenKind::Equals)),
				b':' => return Ok(self.single(TokenKind::Colon)),
				b'{' => return Ok(self.single(TokenKind::OpenBrace)),
				b'}' => return Ok(self.single(TokenKind::CloseBrace)),
				b'"' => {
					self.pos += 1;
					return self.quoted(line);
				}
				b'+' | b'.' => return self.number(),
				b'-' => {
					return match self.peek_next() {
						Some(next) if next.is_ascii_digit() => self.number(),
						_ => Ok(self.word(TokenKind::Str)),
					};
				}
				b'\n' => {
					self.pos += 1;
					self.line += 1;
				}
				_ => match class_of(ch) {
					CharClass::Space => self.pos += 1,
					CharClass::Digit => return self.number(),
					CharClass::Alpha => return Ok(self.word(TokenKind::Name)),
					CharClass::Punct | CharClass::Invalid => {
						self.pos += 1;
						return Err(lexical(line, LexErrorKind::UnexpectedChar(char::from(ch))));
					}
				},
			}
		}
	}

	fn single(&mut self, kind: TokenKind) -> Token {
		let start = self.pos;
		self.pos += 1;
		Token::new(kind, self.text(start), self.line)
	}

	/// Text of a token outside quotes. Only ASCII bytes classify as token
	/// characters there, so the slice is always valid UTF-8.
	fn text(&self, start: usize) -> String {
		String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
	}

	fn skip_comment(&mut self) {
		while let Some(ch) = self.peek() {
			if ch == b'\n' {
				break;
			}
			self.pos += 1;
		}
	}

	/// A run of bareword characters. Seeing `$` or `\` anywhere in the run
	/// demotes it to a value-only string.
	fn word(&mut self, mut kind: TokenKind) -> Token {
		let start = self.pos;
		while let Some(ch) = self.peek() {
			match class_of(ch) {
				CharClass::Alpha | CharClass::Digit => {
					if ch == b'$' || ch == b'\\' {
						kind = TokenKind::Str;
					}
					self.pos += 1;
				}
				_ => break,
			}
		}
		Token::new(kind, self.text(start), self.line)
	}

	fn number(&mut self) -> Result<Token> {
		let start = self.pos;
		let line = self.line;
		let mut state = NumberState::Start;
		let mut kind = NumberKind::Integer;

		loop {
			let ch = self.peek();
			let digit = ch.is_some_and(|c| c.is_ascii_digit());
			state = match (state, ch) {
				(NumberState::Start, Some(b'+' | b'-')) => NumberState::Sign,
				(NumberState::Start | NumberState::Sign, Some(b'.')) => NumberState::Dot,
				(NumberState::Start | NumberState::Sign | NumberState::Integer, _) if digit => {
					NumberState::Integer
				}
				(NumberState::Integer, Some(b'.')) => NumberState::Dot,
				(NumberState::Dot | NumberState::Fraction, _) if digit => NumberState::Fraction,
				(NumberState::Integer | NumberState::Fraction, Some(b'e' | b'E')) => {
					NumberState::Exponent
				}
				(NumberState::Exponent, Some(b'+' | b'-')) => NumberState::ExponentSign,
				(NumberState::Exponent | NumberState::ExponentSign | NumberState::ExponentDigits, _)
					if digit =>
				{
					NumberState::ExponentDigits
				}
				(NumberState::Integer | NumberState::Fraction | NumberState::ExponentDigits, _) => {
					break;
				}
				_ => {
					if self.pos == start {
						self.pos += 1;
					}
					return Err(lexical(
						line,
						LexErrorKind::MalformedNumber {
							text: self.text(start),
						},
					));
				}
			};
			if matches!(state, NumberState::Dot | NumberState::Exponent) {
				kind = NumberKind::Float;
			}
			self.pos += 1;
		}

		Ok(Token::new(TokenKind::Number(kind), self.text(start), line))
	}

	fn quoted(&mut self, line: usize) -> Result<Token> {
		let mut buf = Vec::new();
		loop {
			let Some(ch) = self.bump() else {
				return Err(lexical(line, LexErrorKind::UnterminatedString));
			};
			match ch {
				b'"' => break,
				// Raw newlines are counted but not kept.
				b'\n' => self.line += 1,
				b'\\' => {
					if let Err(err) = self.escape(&mut buf, line) {
						self.skip_rest_of_string();
						return Err(err);
					}
				}
				_ => buf.push(ch),
			}
		}
		let text = String::from_utf8(buf).map_err(|_| lexical(line, LexErrorKind::InvalidUtf8))?;
		Ok(Token::new(TokenKind::Quoted, text, line))
	}

	fn escape(&mut self, buf: &mut Vec<u8>, line: usize) -> Result<()> {
		let Some(ch) = self.bump() else {
			return Err(lexical(line, LexErrorKind::UnterminatedString));
		};
		let decoded = match ch {
			b'a' => 0x07,
			b'b' => 0x08,
			b'e' => 0x1b,
			b'f' => 0x0c,
			b'n' => b'\n',
			b'r' => b'\r',
			b't' => b'\t',
			b'v' => 0x0b,
			b'x' => {
				let high = self.hex_digit()?;
				let low = self.hex_digit()?;
				let mut utf8 = [0u8; 4];
				buf.extend_from_slice(char::from(high << 4 | low).encode_utf8(&mut utf8).as_bytes());
				return Ok(());
			}
			b'\n' => {
				self.line += 1;
				b'\n'
			}
			// `\\`, `\'`, `\"` and any unknown escape keep the escaped byte.
			other => other,
		};
		buf.push(decoded);
		Ok(())
	}

	fn hex_digit(&mut self) -> Result<u8> {
		let line = self.line;
		let value = self
			.peek()
			.and_then(|ch| char::from(ch).to_digit(16))
			.ok_or_else(|| lexical(line, LexErrorKind::BadHexEscape))?;
		self.pos += 1;
		Ok(value as u8)
	}

	/// Consume up to and including the closing quote so scanning resumes
	/// after a bad string.
	fn skip_rest_of_string(&mut self) {
		while let Some(ch) = self.bump() {
			match ch {
				b'"' => break,
				b'\\' => {
					if self.bump() == Some(b'\n') {
						self.line += 1;
					}
				}
				b'\n' => self.line += 1,
				_ => {}
			}
		}
	}
}

impl Iterator for Lexer<'_> {
	type Item = Result<Token>;

	/// Yields every token including the final `Eof`, then stops.
	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}
		let token = self.next_token();
		if matches!(token, Ok(ref tok) if tok.is_eof()) {
			self.finished = true;
		}
		Some(token)
	}
}

/// Scan a whole buffer, stopping at the first error.
pub fn tokenize(src: &[u8]) -> Result<Vec<Token>> {
	Lexer::new(src).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(src: &str) -> Vec<TokenKind> {
		tokenize(src.as_bytes())
			.unwrap()
			.into_iter()
			.map(|t| t.kind)
			.collect()
	}

	fn single(src: &str) -> Token {
		let mut lexer = Lexer::new(src.as_bytes());
		lexer.next_token().unwrap()
	}

	fn lex_error(src: &str) -> LexErrorKind {
		match tokenize(src.as_bytes()) {
			Err(CfgError::Lexical { kind, .. }) => kind,
			other => panic!("Expected lexical error, got {:?}", other),
		}
	}

	#[test]
	fn test_punctuation_and_names() {
		assert_eq!(
			kinds("a { b = c : }"),
			vec![
				TokenKind::Name,
				TokenKind::OpenBrace,
				TokenKind::Name,
				TokenKind::Equals,
				TokenKind::Name,
				TokenKind::Colon,
				TokenKind::CloseBrace,
				TokenKind::Eof,
			]
		);
	}

	#[test]
	fn test_comment_is_skipped() {
		let tokens = tokenize(b"# leading comment\nname # trailing\n").unwrap();
		assert_eq!(tokens.len(), 2);
		assert_eq!(tokens[0].text, "name");
		assert_eq!(tokens[0].line, 2);
	}

	#[test]
	fn test_line_counting() {
		let tokens = tokenize(b"a\n\n  b\r\n c").unwrap();
		let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
		assert_eq!(lines, vec![1, 3, 4, 4]);
	}

	#[test]
	fn test_name_with_symbols() {
		let tok = single("some_name.with-dashes[0]");
		assert_eq!(tok.kind, TokenKind::Name);
		assert_eq!(tok.text, "some_name.with-dashes[0]");
	}

	#[test]
	fn test_dollar_or_backslash_makes_string() {
		let tok = single("prefix$(a.b,0)suffix");
		assert_eq!(tok.kind, TokenKind::Str);
		assert_eq!(tok.text, "prefix$(a.b,0)suffix");

		let tok = single(r"C:\path");
		assert_eq!(tok.kind, TokenKind::Name);
		assert_eq!(tok.text, "C");

		let tok = single(r"dir\file");
		assert_eq!(tok.kind, TokenKind::Str);
		assert_eq!(tok.text, r"dir\file");
	}

	#[test]
	fn test_minus_digit_is_number_minus_other_is_string() {
		let tok = single("-5");
		assert_eq!(tok.kind, TokenKind::Number(NumberKind::Integer));
		assert_eq!(tok.text, "-5");

		let tok = single("-abc");
		assert_eq!(tok.kind, TokenKind::Str);
		assert_eq!(tok.text, "-abc");
	}

	#[test]
	fn test_number_grammar() {
		let cases = [
			("42", NumberKind::Integer),
			("+7", NumberKind::Integer),
			("3.25", NumberKind::Float),
			(".5", NumberKind::Float),
			("+.5", NumberKind::Float),
			("1e10", NumberKind::Float),
			("2.5E-3", NumberKind::Float),
			("-6e+2", NumberKind::Float),
		];
		for (src, kind) in cases {
			let tok = single(src);
			assert_eq!(tok.kind, TokenKind::Number(kind), "for {}", src);
			assert_eq!(tok.text, src);
		}
	}

	#[test]
	fn test_number_stops_at_non_digit() {
		let tokens = tokenize(b"12}").unwrap();
		assert_eq!(tokens[0].text, "12");
		assert_eq!(tokens[1].kind, TokenKind::CloseBrace);
	}

	#[test]
	fn test_malformed_numbers() {
		for src in ["3.", "3.x", "1e", "1e+", "+", "+x", ".", "4.e5"] {
			match lex_error(src) {
				LexErrorKind::MalformedNumber { .. } => {}
				other => panic!("Expected MalformedNumber for {}, got {:?}", src, other),
			}
		}
	}

	#[test]
	fn test_quoted_string_escapes() {
		let tok = single(r#""tab\there \"q\" \\ \'s\' \x41\x7e \e""#);
		assert_eq!(tok.kind, TokenKind::Quoted);
		assert_eq!(tok.text, "tab\there \"q\" \\ 's' A~ \x1b");
	}

	#[test]
	fn test_quoted_string_is_not_split_or_interpreted() {
		let tok = single(r#""a = b { c } # not a comment""#);
		assert_eq!(tok.text, "a = b { c } # not a comment");
	}

	#[test]
	fn test_quoted_string_drops_raw_newline() {
		let tokens = tokenize(b"\"line one\nline two\" next").unwrap();
		assert_eq!(tokens[0].text, "line oneline two");
		assert_eq!(tokens[0].line, 1);
		assert_eq!(tokens[1].line, 2);
	}

	#[test]
	fn test_bad_hex_escape() {
		assert_eq!(lex_error(r#""\x4""#), LexErrorKind::BadHexEscape);
		assert_eq!(lex_error(r#""\xzz""#), LexErrorKind::BadHexEscape);
	}

	#[test]
	fn test_unterminated_string() {
		assert_eq!(lex_error("\"never closed"), LexErrorKind::UnterminatedString);
		assert_eq!(lex_error("\"ends in escape\\"), LexErrorKind::UnterminatedString);
	}

	#[test]
	fn test_scanning_resumes_after_bad_escape() {
		let mut lexer = Lexer::new(b"\"\\xz\\\"\n\" next\n");
		assert!(matches!(
			lexer.next_token(),
			Err(CfgError::Lexical {
				line: 1,
				kind: LexErrorKind::BadHexEscape
			})
		));
		let tok = lexer.next_token().unwrap();
		assert_eq!(tok.kind, TokenKind::Name);
		assert_eq!(tok.text, "next");
		assert_eq!(tok.line, 2);
	}

	#[test]
	fn test_quoted_string_must_be_utf8() {
		match tokenize(b"a\n\"caf\xe9\" b") {
			Err(CfgError::Lexical { line, kind }) => {
				assert_eq!(line, 2);
				assert_eq!(kind, LexErrorKind::InvalidUtf8);
			}
			other => panic!("Expected lexical error, got {:?}", other),
		}

		let tok = single("\"caf\u{e9}\"");
		assert_eq!(tok.text, "caf\u{e9}");

		let mut lexer = Lexer::new(b"\"\xff\" next");
		assert!(lexer.next_token().is_err());
		assert_eq!(lexer.next_token().unwrap().text, "next");
	}

	#[test]
	fn test_vertical_tab_is_not_whitespace() {
		assert_eq!(lex_error("a\x0bb"), LexErrorKind::UnexpectedChar('\u{b}'));
		assert_eq!(kinds("a\t\x0c\r\nb"), vec![TokenKind::Name, TokenKind::Name, TokenKind::Eof]);
	}

	#[test]
	fn test_unexpected_character_reports_line() {
		match tokenize(b"a\n\x01") {
			Err(CfgError::Lexical { line, kind }) => {
				assert_eq!(line, 2);
				assert_eq!(kind, LexErrorKind::UnexpectedChar('\u{1}'));
			}
			other => panic!("Expected lexical error, got {:?}", other),
		}
	}

	#[test]
	fn test_scanning_continues_after_error() {
		let mut lexer = Lexer::new(b"3. next");
		assert!(lexer.next_token().is_err());
		let tok = lexer.next_token().unwrap();
		assert_eq!(tok.kind, TokenKind::Name);
		assert_eq!(tok.text, "next");
	}

	#[test]
	fn test_eof_is_sticky() {
		let mut lexer = Lexer::new(b"");
		assert!(lexer.next_token().unwrap().is_eof());
		assert!(lexer.next_token().unwrap().is_eof());
	}
}
