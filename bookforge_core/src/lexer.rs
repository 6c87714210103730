use logos::Logos;
use snailquote::unescape;

use crate::tokens::TagParams;

/// Raw tokens of a template tag header such as `{% hint style="info" %}`.
#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
	#[token("{%")]
	TagOpen,
	#[token("%}")]
	TagClose,
	#[token("=")]
	Equals,
	#[regex(r"[a-zA-Z0-9_]+")]
	Ident,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuotedString,
	#[regex(r"'([^'\\]|\\.)*'")]
	SingleQuotedString,
}

/// The parsed header of a template tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct TagHeader {
	pub name: String,
	pub params: TagParams,
	/// Quoted values that are not part of a `key="value"` pair.
	pub arguments: Vec<String>,
	/// Set when the header holds anything besides the name.
	pub has_extras: bool,
}

impl TagHeader {
	/// A bare `{% name %}` header with nothing after the name.
	pub fn is_bare(&self) -> bool {
		!self.has_extras
	}
}

/// Lex the tag header at the start of `source`.
///
/// `source` must start with `{%`. Returns the header and its length in bytes
/// up to and including the closing `%}`, or `None` when there is no closing
/// `%}` or the header does not start with a name.
pub(crate) fn lex_tag_header(source: &str) -> Option<(TagHeader, usize)> {
	let mut lexer = RawToken::lexer(source);
	if lexer.next() != Some(Ok(RawToken::TagOpen)) {
		return None;
	}

	let mut header = TagHeader::default();
	let mut pending_key: Option<String> = None;
	let mut awaiting_value = false;

	while let Some(result) = lexer.next() {
		let slice = lexer.slice();
		let Ok(raw) = result else {
			header.has_extras = true;
			pending_key = None;
			awaiting_value = false;
			continue;
		};

		match raw {
			RawToken::TagClose => {
				if header.name.is_empty() {
					return None;
				}
				return Some((header, lexer.span().end));
			}
			RawToken::TagOpen => return None,
			RawToken::Ident if header.name.is_empty() => {
				header.name = slice.to_string();
			}
			RawToken::Ident => {
				header.has_extras = true;
				pending_key = Some(slice.to_string());
				awaiting_value = false;
			}
			RawToken::Equals => {
				header.has_extras = true;
				awaiting_value = pending_key.is_some();
			}
			RawToken::DoubleQuotedString | RawToken::SingleQuotedString => {
				if header.name.is_empty() {
					return None;
				}
				header.has_extras = true;
				let value = quoted_value(slice);
				match pending_key.take() {
					Some(key) if awaiting_value => {
						header.params.insert(key, value);
					}
					_ => header.arguments.push(value),
				}
				awaiting_value = false;
			}
		}
	}

	None
}

/// Strip the quotes from a quoted string and resolve its escapes. Strings
/// with broken escapes are kept as written.
fn quoted_value(slice: &str) -> String {
	let inner = &slice[1..slice.len() - 1];
	if !inner.contains('\\') {
		return inner.to_string();
	}

	unescape(inner).unwrap_or_else(|_| inner.to_string())
}
