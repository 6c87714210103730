use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::project::normalize_line_endings;

/// Title used for documents without any heading.
pub const UNTITLED: &str = "Untitled";

static ATX_HEADING: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid regex"));

static HTML_TAG: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)<[!/a-z].*?>").expect("valid regex"));

static ID_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r##"[\x{2000}-\x{206F}\x{2E00}-\x{2E7F}\\'!"#$%&()*+,./:;<=>?@\[\]^`{|}~]"##)
		.expect("valid regex")
});

static WHITESPACE_RUN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A heading and the headings nested beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
	/// Heading level, `1` to `6`.
	pub level: usize,
	/// Heading text with surrounding whitespace removed.
	pub text: String,
	/// Anchor id generated from `text`.
	pub id: String,
	pub children: Vec<Heading>,
}

/// Build the nested heading forest of a markdown document.
///
/// Every line (trimmed) that starts with one to six `#` characters followed
/// by whitespace is a heading. A heading nests under the closest preceding
/// heading with a strictly smaller level; headings with no such ancestor are
/// returned as roots in document order.
pub fn extract_headings(content: &str) -> Vec<Heading> {
	let content = normalize_line_endings(content);
	let mut roots: Vec<Heading> = Vec::new();
	let mut stack: Vec<Heading> = Vec::new();

	for line in content.lines() {
		let Some(captures) = ATX_HEADING.captures(line.trim()) else {
			continue;
		};

		let level = captures[1].len();
		let text = captures[2].trim().to_string();
		let heading = Heading {
			level,
			id: generate_id(&text),
			text,
			children: Vec::new(),
		};

		while stack.last().is_some_and(|open| open.level >= level) {
			close_heading(&mut stack, &mut roots);
		}

		stack.push(heading);
	}

	while !stack.is_empty() {
		close_heading(&mut stack, &mut roots);
	}

	roots
}

/// Pop the innermost open heading and attach it to its parent, or to the
/// roots when nothing encloses it.
fn close_heading(stack: &mut Vec<Heading>, roots: &mut Vec<Heading>) {
	let Some(closed) = stack.pop() else {
		return;
	};

	match stack.last_mut() {
		Some(parent) => parent.children.push(closed),
		None => roots.push(closed),
	}
}

/// Generate the anchor id for a heading text.
///
/// The text is lowercased, html tags and punctuation are removed, whitespace
/// runs become a single `-` and leading or trailing `-` are trimmed.
pub fn generate_id(text: &str) -> String {
	let lowered = text.to_lowercase();
	let without_tags = HTML_TAG.replace_all(lowered.trim(), "");
	let without_punctuation = ID_PUNCTUATION.replace_all(&without_tags, "");
	let hyphenated = WHITESPACE_RUN.replace_all(&without_punctuation, "-");

	hyphenated.trim_matches('-').to_string()
}

/// Choose a document title: the first level one heading, otherwise the
/// first heading of any level, otherwise [`UNTITLED`].
pub fn extract_title(headings: &[Heading]) -> String {
	headings
		.iter()
		.find(|heading| heading.level == 1)
		.or_else(|| headings.first())
		.map_or_else(|| UNTITLED.to_string(), |heading| heading.text.clone())
}
