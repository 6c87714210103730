use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::lexer::lex_tag_header;
use crate::tokens::BlockToken;
use crate::tokens::IncludeToken;
use crate::tokens::StepItem;
use crate::tokens::StepperToken;
use crate::tokens::TabItem;
use crate::tokens::TabsToken;
use crate::tokens::TemplateTagToken;

static STEPPER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?s)^\{%\s*stepper\s*%\}(.*?)\{%\s*endstepper\s*%\}").expect("valid regex")
});

static STEP_ITEM: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?s)\{%\s*step\s*%\}(.*?)\{%\s*endstep\s*%\}").expect("valid regex")
});

static TABS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?s)^\{%\s*tabs\s*%\}(.*?)\{%\s*endtabs\s*%\}").expect("valid regex")
});

static TAB_ITEM: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?s)\{%\s*tab\s+title="([^"]+)"\s*%\}(.*?)\{%\s*endtab\s*%\}"#)
		.expect("valid regex")
});

static INCLUDE_TAG: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"^\{%\s*include\s+"(\S+)"\s*%\}"#).expect("valid regex")
});

/// Splits markdown into plain markdown segments and template tags.
///
/// At every `{%` outside of fenced code the tag kinds are tried in order:
/// stepper, tabs, include and finally a generic `{% name %}...{% endname %}`
/// block. Text that matches none of them stays markdown. Tag bodies are
/// tokenized again, up to `max_depth` levels deep.
#[derive(Debug, Clone, Copy)]
pub struct BlockTokenizer {
	max_depth: usize,
}

impl Default for BlockTokenizer {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_DEPTH)
	}
}

impl BlockTokenizer {
	pub fn new(max_depth: usize) -> Self {
		Self { max_depth }
	}

	pub fn tokenize(&self, source: &str) -> Vec<BlockToken> {
		self.tokenize_at_depth(source, 0)
	}

	fn tokenize_at_depth(&self, source: &str, depth: usize) -> Vec<BlockToken> {
		let fences = fenced_code_ranges(source);
		let mut tokens = Vec::new();
		let mut segment_start = 0;
		let mut cursor = 0;

		while let Some(start) = next_tag_start(source, cursor, &fences) {
			match self.block_at(source, start, &fences, depth) {
				Some((token, len)) => {
					push_markdown(&mut tokens, &source[segment_start..start]);
					tokens.push(token);
					segment_start = start + len;
					cursor = segment_start;
				}
				None => cursor = start + 2,
			}
		}

		push_markdown(&mut tokens, &source[segment_start..]);
		tokens
	}

	/// The block starting at `start`, with its length in bytes.
	fn block_at(
		&self,
		source: &str,
		start: usize,
		fences: &[Range<usize>],
		depth: usize,
	) -> Option<(BlockToken, usize)> {
		if depth >= self.max_depth {
			return None;
		}

		let rest = &source[start..];
		self.stepper(rest, depth)
			.or_else(|| self.tabs(rest, depth))
			.or_else(|| include(rest))
			.or_else(|| self.generic_tag(source, start, fences, depth))
	}

	fn stepper(&self, rest: &str, depth: usize) -> Option<(BlockToken, usize)> {
		let captures = STEPPER_BLOCK.captures(rest)?;
		let whole = captures.get(0)?;
		let body = captures.get(1).map_or("", |body| body.as_str());

		let steps = STEP_ITEM
			.captures_iter(body)
			.map(|step| {
				let content = step.get(1).map_or("", |content| content.as_str());
				StepItem {
					content: content.to_string(),
					tokens: self.tokenize_at_depth(content, depth + 1),
				}
			})
			.collect();

		let token = StepperToken {
			raw: whole.as_str().to_string(),
			steps,
		};
		Some((BlockToken::Stepper(token), whole.end()))
	}

	fn tabs(&self, rest: &str, depth: usize) -> Option<(BlockToken, usize)> {
		let captures = TABS_BLOCK.captures(rest)?;
		let whole = captures.get(0)?;
		let body = captures.get(1).map_or("", |body| body.as_str());

		let tabs = TAB_ITEM
			.captures_iter(body)
			.map(|tab| {
				let content = tab.get(2).map_or("", |content| content.as_str());
				TabItem {
					title: tab.get(1).map_or("", |title| title.as_str()).to_string(),
					content: content.to_string(),
					tokens: self.tokenize_at_depth(content, depth + 1),
				}
			})
			.collect();

		let token = TabsToken {
			raw: whole.as_str().to_string(),
			tabs,
		};
		Some((BlockToken::Tabs(token), whole.end()))
	}

	/// A `{% name ... %}` block closed by the matching bare `{% endname %}`.
	///
	/// Opening tags of the same name inside the body must be closed first, so
	/// same-name blocks nest. Without a matching closing tag there is no block.
	fn generic_tag(
		&self,
		source: &str,
		start: usize,
		fences: &[Range<usize>],
		depth: usize,
	) -> Option<(BlockToken, usize)> {
		let (header, header_len) = lex_tag_header(&source[start..])?;
		if header.name.starts_with("end") {
			return None;
		}

		let closing_name = format!("end{}", header.name);
		let body_start = start + header_len;
		let mut open_nested = 0usize;
		let mut cursor = body_start;

		while let Some(position) = next_tag_start(source, cursor, fences) {
			let Some((tag, tag_len)) = lex_tag_header(&source[position..]) else {
				cursor = position + 2;
				continue;
			};
			cursor = position + tag_len;

			if tag.name == header.name {
				open_nested += 1;
			} else if tag.name == closing_name && tag.is_bare() {
				if open_nested > 0 {
					open_nested -= 1;
					continue;
				}

				let inner = &source[body_start..position];
				let token = TemplateTagToken {
					name: header.name,
					params: header.params,
					raw: source[start..cursor].to_string(),
					inner: inner.to_string(),
					tokens: self.tokenize_at_depth(inner, depth + 1),
				};
				return Some((BlockToken::Tag(token), cursor - start));
			}
		}

		None
	}
}

fn include(rest: &str) -> Option<(BlockToken, usize)> {
	let captures = INCLUDE_TAG.captures(rest)?;
	let whole = captures.get(0)?;
	let token = IncludeToken {
		raw: whole.as_str().to_string(),
		path: captures.get(1)?.as_str().to_string(),
	};

	Some((BlockToken::Include(token), whole.end()))
}

fn push_markdown(tokens: &mut Vec<BlockToken>, text: &str) {
	if !text.trim().is_empty() {
		tokens.push(BlockToken::Markdown(text.to_string()));
	}
}

/// Position of the next `{%` at or after `from` that is not inside fenced
/// code.
fn next_tag_start(source: &str, from: usize, fences: &[Range<usize>]) -> Option<usize> {
	source
		.get(from..)?
		.match_indices("{%")
		.map(|(offset, _)| from + offset)
		.find(|position| !fences.iter().any(|fence| fence.contains(position)))
}

/// Byte ranges of fenced code blocks (```` ``` ```` or `~~~`), fences
/// included. An unclosed fence runs to the end of the source.
fn fenced_code_ranges(source: &str) -> Vec<Range<usize>> {
	let mut ranges = Vec::new();
	let mut open: Option<(usize, char, usize)> = None;
	let mut offset = 0;

	for line in source.split_inclusive('\n') {
		let line_start = offset;
		offset += line.len();

		let indent = line.len() - line.trim_start_matches(' ').len();
		if indent > 3 {
			continue;
		}
		let trimmed = &line[indent..];
		let Some(marker) = trimmed.chars().next().filter(|c| *c == '`' || *c == '~') else {
			continue;
		};
		let run = trimmed.chars().take_while(|c| *c == marker).count();
		if run < 3 {
			continue;
		}

		match open {
			None => open = Some((line_start, marker, run)),
			Some((start, open_marker, open_run))
				if marker == open_marker
					&& run >= open_run
					&& trimmed[run..].trim().is_empty() =>
			{
				ranges.push(start..offset);
				open = None;
			}
			Some(_) => {}
		}
	}

	if let Some((start, ..)) = open {
		ranges.push(start..source.len());
	}

	ranges
}
