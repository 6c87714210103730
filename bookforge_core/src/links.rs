use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

static MARKDOWN_LINK: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));

/// A `[text](target)` link as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLink {
	pub text: String,
	pub target: String,
}

/// A link whose target was resolved to an existing markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
	/// Canonical path of the linked file.
	pub path: PathBuf,
	/// The target exactly as written in the link.
	pub relative_path: String,
}

/// Find the first `[text](target)` link on a line.
pub fn first_link(line: &str) -> Option<MarkdownLink> {
	let captures = MARKDOWN_LINK.captures(line)?;

	Some(MarkdownLink {
		text: captures[1].to_string(),
		target: captures[2].to_string(),
	})
}

/// Collect the links of a table of contents file.
///
/// Only list items (lines starting with `*` or `-` once trimmed) are
/// considered and only the first link of each item is taken. List items
/// without a link are skipped. Links are returned in line order.
pub fn extract_list_links(content: &str) -> Vec<MarkdownLink> {
	content
		.lines()
		.map(str::trim)
		.filter(|line| line.starts_with('*') || line.starts_with('-'))
		.filter_map(first_link)
		.collect()
}

/// Collect the links of `file` that point at other markdown files.
///
/// Every line is scanned for its first link regardless of list syntax. The
/// target is percent-decoded and resolved against the directory of `file`.
/// Targets that are not markdown files, do not exist, or cannot be decoded
/// are dropped without a diagnostic.
pub fn extract_backlinks(file: &Path, content: &str) -> Vec<ResolvedLink> {
	let base_dir = file.parent().unwrap_or_else(|| Path::new(""));

	content
		.lines()
		.filter_map(|line| first_link(line.trim()))
		.filter_map(|link| resolve_markdown_target(base_dir, &link.target))
		.collect()
}

fn resolve_markdown_target(base_dir: &Path, target: &str) -> Option<ResolvedLink> {
	let decoded = percent_decode_str(target).decode_utf8().ok()?;
	let candidate = base_dir.join(decoded.as_ref());

	if !is_markdown_file(&candidate) || !candidate.is_file() {
		return None;
	}

	let path = candidate.canonicalize().ok()?;

	Some(ResolvedLink {
		path,
		relative_path: target.to_string(),
	})
}

/// Check if a path has a markdown extension (`.md` or `.markdown`, any case).
pub fn is_markdown_file(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}
