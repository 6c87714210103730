use std::sync::LazyLock;

use regex::Regex;

use crate::ParseMode;
use crate::document::DocumentNode;

static NON_SLUG_CHARS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

static SLUG_SEPARATORS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[\s-]+").expect("valid regex"));

/// Maps a document node to the name (without extension) of the page
/// generated for it.
pub trait FileNamer {
	fn file_name(&self, node: &DocumentNode) -> String;
}

/// Names pages after the file stem of the node's source path.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasenameNamer;

impl FileNamer for BasenameNamer {
	fn file_name(&self, node: &DocumentNode) -> String {
		node.path
			.as_deref()
			.and_then(|path| path.file_stem())
			.and_then(|stem| stem.to_str())
			.map_or_else(|| "index".to_string(), ToString::to_string)
	}
}

/// Names pages after a slug of the node's title.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleSlugNamer;

impl FileNamer for TitleSlugNamer {
	fn file_name(&self, node: &DocumentNode) -> String {
		slugify(&node.title)
	}
}

impl ParseMode {
	/// The page naming convention that belongs to this mode.
	pub fn file_namer(self) -> Box<dyn FileNamer> {
		match self {
			Self::Explicit => Box::new(BasenameNamer),
			Self::Graph => Box::new(TitleSlugNamer),
		}
	}
}

/// Lowercase `text`, drop everything but word characters, whitespace and
/// `-`, and join the remaining words with single `-`.
pub fn slugify(text: &str) -> String {
	let lowered = text.to_lowercase();
	let cleaned = NON_SLUG_CHARS.replace_all(&lowered, "");
	let joined = SLUG_SEPARATORS.replace_all(cleaned.trim(), "-");

	joined.trim_matches('-').to_string()
}
