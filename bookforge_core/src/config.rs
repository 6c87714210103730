use std::path::Path;

use serde::Deserialize;

use crate::BookforgeError;
use crate::BookforgeResult;

/// Default maximum file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default bound for graph traversal depth and template tag nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Directory name fragments skipped while walking a book when no `ignore`
/// list is configured.
pub const DEFAULT_IGNORE_PATTERNS: [&str; 4] = ["node_modules", ".git", "dist", "build"];

/// Title given to the synthetic root node of every parsed book.
pub const DEFAULT_ROOT_TITLE: &str = "Root";

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"bookforge.toml",
	".bookforge.toml",
	".config/bookforge.toml",
];

/// How the document tree of a book is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
	/// An entry file (`README.md`, `SUMMARY.md` or `index.md`) lists the
	/// chapters in order. Without an entry file every markdown file in the
	/// directory tree becomes a chapter.
	#[default]
	#[serde(alias = "gitbook")]
	Explicit,
	/// Chapters and their nesting are inferred from the links between files
	/// and from database exports, as produced by a Notion workspace export.
	#[serde(alias = "notion")]
	Graph,
}

/// Configuration loaded from a `bookforge.toml` file.
///
/// ```toml
/// mode = "graph"
/// ignore = ["node_modules", "drafts"]
/// max_depth = 32
/// max_file_size = 1048576
/// title = "Handbook"
/// ```
#[derive(Debug, Deserialize)]
pub struct BookforgeConfig {
	/// How the document tree is resolved.
	#[serde(default)]
	pub mode: ParseMode,
	/// Directory name fragments to skip while walking. A directory whose
	/// name contains any of these substrings is not descended into.
	#[serde(default = "default_ignore_patterns")]
	pub ignore: Vec<String>,
	/// Maximum depth of the materialized tree and of nested template tags.
	#[serde(default = "default_max_depth")]
	pub max_depth: usize,
	/// Maximum size in bytes of a markdown file. Larger files are skipped
	/// with a warning. Defaults to 10 MB.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// Title of the root node.
	#[serde(default)]
	pub title: Option<String>,
}

impl Default for BookforgeConfig {
	fn default() -> Self {
		Self {
			mode: ParseMode::default(),
			ignore: default_ignore_patterns(),
			max_depth: DEFAULT_MAX_DEPTH,
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			title: None,
		}
	}
}

impl BookforgeConfig {
	/// Load the first config file found in `root`. Returns `Ok(None)` when no
	/// candidate exists.
	pub fn load(root: &Path) -> BookforgeResult<Option<Self>> {
		let Some(config_path) = CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
		else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: Self = toml::from_str(&content)
			.map_err(|e| BookforgeError::ConfigParse(format!("{}: {e}", config_path.display())))?;

		Ok(Some(config))
	}
}

fn default_ignore_patterns() -> Vec<String> {
	DEFAULT_IGNORE_PATTERNS
		.iter()
		.map(ToString::to_string)
		.collect()
}

fn default_max_depth() -> usize {
	DEFAULT_MAX_DEPTH
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}
