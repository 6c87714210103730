use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::BookforgeResult;
use crate::ParseMode;
use crate::config::BookforgeConfig;
use crate::config::DEFAULT_ROOT_TITLE;
use crate::database::TabularDatabase;
use crate::database::is_database_export;
use crate::database::resolve_database;
use crate::document::read_document_source;
use crate::links::extract_backlinks;
use crate::links::is_markdown_file;
use crate::relation::DocumentId;
use crate::relation::RelationGraph;

/// Options for controlling how a book is parsed.
///
/// Use [`ParserOptions::default()`] for the built-in defaults or
/// [`ParserOptions::from_config`] to construct from a [`BookforgeConfig`].
#[derive(Debug, Clone)]
pub struct ParserOptions {
	/// How the document tree is resolved.
	pub mode: ParseMode,
	/// Directory name fragments that prune a directory from every walk.
	pub ignore_patterns: Vec<String>,
	/// Maximum depth of the materialized tree and of nested template tags.
	pub max_depth: usize,
	/// Maximum size in bytes of a markdown file.
	pub max_file_size: u64,
	/// Title of the synthetic root node.
	pub root_title: String,
}

impl Default for ParserOptions {
	fn default() -> Self {
		Self::from_config(None)
	}
}

impl ParserOptions {
	/// Construct [`ParserOptions`] from an optional [`BookforgeConfig`].
	pub fn from_config(config: Option<&BookforgeConfig>) -> Self {
		let defaults = BookforgeConfig::default();
		let config = config.unwrap_or(&defaults);

		Self {
			mode: config.mode,
			ignore_patterns: config.ignore.clone(),
			max_depth: config.max_depth,
			max_file_size: config.max_file_size,
			root_title: config
				.title
				.clone()
				.unwrap_or_else(|| DEFAULT_ROOT_TITLE.to_string()),
		}
	}

	/// Options for `mode` with everything else left at its default.
	pub fn with_mode(mode: ParseMode) -> Self {
		Self {
			mode,
			..Self::default()
		}
	}
}

/// Relations discovered in a book directory.
#[derive(Debug, Default)]
pub struct Relations {
	pub graph: RelationGraph,
	/// Parsed database exports keyed by their path.
	pub databases: IndexMap<DocumentId, TabularDatabase>,
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

/// List a directory sorted by file name.
pub fn sorted_dir_entries(dir: &Path) -> BookforgeResult<Vec<PathBuf>> {
	let mut entries = Vec::new();
	for entry in std::fs::read_dir(dir)? {
		entries.push(entry?.path());
	}
	entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

	Ok(entries)
}

fn is_ignored_directory_name(name: &str, ignore_patterns: &[String]) -> bool {
	ignore_patterns
		.iter()
		.any(|pattern| name.contains(pattern.as_str()))
}

/// Visit every file below `dir` depth first. Subdirectories are entered as
/// soon as they are listed, before their later siblings.
fn walk_dir(
	dir: &Path,
	ignore_patterns: &[String],
	visited_dirs: &mut HashSet<PathBuf>,
	visit: &mut dyn FnMut(&Path),
) {
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		tracing::warn!(path = %dir.display(), "skipping directory that was already walked");
		return;
	}

	let entries = match sorted_dir_entries(dir) {
		Ok(entries) => entries,
		Err(error) => {
			tracing::warn!(path = %dir.display(), %error, "skipping unreadable directory");
			return;
		}
	};

	for path in entries {
		if path.is_dir() {
			let name = path
				.file_name()
				.and_then(|name| name.to_str())
				.unwrap_or_default();
			if is_ignored_directory_name(name, ignore_patterns) {
				continue;
			}
			walk_dir(&path, ignore_patterns, visited_dirs, visit);
		} else if path.is_file() {
			visit(&path);
		}
	}
}

/// Collect every markdown file below `root` in walk order.
pub fn collect_markdown_files(root: &Path, ignore_patterns: &[String]) -> Vec<PathBuf> {
	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();

	walk_dir(root, ignore_patterns, &mut visited_dirs, &mut |path| {
		if is_markdown_file(path) {
			files.push(path.to_path_buf());
		}
	});

	files
}

/// Walk `root` and record every link between markdown files and every
/// database export row matched to a markdown file.
pub fn discover_relations(root: &Path, options: &ParserOptions) -> Relations {
	let mut relations = Relations::default();
	let mut visited_dirs = HashSet::new();

	walk_dir(
		root,
		&options.ignore_patterns,
		&mut visited_dirs,
		&mut |path| {
			if is_markdown_file(path) {
				record_backlinks(path, options.max_file_size, &mut relations.graph);
			} else if is_database_export(path) {
				match resolve_database(path, &mut relations.graph) {
					Ok(Some(database)) => {
						relations.databases.insert(path.to_path_buf(), database);
					}
					Ok(None) => {}
					Err(error) => {
						tracing::warn!(path = %path.display(), %error, "skipping database export");
					}
				}
			}
		},
	);

	tracing::debug!(
		edges = relations.graph.edge_count(),
		databases = relations.databases.len(),
		"discovered relations"
	);

	relations
}

fn record_backlinks(path: &Path, max_file_size: u64, graph: &mut RelationGraph) {
	let content = match read_document_source(path, max_file_size) {
		Ok(content) => content,
		Err(error) => {
			tracing::warn!(path = %path.display(), %error, "skipping unreadable markdown file");
			return;
		}
	};

	for link in extract_backlinks(path, &content) {
		graph.add_relation(path, link.path, link.relative_path);
	}
}
