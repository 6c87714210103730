use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use tracing::instrument;

use crate::BookforgeError;
use crate::BookforgeResult;
use crate::ParseMode;
use crate::document::DocumentNode;
use crate::document::markdown_file_to_node;
use crate::links::extract_list_links;
use crate::project::ParserOptions;
use crate::project::Relations;
use crate::project::collect_markdown_files;
use crate::project::discover_relations;
use crate::relation::DocumentId;

/// Entry files of an explicitly ordered book, in lookup order.
pub const ENTRY_FILE_CANDIDATES: [&str; 3] = ["README.md", "SUMMARY.md", "index.md"];

/// Unpacks archive inputs into a directory. Implemented outside of the core.
pub trait ArchiveUnpacker {
	/// Unpack `archive` and return the directory holding its contents.
	fn unpack(&self, archive: &Path) -> BookforgeResult<PathBuf>;
}

/// Turns a directory of markdown files into a [`DocumentNode`] tree.
///
/// ```rust,no_run
/// use bookforge_core::BookParser;
/// use bookforge_core::ParseMode;
/// use bookforge_core::ParserOptions;
/// use std::path::Path;
///
/// let parser = BookParser::new(ParserOptions::with_mode(ParseMode::Graph));
/// let book = parser.parse(Path::new("./export")).unwrap();
/// for (depth, node) in book.descendants() {
///     println!("{}{}", "  ".repeat(depth), node.title);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BookParser {
	options: ParserOptions,
}

impl BookParser {
	pub fn new(options: ParserOptions) -> Self {
		Self { options }
	}

	pub fn options(&self) -> &ParserOptions {
		&self.options
	}

	/// Resolve `input` to a directory and parse it.
	///
	/// Directories are parsed in place. Archives (`.zip`) are first handed to
	/// `unpacker`; any other input is rejected.
	pub fn parse_project(
		&self,
		input: &Path,
		unpacker: Option<&dyn ArchiveUnpacker>,
	) -> BookforgeResult<DocumentNode> {
		let root = resolve_input(input, unpacker)?;
		self.parse(&root)
	}

	/// Parse the book rooted at the directory `root`.
	pub fn parse(&self, root: &Path) -> BookforgeResult<DocumentNode> {
		let root = root.canonicalize()?;
		if !root.is_dir() {
			return Err(BookforgeError::UnsupportedInput {
				path: root.display().to_string(),
			});
		}

		let book = match self.options.mode {
			ParseMode::Explicit => self.parse_explicit(&root),
			ParseMode::Graph => self.parse_graph(&root),
		};

		Ok(book)
	}

	#[instrument(skip_all, fields(root = %root.display()))]
	fn parse_explicit(&self, root: &Path) -> DocumentNode {
		let mut book = DocumentNode::root(self.options.root_title.clone());

		if let Some(entry_file) = find_entry_file(root) {
			tracing::debug!(entry = %entry_file.display(), "using entry file");
			book.children = self.entry_file_chapters(&entry_file);
		} else {
			tracing::debug!("no entry file found, scanning all markdown files");
			book.children = collect_markdown_files(root, &self.options.ignore_patterns)
				.iter()
				.filter_map(|path| self.convert_markdown(path))
				.collect();
		}

		book
	}

	/// One flat chapter per list item link of the entry file, in list order.
	fn entry_file_chapters(&self, entry_file: &Path) -> Vec<DocumentNode> {
		let content = match std::fs::read_to_string(entry_file) {
			Ok(content) => content,
			Err(error) => {
				tracing::warn!(path = %entry_file.display(), %error, "failed to read entry file");
				return Vec::new();
			}
		};
		let base_dir = entry_file.parent().unwrap_or_else(|| Path::new(""));

		extract_list_links(&content)
			.iter()
			.filter_map(|link| self.convert_markdown(&base_dir.join(&link.target)))
			.collect()
	}

	#[instrument(skip_all, fields(root = %root.display()))]
	fn parse_graph(&self, root: &Path) -> DocumentNode {
		let relations = discover_relations(root, &self.options);
		let top_entities = relations.graph.top_entities();
		tracing::debug!(count = top_entities.len(), "resolved top entities");

		let mut book = DocumentNode::root(self.options.root_title.clone());
		let mut visited = HashSet::new();
		materialize_roots(
			&relations,
			&top_entities,
			&mut visited,
			&self.options,
			&mut book,
		);

		book
	}

	fn convert_markdown(&self, path: &Path) -> Option<DocumentNode> {
		markdown_file_to_node(path, self.options.max_file_size)
	}
}

/// Find the entry file of an explicitly ordered book.
pub fn find_entry_file(root: &Path) -> Option<PathBuf> {
	ENTRY_FILE_CANDIDATES
		.iter()
		.map(|name| root.join(name))
		.find(|path| path.is_file())
}

/// Check that `input` is a directory, unpacking it first when it is an
/// archive.
pub fn resolve_input(input: &Path, unpacker: Option<&dyn ArchiveUnpacker>) -> BookforgeResult<PathBuf> {
	let metadata = std::fs::metadata(input)?;
	if metadata.is_dir() {
		return Ok(input.to_path_buf());
	}

	if !is_archive(input) {
		return Err(BookforgeError::UnsupportedInput {
			path: input.display().to_string(),
		});
	}

	let Some(unpacker) = unpacker else {
		return Err(BookforgeError::ArchiveUnpackerMissing {
			path: input.display().to_string(),
		});
	};

	unpacker.unpack(input)
}

fn is_archive(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Convert a document of the relation graph into a node. Database exports
/// become their generated table, everything else is read as markdown.
pub fn convert_identity(
	id: &Path,
	relations: &Relations,
	options: &ParserOptions,
) -> Option<DocumentNode> {
	match relations.databases.get(id) {
		Some(database) => {
			let namer = options.mode.file_namer();
			Some(database.to_node(namer.as_ref(), options.max_file_size))
		}
		None => markdown_file_to_node(id, options.max_file_size),
	}
}

/// Attach every unvisited top entity, with its reachable documents, under
/// `book`.
pub fn materialize_roots(
	relations: &Relations,
	top_entities: &[DocumentId],
	visited: &mut HashSet<DocumentId>,
	options: &ParserOptions,
	book: &mut DocumentNode,
) {
	for top in top_entities {
		if visited.contains(top) {
			continue;
		}

		let Some(mut node) = convert_identity(top, relations, options) else {
			continue;
		};
		visited.insert(top.clone());
		attach_children(relations, top, &mut node, visited, options, 1);
		book.children.push(node);
	}
}

/// Attach the unvisited children of `parent_id` under `parent`, depth first.
///
/// A child is marked visited before its own children are attached, so a
/// document reached again through a cycle or a second parent is skipped.
fn attach_children(
	relations: &Relations,
	parent_id: &Path,
	parent: &mut DocumentNode,
	visited: &mut HashSet<DocumentId>,
	options: &ParserOptions,
	depth: usize,
) {
	for edge in relations.graph.children(parent_id) {
		if visited.contains(&edge.child) {
			continue;
		}
		visited.insert(edge.child.clone());

		let Some(mut child) = convert_identity(&edge.child, relations, options) else {
			continue;
		};

		if depth < options.max_depth {
			attach_children(relations, &edge.child, &mut child, visited, options, depth + 1);
		} else if !relations.graph.children(&edge.child).is_empty() {
			tracing::warn!(
				path = %edge.child.display(),
				max_depth = options.max_depth,
				"maximum depth reached, children not attached"
			);
		}

		parent.children.push(child);
	}
}
