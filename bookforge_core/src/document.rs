use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::BookforgeError;
use crate::BookforgeResult;
use crate::headings::Heading;
use crate::headings::extract_headings;
use crate::headings::extract_title;

/// A node of the materialized document tree.
///
/// The root of a parsed book is a synthetic node without a path; every other
/// node is a markdown file or a database export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentNode {
	pub title: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<PathBuf>,
	/// Raw markdown content of the node.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub headings: Option<Vec<Heading>>,
	pub children: Vec<DocumentNode>,
}

impl DocumentNode {
	/// Create an empty root node.
	pub fn root(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			path: None,
			content: None,
			headings: None,
			children: Vec::new(),
		}
	}

	/// All nodes below this one in pre-order, paired with their depth (direct
	/// children have depth `0`).
	pub fn descendants(&self) -> Vec<(usize, &DocumentNode)> {
		let mut nodes = Vec::new();
		let mut pending: Vec<(usize, &DocumentNode)> =
			self.children.iter().rev().map(|child| (0, child)).collect();

		while let Some((depth, node)) = pending.pop() {
			nodes.push((depth, node));
			pending.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
		}

		nodes
	}
}

/// A markdown file read from disk together with its derived metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownFile {
	pub path: PathBuf,
	pub title: String,
	pub content: String,
	pub headings: Vec<Heading>,
}

impl From<MarkdownFile> for DocumentNode {
	fn from(file: MarkdownFile) -> Self {
		Self {
			title: file.title,
			path: Some(file.path),
			content: Some(file.content),
			headings: Some(file.headings),
			children: Vec::new(),
		}
	}
}

/// Read a markdown file and extract its headings and title.
pub fn parse_markdown_file(path: &Path, max_file_size: u64) -> BookforgeResult<MarkdownFile> {
	let content = read_document_source(path, max_file_size)?;
	let headings = extract_headings(&content);
	let title = extract_title(&headings);

	Ok(MarkdownFile {
		path: path.to_path_buf(),
		title,
		content,
		headings,
	})
}

/// Read a file as UTF-8, refusing files larger than `max_file_size` bytes.
pub(crate) fn read_document_source(path: &Path, max_file_size: u64) -> BookforgeResult<String> {
	let size = std::fs::metadata(path)?.len();
	if size > max_file_size {
		return Err(BookforgeError::FileTooLarge {
			path: path.display().to_string(),
			size,
			limit: max_file_size,
		});
	}

	Ok(std::fs::read_to_string(path)?)
}

/// Convert a markdown file into a tree node.
///
/// A file that cannot be read is logged and yields `None` so that callers
/// can leave it out of the tree and carry on.
pub fn markdown_file_to_node(path: &Path, max_file_size: u64) -> Option<DocumentNode> {
	match parse_markdown_file(path, max_file_size) {
		Ok(file) => Some(file.into()),
		Err(error) => {
			tracing::warn!(path = %path.display(), %error, "skipping unreadable markdown file");
			None
		}
	}
}
