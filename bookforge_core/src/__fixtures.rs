use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::ArchiveUnpacker;
use crate::BookforgeResult;
use crate::DocumentNode;
use crate::Heading;
use crate::generate_id;

/// Create a temporary book from `(relative path, content)` pairs.
pub(crate) fn book_dir(files: &[(&str, &str)]) -> TempDir {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	for (relative, content) in files {
		write_file(tmp.path(), relative, content);
	}

	tmp
}

pub(crate) fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
	}
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("write: {e}"));

	path
}

pub(crate) fn heading(level: usize, text: &str, children: Vec<Heading>) -> Heading {
	Heading {
		level,
		text: text.to_string(),
		id: generate_id(text),
		children,
	}
}

/// Indented titles of every node below `node`, one per line.
pub(crate) fn outline(node: &DocumentNode) -> String {
	node.descendants()
		.iter()
		.map(|(depth, child)| format!("{}{}", "  ".repeat(*depth), child.title))
		.collect::<Vec<_>>()
		.join("\n")
}

pub(crate) fn child_titles(node: &DocumentNode) -> Vec<&str> {
	node.children
		.iter()
		.map(|child| child.title.as_str())
		.collect()
}

/// Pretends to unpack every archive into a fixed directory.
pub(crate) struct FixedUnpacker(pub PathBuf);

impl ArchiveUnpacker for FixedUnpacker {
	fn unpack(&self, _archive: &Path) -> BookforgeResult<PathBuf> {
		Ok(self.0.clone())
	}
}
