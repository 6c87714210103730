use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use indexmap::IndexMap;

/// The canonical path identifying a document within one parse run.
pub type DocumentId = PathBuf;

/// A discovered parent to child relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
	pub child: DocumentId,
	/// The link target as written in the parent, kept for rendering.
	pub relative_path: String,
}

/// Adjacency of discovered parent to child edges.
///
/// Parents keep the order in which they were first recorded and edges keep
/// the order in which they were added. Duplicate edges are preserved.
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
	edges: IndexMap<DocumentId, Vec<Edge>>,
}

impl RelationGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append an edge from `parent` to `child`.
	pub fn add_relation(
		&mut self,
		parent: impl Into<DocumentId>,
		child: impl Into<DocumentId>,
		relative_path: impl Into<String>,
	) {
		self.edges.entry(parent.into()).or_default().push(Edge {
			child: child.into(),
			relative_path: relative_path.into(),
		});
	}

	/// Edges leaving `parent`, in insertion order. Empty when `parent` has no
	/// recorded children.
	pub fn children(&self, parent: &Path) -> &[Edge] {
		self.edges.get(parent).map(Vec::as_slice).unwrap_or_default()
	}

	/// Parents that never appear as the child of any edge, in the order they
	/// were first recorded.
	///
	/// A set of documents that only link to each other has no top entity and
	/// is therefore absent from the result.
	pub fn top_entities(&self) -> Vec<DocumentId> {
		let children: HashSet<&Path> = self
			.edges
			.values()
			.flatten()
			.map(|edge| edge.child.as_path())
			.collect();

		self.edges
			.keys()
			.filter(|parent| !children.contains(parent.as_path()))
			.cloned()
			.collect()
	}

	/// Number of recorded edges, duplicates included.
	pub fn edge_count(&self) -> usize {
		self.edges.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.edges.is_empty()
	}
}
