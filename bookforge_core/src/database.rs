use std::fmt::Write as _;
use std::path::Path;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::BookforgeError;
use crate::BookforgeResult;
use crate::document::DocumentNode;
use crate::document::parse_markdown_file;
use crate::links::is_markdown_file;
use crate::naming::FileNamer;
use crate::naming::slugify;
use crate::project::sorted_dir_entries;
use crate::relation::DocumentId;
use crate::relation::RelationGraph;

/// File name suffix marking a database export.
pub const DATABASE_EXPORT_SUFFIX: &str = "_all.csv";

/// Columns added while resolving rows. They are never shown in the
/// generated table.
const BOOKKEEPING_COLUMNS: [&str; 1] = ["relativePath"];

/// A database export whose rows were matched to markdown files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularDatabase {
	pub source_path: PathBuf,
	/// The export's name prefix, e.g. `Tasks` for `Tasks_all.csv`.
	pub display_name: String,
	/// Header row in file order.
	pub columns: Vec<String>,
	/// Matched rows in the order their markdown files were found.
	pub rows: Vec<DatabaseRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRow {
	/// Column name to cell value.
	pub values: IndexMap<String, String>,
	/// Path of the matched markdown file relative to the export's directory.
	pub relative_path: String,
	pub child: DocumentId,
}

/// Check if `path` is named like a database export.
pub fn is_database_export(path: &Path) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| name.ends_with(DATABASE_EXPORT_SUFFIX))
}

/// The name prefix of a database export: its file name without the export
/// suffix, up to the first space.
pub fn export_name_prefix(path: &Path) -> String {
	let name = path
		.file_name()
		.and_then(|name| name.to_str())
		.unwrap_or_default();
	let name = name.strip_suffix(DATABASE_EXPORT_SUFFIX).unwrap_or(name);

	leading_word(name).to_string()
}

/// The name prefix of a markdown file: its file stem up to the first space.
pub fn document_name_prefix(path: &Path) -> String {
	let stem = path
		.file_stem()
		.and_then(|stem| stem.to_str())
		.unwrap_or_default();

	leading_word(stem).to_string()
}

fn leading_word(name: &str) -> &str {
	name.split(' ').next().unwrap_or(name)
}

/// Parse a database export and link its rows to markdown files.
///
/// The markdown files are looked up in the sibling directory named after the
/// export's prefix, or next to the export when that directory is missing. A
/// file matches the first row whose first column equals the file's name
/// prefix; every match adds an edge from the export to the file.
///
/// Returns `Ok(None)` for exports without data rows.
pub fn resolve_database(
	export_path: &Path,
	graph: &mut RelationGraph,
) -> BookforgeResult<Option<TabularDatabase>> {
	let (columns, records) = read_delimited(export_path)?;
	let Some(key_column) = columns.first() else {
		return Ok(None);
	};
	if records.is_empty() {
		return Ok(None);
	}

	let display_name = export_name_prefix(export_path);
	let base_dir = export_path.parent().unwrap_or_else(|| Path::new(""));
	let named_dir = base_dir.join(&display_name);
	let has_named_dir = named_dir.is_dir();
	let lookup_dir = if has_named_dir {
		named_dir
	} else {
		base_dir.to_path_buf()
	};

	let mut rows = Vec::new();
	for path in sorted_dir_entries(&lookup_dir)? {
		if !is_markdown_file(&path) || !path.is_file() {
			continue;
		}

		let prefix = document_name_prefix(&path);
		let Some(record) = records
			.iter()
			.find(|record| record.get(key_column).is_some_and(|value| *value == prefix))
		else {
			continue;
		};

		let file_name = path
			.file_name()
			.and_then(|name| name.to_str())
			.unwrap_or_default();
		let relative_path = if has_named_dir {
			format!("{display_name}/{file_name}")
		} else {
			file_name.to_string()
		};
		let child = path.canonicalize().unwrap_or_else(|_| path.clone());

		graph.add_relation(export_path, child.clone(), relative_path.clone());
		rows.push(DatabaseRow {
			values: record.clone(),
			relative_path,
			child,
		});
	}

	tracing::debug!(
		path = %export_path.display(),
		matched = rows.len(),
		total = records.len(),
		"resolved database export"
	);

	Ok(Some(TabularDatabase {
		source_path: export_path.to_path_buf(),
		display_name,
		columns,
		rows,
	}))
}

type Record = IndexMap<String, String>;

fn read_delimited(path: &Path) -> BookforgeResult<(Vec<String>, Vec<Record>)> {
	let database_error = |error: csv::Error| BookforgeError::Database {
		path: path.display().to_string(),
		reason: error.to_string(),
	};

	let mut reader = csv::ReaderBuilder::new()
		.flexible(true)
		.from_path(path)
		.map_err(database_error)?;

	let columns: Vec<String> = reader
		.headers()
		.map_err(database_error)?
		.iter()
		.map(|column| column.trim_start_matches('\u{feff}').to_string())
		.collect();

	let mut records = Vec::new();
	for result in reader.records() {
		let record = result.map_err(database_error)?;
		let values = columns
			.iter()
			.enumerate()
			.map(|(index, column)| {
				(
					column.clone(),
					record.get(index).unwrap_or_default().to_string(),
				)
			})
			.collect();
		records.push(values);
	}

	Ok((columns, records))
}

impl TabularDatabase {
	/// Visible columns of the generated table.
	pub fn visible_columns(&self) -> impl Iterator<Item = &str> {
		self.columns
			.iter()
			.map(String::as_str)
			.filter(|column| !BOOKKEEPING_COLUMNS.contains(column))
	}

	/// Render the matched rows as a markdown table. The first cell of every
	/// row links to the page `namer` gives the matched file.
	pub fn to_markdown_table(&self, namer: &dyn FileNamer, max_file_size: u64) -> String {
		let columns: Vec<&str> = self.visible_columns().collect();
		let mut table = String::new();

		let _ = writeln!(table, "| {} |", columns.join(" | "));
		let _ = writeln!(table, "|{}", " --- |".repeat(columns.len()));

		for row in &self.rows {
			let page = row.page_name(namer, max_file_size);
			let cells: Vec<String> = columns
				.iter()
				.enumerate()
				.map(|(index, column)| {
					let value = escape_cell(row.values.get(*column).map_or("", String::as_str));
					if index == 0 {
						format!("[{value}]({page}.html)")
					} else {
						value
					}
				})
				.collect();
			let _ = writeln!(table, "| {} |", cells.join(" | "));
		}

		table
	}

	/// The synthetic tree node standing for this database.
	pub fn to_node(&self, namer: &dyn FileNamer, max_file_size: u64) -> DocumentNode {
		DocumentNode {
			title: self.display_name.clone(),
			path: Some(self.source_path.clone()),
			content: Some(self.to_markdown_table(namer, max_file_size)),
			headings: Some(Vec::new()),
			children: Vec::new(),
		}
	}
}

impl DatabaseRow {
	/// Name of the page generated for the matched file. Falls back to a slug
	/// of the file stem when the file can no longer be read.
	pub fn page_name(&self, namer: &dyn FileNamer, max_file_size: u64) -> String {
		match parse_markdown_file(&self.child, max_file_size) {
			Ok(file) => namer.file_name(&file.into()),
			Err(_) => {
				let stem = self
					.child
					.file_stem()
					.and_then(|stem| stem.to_str())
					.unwrap_or_default();

				slugify(stem)
			}
		}
	}
}

fn escape_cell(value: &str) -> String {
	value.replace('|', "\\|").replace(['\r', '\n'], " ")
}
