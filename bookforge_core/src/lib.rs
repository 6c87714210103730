//! `bookforge_core` turns a directory of markdown files into a navigable
//! document tree and renders the documents, with their GitBook style
//! template tags, to HTML.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Input directory (or archive, via an ArchiveUnpacker)
//!   → Walker (sorted, depth first, ignored directory names pruned)
//!   → Relation graph (markdown backlinks + database export rows)
//!   → Tree materializer (entry file order, or depth first from the top entities)
//!   → Document tree (title, content and heading outline per node)
//!   → Renderer (block tokenizer + template tag registry + markdown to HTML)
//! ```
//!
//! ## Parse Modes
//!
//! - [`ParseMode::Explicit`] reads the chapter order from the list links of
//!   `README.md`, `SUMMARY.md` or `index.md`. Without an entry file every
//!   markdown file becomes a chapter in walk order.
//! - [`ParseMode::Graph`] derives the hierarchy from the links between files.
//!   Database exports (`*_all.csv`) become generated table pages whose rows
//!   link to the matching markdown files.
//!
//! ## Key Types
//!
//! - [`BookParser`] parses a directory into a [`DocumentNode`] tree.
//! - [`RelationGraph`] holds parent to child edges in discovery order.
//! - [`MarkdownRenderer`] renders markdown with template tags to HTML.
//! - [`BookforgeConfig`] is loaded from `bookforge.toml`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bookforge_core::BookParser;
//! use bookforge_core::MarkdownRenderer;
//! use bookforge_core::ParserOptions;
//! use std::path::Path;
//!
//! let options = ParserOptions::default();
//! let book = BookParser::new(options.clone())
//! 	.parse(Path::new("./docs"))
//! 	.unwrap();
//! let renderer = MarkdownRenderer::new(&options);
//!
//! for (_, node) in book.descendants() {
//! 	let html = renderer.render_node(node).unwrap();
//! 	println!("{}: {} bytes", node.title, html.len());
//! }
//! ```

pub use book::*;
pub use config::*;
pub use database::*;
pub use document::*;
pub use error::*;
pub use headings::*;
pub use links::*;
pub use naming::*;
pub use project::*;
pub use relation::*;
pub use render::*;
pub use tokenizer::*;
pub use tokens::*;

mod book;
pub mod config;
mod database;
mod document;
#[allow(unused_assignments)]
mod error;
mod headings;
pub(crate) mod lexer;
mod links;
mod naming;
pub mod project;
mod relation;
mod render;
mod tokenizer;
mod tokens;

#[cfg(test)]
mod __fixtures;
