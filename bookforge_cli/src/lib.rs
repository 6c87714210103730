use std::path::PathBuf;

use bookforge_core::ParseMode;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Turn a folder of markdown files into a navigable book.",
	long_about = "bookforge reads a directory of markdown files, such as a GitBook project or a \
	              Notion workspace export, and builds the document tree of the book.\n\nQuick \
	              start:\n  bookforge tree             Print the chapter hierarchy\n  bookforge \
	              pages            List the generated page names\n  bookforge render FILE      \
	              Render one document to HTML"
)]
pub struct BookforgeCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the book directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// How the document tree is resolved. Overrides the config file.
	#[arg(long, short, global = true, value_enum)]
	pub mode: Option<ModeArg>,

	/// Comma separated directory name fragments to skip. Overrides the config
	/// file.
	#[arg(long, global = true, value_delimiter = ',')]
	pub ignore: Option<Vec<String>>,

	/// Title of the root node.
	#[arg(long, global = true)]
	pub title: Option<String>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Print the document tree of the book.
	///
	/// Every node is printed as its title, indented by its depth. Use
	/// `--format json` to print the full node structure including content and
	/// headings.
	Tree {
		/// Output format for the tree.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List the page generated for every node of the tree.
	///
	/// Prints the page file name and the node title separated by a tab, one
	/// node per line in tree order.
	Pages,
	/// Render a markdown file, template tags included, to HTML on stdout.
	Render {
		/// The markdown file to render. Includes are resolved next to it.
		file: PathBuf,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Indented titles.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
	/// Chapters listed by an entry file (GitBook style).
	#[value(alias = "gitbook")]
	Explicit,
	/// Hierarchy inferred from links and database exports (Notion export).
	#[value(alias = "notion")]
	Graph,
}

impl From<ModeArg> for ParseMode {
	fn from(mode: ModeArg) -> Self {
		match mode {
			ModeArg::Explicit => Self::Explicit,
			ModeArg::Graph => Self::Graph,
		}
	}
}
