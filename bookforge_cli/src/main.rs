use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use bookforge_cli::BookforgeCli;
use bookforge_cli::Commands;
use bookforge_cli::OutputFormat;
use bookforge_core::AnyEmptyResult;
use bookforge_core::BookParser;
use bookforge_core::BookforgeConfig;
use bookforge_core::BookforgeError;
use bookforge_core::BookforgeResult;
use bookforge_core::DocumentNode;
use bookforge_core::MarkdownRenderer;
use bookforge_core::ParserOptions;
use bookforge_core::parse_markdown_file;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = BookforgeCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Tree { format }) => run_tree(&args, *format),
		Some(Commands::Pages) => run_pages(&args),
		Some(Commands::Render { file }) => run_render(&args, file),
		None => {
			eprintln!("No subcommand specified. Run `bookforge --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<BookforgeError>() {
			Ok(bookforge_err) => {
				let report: miette::Report = (*bookforge_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr at `warn`, or `debug` with `--verbose`. `RUST_LOG` takes
/// precedence over both.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn resolve_root(args: &BookforgeCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Parser options from the book's config file with command line overrides
/// applied on top.
fn load_options(args: &BookforgeCli, root: &Path) -> BookforgeResult<ParserOptions> {
	let config = if root.is_dir() {
		BookforgeConfig::load(root)?
	} else {
		None
	};
	if config.is_some() {
		tracing::debug!(root = %root.display(), "loaded config file");
	}

	let mut options = ParserOptions::from_config(config.as_ref());
	if let Some(mode) = args.mode {
		options.mode = mode.into();
	}
	if let Some(ignore) = &args.ignore {
		options.ignore_patterns.clone_from(ignore);
	}
	if let Some(title) = &args.title {
		options.root_title.clone_from(title);
	}

	Ok(options)
}

fn parse_book(args: &BookforgeCli) -> BookforgeResult<(DocumentNode, ParserOptions)> {
	let root = resolve_root(args);
	let options = load_options(args, &root)?;
	let book = BookParser::new(options.clone()).parse_project(&root, None)?;

	Ok((book, options))
}

fn run_tree(args: &BookforgeCli, format: OutputFormat) -> AnyEmptyResult {
	let (book, _) = parse_book(args)?;

	match format {
		OutputFormat::Text => {
			println!("{}", colored!(book.title, bold));
			for (depth, node) in book.descendants() {
				println!("{}{}", "  ".repeat(depth + 1), node.title);
			}
			if book.children.is_empty() {
				println!("{}", colored!("(no documents found)", dimmed));
			}
		}
		OutputFormat::Json => {
			println!("{}", serde_json::to_string_pretty(&book)?);
		}
	}

	Ok(())
}

fn run_pages(args: &BookforgeCli) -> AnyEmptyResult {
	let (book, options) = parse_book(args)?;
	let namer = options.mode.file_namer();

	for (_, node) in book.descendants() {
		println!("{}.html\t{}", namer.file_name(node), node.title);
	}

	Ok(())
}

fn run_render(args: &BookforgeCli, file: &Path) -> AnyEmptyResult {
	let root = resolve_root(args);
	let options = load_options(args, &root)?;
	let node: DocumentNode = parse_markdown_file(file, options.max_file_size)?.into();
	let html = MarkdownRenderer::new(&options).render_node(&node)?;

	println!("{html}");

	Ok(())
}
