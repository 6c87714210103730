use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum BookforgeError {
	#[error(transparent)]
	#[diagnostic(code(bookforge::io_error))]
	Io(#[from] std::io::Error),

	#[error("failure to render markdown: {0}")]
	#[diagnostic(code(bookforge::markdown))]
	Markdown(String),

	#[error("unsupported input: `{path}` is neither a directory nor an archive")]
	#[diagnostic(
		code(bookforge::unsupported_input),
		help("point bookforge at a directory of markdown files or a `.zip` export")
	)]
	UnsupportedInput { path: String },

	#[error("archive input `{path}` requires an unpacker")]
	#[diagnostic(
		code(bookforge::archive_unpacker_missing),
		help("unpack the archive first and pass the resulting directory")
	)]
	ArchiveUnpackerMissing { path: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(bookforge::config_parse),
		help("check that bookforge.toml is valid TOML with `mode`, `ignore` and `max_depth` keys")
	)]
	ConfigParse(String),

	#[error("failed to read database export `{path}`: {reason}")]
	#[diagnostic(code(bookforge::database))]
	Database { path: String, reason: String },

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(bookforge::file_too_large),
		help("increase `max_file_size` in bookforge.toml or ignore this file")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },
}

pub type BookforgeResult<T> = Result<T, BookforgeError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
