use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use markdown::CompileOptions;
use markdown::Options;
use markdown::ParseOptions;
use regex::Captures;
use regex::Regex;

use crate::BookforgeError;
use crate::BookforgeResult;
use crate::document::DocumentNode;
use crate::document::read_document_source;
use crate::headings::generate_id;
use crate::links::is_markdown_file;
use crate::project::ParserOptions;
use crate::tokenizer::BlockTokenizer;
use crate::tokens::BlockToken;
use crate::tokens::IncludeToken;
use crate::tokens::StepperToken;
use crate::tokens::TabsToken;
use crate::tokens::TagParams;
use crate::tokens::TemplateTagToken;

static HTML_HEADING: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)<h([1-6])>(.*?)</h[1-6]>").expect("valid regex"));

static HTML_LINK_HREF: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"<a href="([^"]*)""#).expect("valid regex"));

static URL_SCHEME: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("valid regex"));

/// Renders a generic template tag from its parameters and its rendered body.
pub type TagRenderFn = Box<dyn Fn(&TagParams, &str) -> String + Send + Sync>;

/// Renderers of generic template tags, keyed by tag name.
pub struct TagRegistry {
	renderers: HashMap<String, TagRenderFn>,
}

impl fmt::Debug for TagRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<&String> = self.renderers.keys().collect();
		names.sort();
		f.debug_struct("TagRegistry").field("tags", &names).finish()
	}
}

impl Default for TagRegistry {
	fn default() -> Self {
		let mut registry = Self::empty();
		registry.register("hint", render_hint);
		registry
	}
}

impl TagRegistry {
	/// A registry without any renderers.
	pub fn empty() -> Self {
		Self {
			renderers: HashMap::new(),
		}
	}

	/// Register `render` for tags named `name`, replacing any earlier one.
	pub fn register(
		&mut self,
		name: impl Into<String>,
		render: impl Fn(&TagParams, &str) -> String + Send + Sync + 'static,
	) {
		self.renderers.insert(name.into(), Box::new(render));
	}

	pub fn get(&self, name: &str) -> Option<&TagRenderFn> {
		self.renderers.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.renderers.contains_key(name)
	}
}

fn render_hint(params: &TagParams, inner_html: &str) -> String {
	let style = params.get("style").map_or("info", String::as_str);
	format!(
		"<div class=\"gb-hint gb-{}\">{inner_html}</div>",
		escape_html(style)
	)
}

/// Renders markdown with template tags to HTML.
///
/// Plain markdown is rendered as GitHub flavored markdown with raw HTML
/// allowed. Headings get an `id` and an anchor link. Tags without a renderer
/// are emitted as written.
#[derive(Debug)]
pub struct MarkdownRenderer {
	registry: TagRegistry,
	tokenizer: BlockTokenizer,
	max_depth: usize,
	max_file_size: u64,
}

impl Default for MarkdownRenderer {
	fn default() -> Self {
		Self::new(&ParserOptions::default())
	}
}

struct RenderContext<'a> {
	base_dir: Option<&'a Path>,
	include_depth: usize,
}

impl MarkdownRenderer {
	pub fn new(options: &ParserOptions) -> Self {
		Self {
			registry: TagRegistry::default(),
			tokenizer: BlockTokenizer::new(options.max_depth),
			max_depth: options.max_depth,
			max_file_size: options.max_file_size,
		}
	}

	pub fn registry(&self) -> &TagRegistry {
		&self.registry
	}

	/// Register a renderer for generic tags named `name`.
	pub fn register(
		&mut self,
		name: impl Into<String>,
		render: impl Fn(&TagParams, &str) -> String + Send + Sync + 'static,
	) {
		self.registry.register(name, render);
	}

	/// Render `content` to HTML. `{% include %}` paths are resolved against
	/// `base_dir`, or the working directory when it is `None`.
	pub fn render(&self, content: &str, base_dir: Option<&Path>) -> BookforgeResult<String> {
		self.render_source(
			content,
			&RenderContext {
				base_dir,
				include_depth: 0,
			},
		)
	}

	/// Render the content of a tree node, resolving includes next to its file.
	pub fn render_node(&self, node: &DocumentNode) -> BookforgeResult<String> {
		let base_dir = node.path.as_deref().and_then(Path::parent);
		self.render(node.content.as_deref().unwrap_or_default(), base_dir)
	}

	fn render_source(&self, content: &str, context: &RenderContext<'_>) -> BookforgeResult<String> {
		let tokens = self.tokenizer.tokenize(content);
		self.render_tokens(&tokens, context)
	}

	fn render_tokens(
		&self,
		tokens: &[BlockToken],
		context: &RenderContext<'_>,
	) -> BookforgeResult<String> {
		let mut parts = Vec::with_capacity(tokens.len());
		for token in tokens {
			let html = match token {
				BlockToken::Markdown(text) => markdown_to_html(text)?,
				BlockToken::Tag(tag) => self.render_tag(tag, context)?,
				BlockToken::Stepper(stepper) => self.render_stepper(stepper, context)?,
				BlockToken::Tabs(tabs) => self.render_tabs(tabs, context)?,
				BlockToken::Include(include) => self.render_include(include, context)?,
			};
			parts.push(html);
		}

		Ok(parts.join("\n"))
	}

	fn render_tag(
		&self,
		tag: &TemplateTagToken,
		context: &RenderContext<'_>,
	) -> BookforgeResult<String> {
		let Some(render) = self.registry.get(&tag.name) else {
			return Ok(tag.raw.clone());
		};

		let inner_html = self.render_tokens(&tag.tokens, context)?;
		Ok(render(&tag.params, &inner_html))
	}

	fn render_stepper(
		&self,
		stepper: &StepperToken,
		context: &RenderContext<'_>,
	) -> BookforgeResult<String> {
		if stepper.steps.is_empty() {
			return Ok(stepper.raw.clone());
		}

		let mut steps = Vec::with_capacity(stepper.steps.len());
		for (index, step) in stepper.steps.iter().enumerate() {
			let content = self.render_tokens(&step.tokens, context)?;
			steps.push(format!(
				"<div class=\"step\"><div class=\"step-marker\"><span \
				 class=\"step-number\">{}</span><span class=\"step-line\"></span></div><div \
				 class=\"step-content\">{content}</div></div>",
				index + 1
			));
		}

		Ok(format!(
			"<div class=\"gb-stepper\">\n{}\n</div>",
			steps.join("\n")
		))
	}

	fn render_tabs(&self, tabs: &TabsToken, context: &RenderContext<'_>) -> BookforgeResult<String> {
		if tabs.tabs.is_empty() {
			return Ok(tabs.raw.clone());
		}

		let mut headers = Vec::with_capacity(tabs.tabs.len());
		let mut panels = Vec::with_capacity(tabs.tabs.len());
		for (index, tab) in tabs.tabs.iter().enumerate() {
			let active = if index == 0 { " active" } else { "" };
			let content = self.render_tokens(&tab.tokens, context)?;
			headers.push(format!(
				"<div class=\"tab{active}\">{}</div>",
				escape_html(&tab.title)
			));
			panels.push(format!("<div class=\"tab-panel{active}\">{content}</div>"));
		}

		Ok(format!(
			"<div class=\"gb-tabs\">\n<div class=\"tabs-header\">\n{}\n</div>\n<div \
			 class=\"tabs-body\">\n{}\n</div>\n</div>",
			headers.join("\n"),
			panels.join("\n")
		))
	}

	/// Render an included file in place. A file that cannot be read, or an
	/// include nested deeper than the maximum depth, leaves an HTML comment.
	fn render_include(
		&self,
		include: &IncludeToken,
		context: &RenderContext<'_>,
	) -> BookforgeResult<String> {
		let path = context
			.base_dir
			.map_or_else(|| PathBuf::from(&include.path), |dir| dir.join(&include.path));

		if context.include_depth >= self.max_depth {
			tracing::warn!(
				path = %path.display(),
				max_depth = self.max_depth,
				"include nested too deeply"
			);
			return Ok(include_failed(&include.path));
		}

		let content = match read_document_source(&path, self.max_file_size) {
			Ok(content) => content,
			Err(error) => {
				tracing::warn!(path = %path.display(), %error, "failed to include file");
				return Ok(include_failed(&include.path));
			}
		};

		self.render_source(
			&content,
			&RenderContext {
				base_dir: path.parent(),
				include_depth: context.include_depth + 1,
			},
		)
	}
}

fn include_failed(path: &str) -> String {
	format!("<!-- include failed: {} -->", path.replace("--", "- -"))
}

/// Render plain markdown to HTML, anchor its headings and point links to
/// markdown files at their generated pages.
pub fn markdown_to_html(markdown: &str) -> BookforgeResult<String> {
	let options = Options {
		parse: ParseOptions::gfm(),
		compile: CompileOptions {
			allow_dangerous_html: true,
			..CompileOptions::gfm()
		},
	};

	let html = markdown::to_html_with_options(markdown, &options)
		.map_err(|message| BookforgeError::Markdown(message.to_string()))?;

	Ok(rewrite_page_links(&anchor_headings(&html)))
}

/// Give every `<hN>` element an `id` and a leading anchor link.
fn anchor_headings(html: &str) -> String {
	HTML_HEADING
		.replace_all(html, |captures: &Captures<'_>| {
			let level = &captures[1];
			let text = &captures[2];
			let id = generate_id(&unescape_html(text));
			format!("<h{level} id=\"{id}\"><a href=\"#{id}\" class=\"anchor\"></a>{text}</h{level}>")
		})
		.into_owned()
}

/// Rewrite relative links to markdown files, `dir/name.md#part` becoming
/// `dir/name.html#part`. Links with a URL scheme are left alone.
fn rewrite_page_links(html: &str) -> String {
	HTML_LINK_HREF
		.replace_all(html, |captures: &Captures<'_>| {
			let href = &captures[1];
			format!("<a href=\"{}\"", page_href(href).unwrap_or_else(|| href.to_string()))
		})
		.into_owned()
}

fn page_href(href: &str) -> Option<String> {
	if URL_SCHEME.is_match(href) {
		return None;
	}

	let (path, fragment) = href
		.split_once('#')
		.map_or((href, None), |(path, fragment)| (path, Some(fragment)));
	if !is_markdown_file(Path::new(path)) {
		return None;
	}

	let (stem, _) = path.rsplit_once('.')?;
	Some(match fragment {
		Some(fragment) => format!("{stem}.html#{fragment}"),
		None => format!("{stem}.html"),
	})
}

/// Reverse [`escape_html`] so ids are built from the text as written.
fn unescape_html(text: &str) -> String {
	text.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&quot;", "\"")
		.replace("&#39;", "'")
		.replace("&#x27;", "'")
		.replace("&amp;", "&")
}

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			_ => escaped.push(c),
		}
	}

	escaped
}
