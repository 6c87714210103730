use std::collections::BTreeMap;

use derive_more::Deref;
use derive_more::DerefMut;

/// `key="value"` parameters of a template tag. A repeated key keeps its last
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deref, DerefMut)]
pub struct TagParams(BTreeMap<String, String>);

impl TagParams {
	pub fn new() -> Self {
		Self::default()
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagParams {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

/// A block level piece of a markdown document with template tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockToken {
	/// Plain markdown between template tags.
	Markdown(String),
	/// A generic `{% name %}...{% endname %}` block.
	Tag(TemplateTagToken),
	Stepper(StepperToken),
	Tabs(TabsToken),
	Include(IncludeToken),
}

impl BlockToken {
	/// The source text this token was produced from.
	pub fn raw(&self) -> &str {
		match self {
			Self::Markdown(text) => text,
			Self::Tag(token) => &token.raw,
			Self::Stepper(token) => &token.raw,
			Self::Tabs(token) => &token.raw,
			Self::Include(token) => &token.raw,
		}
	}
}

/// A generic template tag with its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTagToken {
	pub name: String,
	pub params: TagParams,
	/// The whole tag, opening to closing, as written.
	pub raw: String,
	/// The body between the opening and closing tag.
	pub inner: String,
	/// The body tokenized again.
	pub tokens: Vec<BlockToken>,
}

impl TemplateTagToken {
	/// The body with surrounding whitespace removed.
	pub fn text(&self) -> &str {
		self.inner.trim()
	}
}

/// `{% stepper %}` with its `{% step %}` children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepperToken {
	pub raw: String,
	pub steps: Vec<StepItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepItem {
	pub content: String,
	pub tokens: Vec<BlockToken>,
}

/// `{% tabs %}` with its `{% tab title="..." %}` children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabsToken {
	pub raw: String,
	pub tabs: Vec<TabItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabItem {
	pub title: String,
	pub content: String,
	pub tokens: Vec<BlockToken>,
}

/// `{% include "path" %}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeToken {
	pub raw: String,
	/// The included path as written, relative to the including document.
	pub path: String,
}
