use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::terms;

/// Per-call retrieval parameters for both listing modes.
///
/// `limit` counts annotations for page listings and day buckets for day listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
	pub page_url: Option<String>,
	#[serde(with = "crate::time_serde::option")]
	pub start_date: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde::option")]
	pub end_date: Option<OffsetDateTime>,
	pub terms_inc: Vec<String>,
	pub tags_inc: Vec<String>,
	pub tags_exc: Vec<String>,
	pub collections: Vec<String>,
	pub bookmarks_only: bool,
	pub include_highlights: bool,
	pub include_notes: bool,
	pub limit: Option<usize>,
	pub skip: usize,
}
impl SearchParams {
	pub fn for_page(page_url: impl Into<String>) -> Self {
		Self { page_url: Some(page_url.into()), ..Self::default() }
	}

	pub fn has_tag_filter(&self) -> bool {
		!self.tags_inc.is_empty() || !self.tags_exc.is_empty()
	}

	pub fn has_collection_filter(&self) -> bool {
		!self.collections.is_empty()
	}

	pub fn has_term_filter(&self) -> bool {
		!self.terms_inc.is_empty()
	}

	/// Returns a copy with terms normalized and blank tag/collection names removed.
	pub fn normalized(&self) -> Self {
		let mut out = self.clone();

		out.terms_inc = terms::normalize_terms(&self.terms_inc);
		out.tags_inc = non_blank(&self.tags_inc);
		out.tags_exc = non_blank(&self.tags_exc);
		out.collections = non_blank(&self.collections);
		out.page_url = self
			.page_url
			.as_deref()
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.map(str::to_string);

		out
	}
}
impl Default for SearchParams {
	fn default() -> Self {
		Self {
			page_url: None,
			start_date: None,
			end_date: None,
			terms_inc: Vec::new(),
			tags_inc: Vec::new(),
			tags_exc: Vec::new(),
			collections: Vec::new(),
			bookmarks_only: false,
			include_highlights: true,
			include_notes: true,
			limit: None,
			skip: 0,
		}
	}
}

fn non_blank(values: &[String]) -> Vec<String> {
	values
		.iter()
		.map(|value| value.trim())
		.filter(|value| !value.is_empty())
		.map(str::to_string)
		.collect()
}
