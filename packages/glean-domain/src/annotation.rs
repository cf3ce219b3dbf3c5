use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::terms;

/// A highlight and/or comment attached to a page.
///
/// `url` is the annotation's own address and doubles as its key in every
/// annotation-side collection (bookmarks, tags, list entries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
	pub url: String,
	pub page_url: String,
	#[serde(default)]
	pub body: Option<String>,
	#[serde(default)]
	pub comment: Option<String>,
	#[serde(default)]
	pub body_terms: Option<BTreeSet<String>>,
	#[serde(default)]
	pub comment_terms: Option<BTreeSet<String>>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub last_edited: OffsetDateTime,
}
impl Annotation {
	/// Builds an annotation whose term sets are derived from its body and comment.
	pub fn new(
		url: impl Into<String>,
		page_url: impl Into<String>,
		body: Option<String>,
		comment: Option<String>,
		created_at: OffsetDateTime,
	) -> Self {
		let body_terms = body.as_deref().map(terms::extract_terms);
		let comment_terms = comment.as_deref().map(terms::extract_terms);

		Self {
			url: url.into(),
			page_url: page_url.into(),
			body,
			comment,
			body_terms,
			comment_terms,
			created_at,
			last_edited: created_at,
		}
	}

	pub fn edited_at(mut self, last_edited: OffsetDateTime) -> Self {
		self.last_edited = last_edited;

		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagEntry {
	pub name: String,
	pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListEntry {
	pub list_id: i64,
	pub url: String,
}
