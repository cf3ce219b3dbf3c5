use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::page::PageRecord;

pub const PAGES_COLLECTION: &str = "pages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
	Create,
	Modify,
	Delete,
}

/// One change record from the remote sync feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEntry {
	pub collection: String,
	pub operation: SyncOperation,
	pub pk: String,
	#[serde(default)]
	pub value: Map<String, Value>,
}
impl SyncEntry {
	pub fn full_url(&self) -> Option<&str> {
		self.non_blank_str("fullUrl")
	}

	pub fn full_title(&self) -> Option<&str> {
		self.non_blank_str("fullTitle")
	}

	/// True for page creations that carry a URL but no title.
	pub fn needs_page_data(&self) -> bool {
		self.collection == PAGES_COLLECTION
			&& self.operation == SyncOperation::Create
			&& self.full_url().is_some()
			&& self.full_title().is_none()
	}

	/// Overwrites the page fields and term sets in `value`, leaving unrelated keys alone.
	pub fn merge_page_record(&mut self, record: &PageRecord) {
		let fields = [
			("url", Some(record.url.as_str())),
			("fullUrl", Some(record.full_url.as_str())),
			("fullTitle", Some(record.full_title.as_str())),
			("domain", Some(record.domain.as_str())),
			("hostname", Some(record.hostname.as_str())),
			("description", record.description.as_deref()),
			("text", record.text.as_deref()),
		];

		for (key, value) in fields {
			match value {
				Some(value) => {
					self.value.insert(key.to_string(), Value::String(value.to_string()));
				},
				None => {
					self.value.remove(key);
				},
			}
		}

		let term_sets = [
			("urlTerms", &record.url_terms),
			("titleTerms", &record.title_terms),
			("terms", &record.terms),
		];

		for (key, terms) in term_sets {
			let terms = terms.iter().cloned().map(Value::String).collect();

			self.value.insert(key.to_string(), Value::Array(terms));
		}
	}

	fn non_blank_str(&self, key: &str) -> Option<&str> {
		self.value
			.get(key)
			.and_then(Value::as_str)
			.map(str::trim)
			.filter(|value| !value.is_empty())
	}
}
