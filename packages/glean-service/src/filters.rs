//! Store-backed filter predicates. Each stage narrows a key list and keeps its order.

use glean_domain::{filter, params::SearchParams};

use crate::{GleanService, Result};

impl GleanService {
	pub async fn filter_by_bookmarks(&self, keys: Vec<String>) -> Result<Vec<String>> {
		if keys.is_empty() {
			return Ok(keys);
		}

		let bookmarked = self.collaborators.annotations.bookmarked_keys(&keys).await?;

		Ok(filter::retain_bookmarked(keys, &bookmarked))
	}

	pub async fn filter_by_tags(
		&self,
		keys: Vec<String>,
		tags_inc: &[String],
		tags_exc: &[String],
	) -> Result<Vec<String>> {
		if keys.is_empty() || (tags_inc.is_empty() && tags_exc.is_empty()) {
			return Ok(keys);
		}

		let entries = self.collaborators.annotations.tag_entries(&keys).await?;

		Ok(filter::retain_tagged(keys, &entries, tags_inc, tags_exc))
	}

	/// Keeps keys that belong to at least one of the named lists. Unknown names match nothing.
	pub async fn filter_by_collections(
		&self,
		keys: Vec<String>,
		collections: &[String],
	) -> Result<Vec<String>> {
		if keys.is_empty() {
			return Ok(keys);
		}

		let list_ids = self.collaborators.annotations.list_ids_by_name(collections).await?;

		if list_ids.is_empty() {
			return Ok(Vec::new());
		}

		let entries = self.collaborators.annotations.list_entries(&keys).await?;

		Ok(filter::retain_in_lists(keys, &list_ids, &entries))
	}

	/// Bookmarks, then tags, then collections, each only when its parameter is set.
	pub async fn filter_keys(&self, keys: Vec<String>, params: &SearchParams) -> Result<Vec<String>> {
		let mut keys = keys;

		if params.bookmarks_only {
			keys = self.filter_by_bookmarks(keys).await?;
		}
		if params.has_tag_filter() {
			keys = self.filter_by_tags(keys, &params.tags_inc, &params.tags_exc).await?;
		}
		if params.has_collection_filter() {
			keys = self.filter_by_collections(keys, &params.collections).await?;
		}

		Ok(keys)
	}
}
