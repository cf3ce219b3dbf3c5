use std::collections::{HashMap, HashSet};

use time::OffsetDateTime;

use crate::{Error, GleanService, Result};
use glean_domain::{
	annotation::Annotation,
	bounds,
	cluster::DayClusters,
	params::SearchParams,
	terms,
};

impl GleanService {
	/// Lists one page's annotations in key order, filtered, then sliced to `[skip, skip + limit)`.
	///
	/// Candidates are read `limit * inner_limit_multiplier` keys at a time with an advancing
	/// offset, until a short read shows the page is exhausted or enough keys survived filtering.
	pub async fn list_annots_by_page(&self, params: SearchParams) -> Result<Vec<Annotation>> {
		let params = params.normalized();
		let Some(page_url) = params.page_url.clone() else {
			return Err(Error::InvalidRequest { message: "page_url is required.".to_string() });
		};

		validate_window(&params)?;

		let limit = self.effective_limit(&params);

		if limit == 0 {
			return Ok(Vec::new());
		}

		let inner_limit =
			limit.saturating_mul(self.cfg.annotations.inner_limit_multiplier as usize).max(1);
		let wanted = params.skip.saturating_add(limit);
		let mut offset = 0;
		let mut keys = Vec::new();

		loop {
			let raw = self
				.collaborators
				.annotations
				.page_annotation_keys(
					&page_url,
					params.start_date,
					params.end_date,
					offset,
					inner_limit,
				)
				.await?;
			let exhausted = raw.len() < inner_limit;

			offset += raw.len();

			keys.extend(self.filter_keys(raw, &params).await?);

			if exhausted || keys.len() >= wanted {
				break;
			}
		}

		let page: Vec<String> = keys.into_iter().skip(params.skip).take(limit).collect();

		self.resolve_annotations(&page).await
	}

	/// Lists annotations clustered by day, then page, walking back from `end_date` in windows
	/// of `limit` days until `limit` day buckets are filled or the lower limit is reached.
	pub async fn list_annots_by_day(&self, params: SearchParams) -> Result<DayClusters> {
		let params = params.normalized();

		validate_window(&params)?;

		let limit = self.effective_limit(&params);
		let mut result = DayClusters::new();

		if limit == 0 {
			return Ok(result);
		}

		let list_bounds = self.list_bounds();
		let hard_lower = list_bounds.hard_lower_limit(params.start_date);
		let end = params.end_date.unwrap_or_else(|| list_bounds.end_of_day(OffsetDateTime::now_utc()));
		let mut cursor = end;
		let mut first_window = true;

		while result.len() < limit && cursor > hard_lower {
			let upper = cursor;

			cursor = bounds::step_back(cursor, hard_lower, limit, list_bounds.day_offset);

			// Later windows exclude their upper edge, which the previous window already covered.
			let mut annotations = self
				.collaborators
				.annotations
				.annotations_edited_between(cursor, upper, first_window)
				.await?;

			first_window = false;

			if params.has_term_filter() {
				annotations.retain(|annotation| {
					terms::terms_match(
						annotation,
						&params.terms_inc,
						params.include_highlights,
						params.include_notes,
					)
				});
			}

			let keys = annotations.iter().map(|annotation| annotation.url.clone()).collect();
			let kept: HashSet<String> = self.filter_keys(keys, &params).await?.into_iter().collect();

			annotations.retain(|annotation| kept.contains(&annotation.url));

			tracing::debug!(
				lower = %cursor,
				upper = %upper,
				matched = annotations.len(),
				"Scanned annotation window."
			);

			result.merge(DayClusters::cluster_above(annotations, list_bounds.day_offset, hard_lower));
		}

		result.truncate(limit);

		Ok(result)
	}

	fn effective_limit(&self, params: &SearchParams) -> usize {
		params.limit.unwrap_or(self.cfg.annotations.default_limit as usize)
	}

	/// Loads annotations for `keys`, in the order of `keys`. Keys that no longer exist are skipped.
	async fn resolve_annotations(&self, keys: &[String]) -> Result<Vec<Annotation>> {
		if keys.is_empty() {
			return Ok(Vec::new());
		}

		let mut by_key: HashMap<String, Annotation> = self
			.collaborators
			.annotations
			.annotations_by_keys(keys)
			.await?
			.into_iter()
			.map(|annotation| (annotation.url.clone(), annotation))
			.collect();

		Ok(keys.iter().filter_map(|key| by_key.remove(key)).collect())
	}
}

fn validate_window(params: &SearchParams) -> Result<()> {
	if let (Some(start), Some(end)) = (params.start_date, params.end_date)
		&& start > end
	{
		return Err(Error::InvalidRequest {
			message: "start_date must not be later than end_date.".to_string(),
		});
	}

	Ok(())
}
