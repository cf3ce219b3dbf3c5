//! Postgres-backed collaborators.

use std::{collections::HashSet, sync::Arc};

use time::OffsetDateTime;

use crate::{AnnotationStore, BoxFuture, PageBacklog, PageStore, Result};
use glean_domain::{
	annotation::{Annotation, ListEntry, TagEntry},
	page::PageRecord,
};
use glean_storage::{
	annotations, backlog,
	db::Db,
	models::{AnnotationRow, PageRow},
	pages,
};

pub struct PgStore {
	db: Arc<Db>,
}
impl PgStore {
	pub fn new(db: Arc<Db>) -> Self {
		Self { db }
	}
}

impl AnnotationStore for PgStore {
	fn page_annotation_keys<'a>(
		&'a self,
		page_url: &'a str,
		start: Option<OffsetDateTime>,
		end: Option<OffsetDateTime>,
		offset: usize,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move {
			let keys = annotations::page_annotation_keys(
				&self.db.pool,
				page_url,
				start,
				end,
				to_i64(offset),
				to_i64(limit),
			)
			.await?;

			Ok(keys)
		})
	}

	fn annotations_edited_between<'a>(
		&'a self,
		lower: OffsetDateTime,
		upper: OffsetDateTime,
		upper_inclusive: bool,
	) -> BoxFuture<'a, Result<Vec<Annotation>>> {
		Box::pin(async move {
			let rows =
				annotations::annotations_edited_between(&self.db.pool, lower, upper, upper_inclusive)
					.await?;

			Ok(rows.into_iter().map(annotation_from_row).collect())
		})
	}

	fn annotations_by_keys<'a>(
		&'a self,
		keys: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Annotation>>> {
		Box::pin(async move {
			let rows = annotations::annotations_by_keys(&self.db.pool, keys).await?;

			Ok(rows.into_iter().map(annotation_from_row).collect())
		})
	}

	fn bookmarked_keys<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<HashSet<String>>> {
		Box::pin(async move {
			let marked = annotations::bookmarked_keys(&self.db.pool, keys).await?;

			Ok(marked.into_iter().collect())
		})
	}

	fn tag_entries<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<Vec<TagEntry>>> {
		Box::pin(async move {
			let rows = annotations::tag_entries(&self.db.pool, keys).await?;

			Ok(rows.into_iter().map(|row| TagEntry { name: row.name, url: row.url }).collect())
		})
	}

	fn list_ids_by_name<'a>(&'a self, names: &'a [String]) -> BoxFuture<'a, Result<Vec<i64>>> {
		Box::pin(async move { Ok(annotations::list_ids_by_name(&self.db.pool, names).await?) })
	}

	fn list_entries<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<Vec<ListEntry>>> {
		Box::pin(async move {
			let rows = annotations::list_entries(&self.db.pool, keys).await?;

			Ok(rows.into_iter().map(|row| ListEntry { list_id: row.list_id, url: row.url }).collect())
		})
	}
}

impl PageStore for PgStore {
	fn upsert_page<'a>(&'a self, record: &'a PageRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let row = page_row(record, OffsetDateTime::now_utc());

			pages::upsert_page(&self.db.pool, &row).await?;

			Ok(())
		})
	}

	fn add_fav_icon_if_needed<'a>(
		&'a self,
		hostname: &'a str,
		fav_icon: &'a str,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let stored = pages::add_fav_icon_if_needed(
				&self.db.pool,
				hostname,
				fav_icon,
				OffsetDateTime::now_utc(),
			)
			.await?;

			Ok(stored)
		})
	}
}

impl PageBacklog for PgStore {
	fn enqueue<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			backlog::enqueue(&self.db.pool, url, OffsetDateTime::now_utc()).await?;

			Ok(())
		})
	}
}

pub fn annotation_from_row(row: AnnotationRow) -> Annotation {
	Annotation {
		url: row.url,
		page_url: row.page_url,
		body: row.body,
		comment: row.comment,
		body_terms: row.body_terms.map(|terms| terms.into_iter().collect()),
		comment_terms: row.comment_terms.map(|terms| terms.into_iter().collect()),
		created_at: row.created_at,
		last_edited: row.last_edited,
	}
}

fn page_row(record: &PageRecord, now: OffsetDateTime) -> PageRow {
	PageRow {
		url: record.url.clone(),
		full_url: record.full_url.clone(),
		full_title: record.full_title.clone(),
		domain: record.domain.clone(),
		hostname: record.hostname.clone(),
		description: record.description.clone(),
		text: record.text.clone(),
		url_terms: record.url_terms.iter().cloned().collect(),
		title_terms: record.title_terms.iter().cloned().collect(),
		terms: record.terms.iter().cloned().collect(),
		updated_at: now,
	}
}

fn to_i64(value: usize) -> i64 {
	i64::try_from(value).unwrap_or(i64::MAX)
}
