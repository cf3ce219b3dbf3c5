//! Annotation-side collections: annotations, bookmarks, tags, custom lists and list entries.

use sqlx::PgExecutor;
use time::OffsetDateTime;

use crate::{
	Error, Result,
	models::{AnnotationRow, ListEntryRow, TagRow},
};

const ANNOTATION_COLUMNS: &str = "\
url,
\tpage_url,
\tbody,
\tcomment,
\tbody_terms,
\tcomment_terms,
\tcreated_at,
\tlast_edited";

pub async fn insert_annotation<'e, E>(executor: E, row: &AnnotationRow) -> Result<()>
where
	E: PgExecutor<'e>,
{
	if row.last_edited < row.created_at {
		return Err(Error::InvalidArgument(format!(
			"Annotation {} was edited before it was created.",
			row.url
		)));
	}

	sqlx::query(
		"\
INSERT INTO annotations (
\turl,
\tpage_url,
\tbody,
\tcomment,
\tbody_terms,
\tcomment_terms,
\tcreated_at,
\tlast_edited
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
ON CONFLICT (url) DO UPDATE
SET page_url = EXCLUDED.page_url,
\tbody = EXCLUDED.body,
\tcomment = EXCLUDED.comment,
\tbody_terms = EXCLUDED.body_terms,
\tcomment_terms = EXCLUDED.comment_terms,
\tlast_edited = EXCLUDED.last_edited",
	)
	.bind(row.url.as_str())
	.bind(row.page_url.as_str())
	.bind(row.body.as_deref())
	.bind(row.comment.as_deref())
	.bind(row.body_terms.as_deref())
	.bind(row.comment_terms.as_deref())
	.bind(row.created_at)
	.bind(row.last_edited)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn insert_bookmark<'e, E>(executor: E, url: &str, now: OffsetDateTime) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"INSERT INTO annotation_bookmarks (url, created_at) VALUES ($1,$2) ON CONFLICT (url) DO NOTHING",
	)
	.bind(url)
	.bind(now)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn insert_tag<'e, E>(executor: E, name: &str, url: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO annotation_tags (name, url) VALUES ($1,$2) ON CONFLICT DO NOTHING")
		.bind(name)
		.bind(url)
		.execute(executor)
		.await?;

	Ok(())
}

/// Returns the id of the list called `name`, creating it if needed.
pub async fn ensure_list<'e, E>(executor: E, name: &str) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let id: i64 = sqlx::query_scalar(
		"\
INSERT INTO custom_lists (name)
VALUES ($1)
ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
RETURNING id",
	)
	.bind(name)
	.fetch_one(executor)
	.await?;

	Ok(id)
}

pub async fn insert_list_entry<'e, E>(executor: E, list_id: i64, url: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"INSERT INTO annotation_list_entries (list_id, url) VALUES ($1,$2) ON CONFLICT DO NOTHING",
	)
	.bind(list_id)
	.bind(url)
	.execute(executor)
	.await?;

	Ok(())
}

/// Keys of a page's annotations in key order, optionally bounded by creation time.
pub async fn page_annotation_keys<'e, E>(
	executor: E,
	page_url: &str,
	start: Option<OffsetDateTime>,
	end: Option<OffsetDateTime>,
	offset: i64,
	limit: i64,
) -> Result<Vec<String>>
where
	E: PgExecutor<'e>,
{
	if offset < 0 || limit < 0 {
		return Err(Error::InvalidArgument("Offset and limit must be non-negative.".to_string()));
	}

	let keys = sqlx::query_scalar(
		"\
SELECT url
FROM annotations
WHERE page_url = $1
\tAND ($2::timestamptz IS NULL OR created_at >= $2)
\tAND ($3::timestamptz IS NULL OR created_at <= $3)
ORDER BY url ASC
OFFSET $4
LIMIT $5",
	)
	.bind(page_url)
	.bind(start)
	.bind(end)
	.bind(offset)
	.bind(limit)
	.fetch_all(executor)
	.await?;

	Ok(keys)
}

/// Annotations with `last_edited` in `[lower, upper]`, or `[lower, upper)` when
/// `upper_inclusive` is false.
pub async fn annotations_edited_between<'e, E>(
	executor: E,
	lower: OffsetDateTime,
	upper: OffsetDateTime,
	upper_inclusive: bool,
) -> Result<Vec<AnnotationRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT
\t{ANNOTATION_COLUMNS}
FROM annotations
WHERE last_edited >= $1
\tAND (last_edited < $2 OR ($3 AND last_edited = $2))
ORDER BY last_edited DESC, url ASC"
	);
	let rows = sqlx::query_as::<_, AnnotationRow>(&sql)
		.bind(lower)
		.bind(upper)
		.bind(upper_inclusive)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

pub async fn annotations_by_keys<'e, E>(executor: E, keys: &[String]) -> Result<Vec<AnnotationRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT
\t{ANNOTATION_COLUMNS}
FROM annotations
WHERE url = ANY($1)"
	);
	let rows = sqlx::query_as::<_, AnnotationRow>(&sql).bind(keys).fetch_all(executor).await?;

	Ok(rows)
}

pub async fn bookmarked_keys<'e, E>(executor: E, keys: &[String]) -> Result<Vec<String>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_scalar("SELECT url FROM annotation_bookmarks WHERE url = ANY($1)")
		.bind(keys)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

pub async fn tag_entries<'e, E>(executor: E, keys: &[String]) -> Result<Vec<TagRow>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, TagRow>(
		"SELECT name, url FROM annotation_tags WHERE url = ANY($1) ORDER BY url, name",
	)
	.bind(keys)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn list_ids_by_name<'e, E>(executor: E, names: &[String]) -> Result<Vec<i64>>
where
	E: PgExecutor<'e>,
{
	let ids = sqlx::query_scalar("SELECT id FROM custom_lists WHERE name = ANY($1) ORDER BY id")
		.bind(names)
		.fetch_all(executor)
		.await?;

	Ok(ids)
}

pub async fn list_entries<'e, E>(executor: E, keys: &[String]) -> Result<Vec<ListEntryRow>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, ListEntryRow>(
		"SELECT list_id, url FROM annotation_list_entries WHERE url = ANY($1) ORDER BY url, list_id",
	)
	.bind(keys)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}
