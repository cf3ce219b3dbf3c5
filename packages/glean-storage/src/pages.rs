use sqlx::PgExecutor;
use time::OffsetDateTime;

use crate::{Result, models::PageRow};

pub async fn upsert_page<'e, E>(executor: E, row: &PageRow) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO pages (
\turl,
\tfull_url,
\tfull_title,
\tdomain,
\thostname,
\tdescription,
\ttext,
\turl_terms,
\ttitle_terms,
\tterms,
\tupdated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
ON CONFLICT (url) DO UPDATE
SET full_url = EXCLUDED.full_url,
\tfull_title = EXCLUDED.full_title,
\tdomain = EXCLUDED.domain,
\thostname = EXCLUDED.hostname,
\tdescription = EXCLUDED.description,
\ttext = EXCLUDED.text,
\turl_terms = EXCLUDED.url_terms,
\ttitle_terms = EXCLUDED.title_terms,
\tterms = EXCLUDED.terms,
\tupdated_at = EXCLUDED.updated_at",
	)
	.bind(row.url.as_str())
	.bind(row.full_url.as_str())
	.bind(row.full_title.as_str())
	.bind(row.domain.as_str())
	.bind(row.hostname.as_str())
	.bind(row.description.as_deref())
	.bind(row.text.as_deref())
	.bind(row.url_terms.as_slice())
	.bind(row.title_terms.as_slice())
	.bind(row.terms.as_slice())
	.bind(row.updated_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn fetch_page<'e, E>(executor: E, url: &str) -> Result<Option<PageRow>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, PageRow>(
		"\
SELECT
\turl,
\tfull_url,
\tfull_title,
\tdomain,
\thostname,
\tdescription,
\ttext,
\turl_terms,
\ttitle_terms,
\tterms,
\tupdated_at
FROM pages
WHERE url = $1",
	)
	.bind(url)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

/// Stores a favicon for `hostname` unless one already exists. Returns whether a row was written.
pub async fn add_fav_icon_if_needed<'e, E>(
	executor: E,
	hostname: &str,
	fav_icon: &str,
	now: OffsetDateTime,
) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
INSERT INTO fav_icons (hostname, fav_icon, created_at)
VALUES ($1,$2,$3)
ON CONFLICT (hostname) DO NOTHING",
	)
	.bind(hostname)
	.bind(fav_icon)
	.bind(now)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn fetch_fav_icon<'e, E>(executor: E, hostname: &str) -> Result<Option<String>>
where
	E: PgExecutor<'e>,
{
	let fav_icon = sqlx::query_scalar("SELECT fav_icon FROM fav_icons WHERE hostname = $1")
		.bind(hostname)
		.fetch_optional(executor)
		.await?;

	Ok(fav_icon)
}
