//! The page-fetch backlog: URLs whose enrichment failed and must be retried later.
//!
//! Enqueueing is a plain insert, so duplicate URLs are allowed; a successful retry
//! removes every entry for its URL at once.

use sqlx::PgExecutor;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, Result, db::Db, models::BacklogEntry};

pub async fn enqueue<'e, E>(executor: E, url: &str, now: OffsetDateTime) -> Result<Uuid>
where
	E: PgExecutor<'e>,
{
	let entry_id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO page_fetch_backlog (entry_id, url, times_retried, available_at, created_at)
VALUES ($1,$2,0,$3,$3)",
	)
	.bind(entry_id)
	.bind(url)
	.bind(now)
	.execute(executor)
	.await?;

	Ok(entry_id)
}

/// Claims the oldest due entry and hides it from other claimers for `lease_seconds`.
pub async fn claim_next_due(
	db: &Db,
	now: OffsetDateTime,
	lease_seconds: i64,
) -> Result<Option<BacklogEntry>> {
	let mut tx = db.pool.begin().await?;
	let row = sqlx::query_as::<_, BacklogEntry>(
		"\
SELECT
\tentry_id,
\turl,
\ttimes_retried,
\tlast_retry,
\tavailable_at,
\tcreated_at
FROM page_fetch_backlog
WHERE available_at <= $1
ORDER BY available_at ASC, created_at ASC
LIMIT 1
FOR UPDATE SKIP LOCKED",
	)
	.bind(now)
	.fetch_optional(&mut *tx)
	.await?;
	let entry = if let Some(mut entry) = row {
		let lease_until = now + Duration::seconds(lease_seconds);

		sqlx::query("UPDATE page_fetch_backlog SET available_at = $1 WHERE entry_id = $2")
			.bind(lease_until)
			.bind(entry.entry_id)
			.execute(&mut *tx)
			.await?;

		entry.available_at = lease_until;

		Some(entry)
	} else {
		None
	};

	tx.commit().await?;

	Ok(entry)
}

pub async fn mark_retry<'e, E>(
	executor: E,
	entry_id: Uuid,
	times_retried: i32,
	available_at: OffsetDateTime,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
UPDATE page_fetch_backlog
SET times_retried = $1,
\tlast_retry = $2,
\tavailable_at = $3
WHERE entry_id = $4",
	)
	.bind(times_retried)
	.bind(now)
	.bind(available_at)
	.bind(entry_id)
	.execute(executor)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("Backlog entry {entry_id} no longer exists.")));
	}

	Ok(())
}

pub async fn delete_entry<'e, E>(executor: E, entry_id: Uuid) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("DELETE FROM page_fetch_backlog WHERE entry_id = $1")
		.bind(entry_id)
		.execute(executor)
		.await?;

	Ok(())
}

pub async fn delete_entries_for_url<'e, E>(executor: E, url: &str) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM page_fetch_backlog WHERE url = $1")
		.bind(url)
		.execute(executor)
		.await?;

	Ok(result.rows_affected())
}

pub async fn count_for_url<'e, E>(executor: E, url: &str) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let count = sqlx::query_scalar("SELECT COUNT(*) FROM page_fetch_backlog WHERE url = $1")
		.bind(url)
		.fetch_one(executor)
		.await?;

	Ok(count)
}
