use std::{sync::Arc, time::Duration as StdDuration};

use color_eyre::Result;
use time::{Duration, OffsetDateTime};
use tokio::time as tokio_time;

use glean_service::GleanService;
use glean_storage::{backlog, db::Db, models::BacklogEntry};

const MAX_BACKOFF_EXPONENT: u32 = 16;

pub struct WorkerState {
	pub db: Arc<Db>,
	pub service: GleanService,
	pub backlog: glean_config::Backlog,
}

/// What happened to the entry claimed by one sweep step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
	Idle,
	Fetched { url: String, cleared: u64 },
	Rescheduled { url: String, times_retried: i32 },
	GaveUp { url: String },
	/// The page was fetched but could not be stored. The retry count is left untouched.
	Deferred { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
	GiveUp,
	Retry { times_retried: i32, available_at: OffsetDateTime },
}

pub async fn run_worker(state: WorkerState) -> Result<()> {
	let poll_interval = StdDuration::from_millis(state.backlog.poll_interval_ms);

	loop {
		match process_backlog_once(&state).await {
			// Keep draining while there is due work.
			Ok(SweepOutcome::Idle) => tokio_time::sleep(poll_interval).await,
			Ok(_) => {},
			Err(err) => {
				tracing::error!(error = %err, "Backlog sweep failed.");

				tokio_time::sleep(poll_interval).await;
			},
		}
	}
}

pub async fn process_backlog_once(state: &WorkerState) -> Result<SweepOutcome> {
	let now = OffsetDateTime::now_utc();
	let Some(entry) = backlog::claim_next_due(&state.db, now, state.backlog.lease_seconds).await?
	else {
		return Ok(SweepOutcome::Idle);
	};
	let record = match state.service.page_data.process(&entry.url).await {
		Ok(record) => record,
		Err(err) =>
			return reschedule(state, entry, &err.to_string(), OffsetDateTime::now_utc()).await,
	};

	if let Err(err) = state.service.store_page(record).await {
		return defer(state, entry, &err.to_string(), OffsetDateTime::now_utc()).await;
	}

	let cleared = backlog::delete_entries_for_url(&state.db.pool, &entry.url).await?;

	tracing::info!(url = %entry.url, cleared, "Backlog page fetched.");

	Ok(SweepOutcome::Fetched { url: entry.url, cleared })
}

async fn defer(
	state: &WorkerState,
	entry: BacklogEntry,
	error: &str,
	now: OffsetDateTime,
) -> Result<SweepOutcome> {
	let (times_retried, available_at) = store_failure_retry(entry.times_retried, &state.backlog, now);

	backlog::mark_retry(&state.db.pool, entry.entry_id, times_retried, available_at, now).await?;

	tracing::warn!(
		url = %entry.url,
		%available_at,
		error,
		"Failed to store fetched backlog page; retry scheduled."
	);

	Ok(SweepOutcome::Deferred { url: entry.url })
}

async fn reschedule(
	state: &WorkerState,
	entry: BacklogEntry,
	error: &str,
	now: OffsetDateTime,
) -> Result<SweepOutcome> {
	match retry_decision(entry.times_retried, &state.backlog, now) {
		RetryDecision::GiveUp => {
			backlog::delete_entry(&state.db.pool, entry.entry_id).await?;

			tracing::warn!(
				url = %entry.url,
				times_retried = entry.times_retried,
				error,
				"Giving up on backlog page."
			);

			Ok(SweepOutcome::GaveUp { url: entry.url })
		},
		RetryDecision::Retry { times_retried, available_at } => {
			backlog::mark_retry(&state.db.pool, entry.entry_id, times_retried, available_at, now)
				.await?;

			tracing::info!(
				url = %entry.url,
				times_retried,
				%available_at,
				error,
				"Backlog page fetch failed; retry scheduled."
			);

			Ok(SweepOutcome::Rescheduled { url: entry.url, times_retried })
		},
	}
}

/// Decides the fate of an entry that has already been retried `times_retried` times and just
/// failed again.
pub fn retry_decision(
	times_retried: i32,
	cfg: &glean_config::Backlog,
	now: OffsetDateTime,
) -> RetryDecision {
	if i64::from(times_retried) >= i64::from(cfg.retry_limit) {
		return RetryDecision::GiveUp;
	}

	let times_retried = times_retried.max(0) + 1;
	let available_at =
		now + backoff_for_attempt(times_retried, cfg.base_backoff_ms, cfg.max_backoff_ms);

	RetryDecision::Retry { times_retried, available_at }
}

/// Schedules another attempt after a storage failure. Storage failures never count toward
/// `retry_limit`, so the entry keeps its retry count and is never given up on here.
pub fn store_failure_retry(
	times_retried: i32,
	cfg: &glean_config::Backlog,
	now: OffsetDateTime,
) -> (i32, OffsetDateTime) {
	let times_retried = times_retried.max(0);
	let backoff =
		backoff_for_attempt(times_retried + 1, cfg.base_backoff_ms, cfg.max_backoff_ms);

	(times_retried, now + backoff)
}

pub fn backoff_for_attempt(attempt: i32, base_backoff_ms: i64, max_backoff_ms: i64) -> Duration {
	let attempts = attempt.max(1) as u32;
	let exp = attempts.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
	let base = base_backoff_ms.saturating_mul(1 << exp);

	Duration::milliseconds(base.min(max_backoff_ms))
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn backlog_config() -> glean_config::Backlog {
		glean_config::Backlog {
			poll_interval_ms: 50,
			lease_seconds: 30,
			retry_limit: 3,
			base_backoff_ms: 1_000,
			max_backoff_ms: 60_000,
		}
	}

	#[test]
	fn backoff_doubles_then_caps() {
		assert_eq!(backoff_for_attempt(1, 1_000, 60_000), Duration::seconds(1));
		assert_eq!(backoff_for_attempt(2, 1_000, 60_000), Duration::seconds(2));
		assert_eq!(backoff_for_attempt(4, 1_000, 60_000), Duration::seconds(8));
		assert_eq!(backoff_for_attempt(7, 1_000, 60_000), Duration::seconds(60));
		assert_eq!(backoff_for_attempt(0, 1_000, 60_000), Duration::seconds(1));
	}

	#[test]
	fn backoff_exponent_is_capped() {
		assert_eq!(backoff_for_attempt(i32::MAX, 1, i64::MAX), Duration::milliseconds(1 << 16));
	}

	#[test]
	fn retries_until_limit_then_gives_up() {
		let cfg = backlog_config();
		let now = datetime!(2024-01-01 00:00 UTC);

		assert_eq!(
			retry_decision(0, &cfg, now),
			RetryDecision::Retry { times_retried: 1, available_at: now + Duration::seconds(1) }
		);
		assert_eq!(
			retry_decision(2, &cfg, now),
			RetryDecision::Retry { times_retried: 3, available_at: now + Duration::seconds(4) }
		);
		assert_eq!(retry_decision(3, &cfg, now), RetryDecision::GiveUp);
	}

	#[test]
	fn storage_failures_keep_the_retry_count() {
		let cfg = backlog_config();
		let now = datetime!(2024-01-01 00:00 UTC);

		assert_eq!(store_failure_retry(0, &cfg, now), (0, now + Duration::seconds(1)));
		assert_eq!(store_failure_retry(3, &cfg, now), (3, now + Duration::seconds(8)));
		assert!(matches!(retry_decision(3, &cfg, now), RetryDecision::GiveUp));
	}

	#[test]
	fn zero_retry_limit_gives_up_after_first_attempt() {
		let cfg = glean_config::Backlog { retry_limit: 0, ..backlog_config() };

		assert_eq!(
			retry_decision(0, &cfg, datetime!(2024-01-01 00:00 UTC)),
			RetryDecision::GiveUp
		);
	}
}
