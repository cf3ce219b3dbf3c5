use serde::{Deserialize, Deserializer};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub fetcher: Fetcher,
	pub annotations: Annotations,
	pub backlog: Backlog,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fetcher {
	pub timeout_ms: u64,
	pub user_agent: String,
	#[serde(default = "default_include_fav_icon")]
	pub include_fav_icon: bool,
	#[serde(default = "default_max_body_bytes")]
	pub max_body_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Annotations {
	#[serde(default = "default_inner_limit_multiplier")]
	pub inner_limit_multiplier: u32,
	#[serde(default = "default_limit")]
	pub default_limit: u32,
	/// Earliest date the annotation feature existed; day listings never look further back.
	#[serde(deserialize_with = "deserialize_rfc3339")]
	pub feature_floor: OffsetDateTime,
	/// Optional. When set, day listings never look further back than this either.
	#[serde(default, deserialize_with = "deserialize_rfc3339_option")]
	pub install_time: Option<OffsetDateTime>,
	/// Offset applied when deciding which calendar day a timestamp belongs to.
	#[serde(default)]
	pub day_utc_offset_minutes: i32,
}
impl Annotations {
	pub fn day_offset(&self) -> UtcOffset {
		UtcOffset::from_whole_seconds(self.day_utc_offset_minutes.saturating_mul(60))
			.unwrap_or(UtcOffset::UTC)
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backlog {
	pub poll_interval_ms: u64,
	pub lease_seconds: i64,
	pub retry_limit: u32,
	pub base_backoff_ms: i64,
	pub max_backoff_ms: i64,
}

fn default_include_fav_icon() -> bool {
	true
}

fn default_max_body_bytes() -> u64 {
	4 * 1_024 * 1_024
}

fn default_inner_limit_multiplier() -> u32 {
	2
}

fn default_limit() -> u32 {
	10
}

fn deserialize_rfc3339<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	OffsetDateTime::parse(&raw, &Rfc3339).map_err(serde::de::Error::custom)
}

fn deserialize_rfc3339_option<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	match raw {
		Some(value) if value.trim().is_empty() => Ok(None),
		Some(value) =>
			OffsetDateTime::parse(&value, &Rfc3339).map(Some).map_err(serde::de::Error::custom),
		None => Ok(None),
	}
}
