mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Annotations, Backlog, Config, Fetcher, Postgres, Service, Storage};

use std::{fs, path::Path};

const MAX_DAY_OFFSET_MINUTES: i32 = 18 * 60;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.fetcher.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "fetcher.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.fetcher.user_agent.trim().is_empty() {
		return Err(Error::Validation {
			message: "fetcher.user_agent must be non-empty.".to_string(),
		});
	}
	if cfg.fetcher.max_body_bytes == 0 {
		return Err(Error::Validation {
			message: "fetcher.max_body_bytes must be greater than zero.".to_string(),
		});
	}
	if cfg.annotations.inner_limit_multiplier == 0 {
		return Err(Error::Validation {
			message: "annotations.inner_limit_multiplier must be greater than zero.".to_string(),
		});
	}
	if cfg.annotations.default_limit == 0 {
		return Err(Error::Validation {
			message: "annotations.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.annotations.day_utc_offset_minutes.abs() > MAX_DAY_OFFSET_MINUTES {
		return Err(Error::Validation {
			message: "annotations.day_utc_offset_minutes must be within +/-1080.".to_string(),
		});
	}
	if cfg.backlog.poll_interval_ms == 0 {
		return Err(Error::Validation {
			message: "backlog.poll_interval_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.backlog.lease_seconds <= 0 {
		return Err(Error::Validation {
			message: "backlog.lease_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.backlog.base_backoff_ms <= 0 {
		return Err(Error::Validation {
			message: "backlog.base_backoff_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.backlog.max_backoff_ms < cfg.backlog.base_backoff_ms {
		return Err(Error::Validation {
			message: "backlog.max_backoff_ms must be greater than or equal to backlog.base_backoff_ms."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.fetcher.user_agent = cfg.fetcher.user_agent.trim().to_string();
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
}
