mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Locations, MissingScan, Postgres, Query, Security, Service, Storage};

use std::{fs, path::Path};

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
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.query.max_page_size == 0 {
		return Err(Error::Validation {
			message: "query.max_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.query.default_page_size == 0 {
		return Err(Error::Validation {
			message: "query.default_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.query.default_page_size > cfg.query.max_page_size {
		return Err(Error::Validation {
			message: "query.default_page_size must be less than or equal to query.max_page_size."
				.to_string(),
		});
	}
	if cfg.query.request_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "query.request_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.missing_scan.over_fetch_factor == 0 {
		return Err(Error::Validation {
			message: "missing_scan.over_fetch_factor must be greater than zero.".to_string(),
		});
	}
	if cfg.missing_scan.max_batch == 0 {
		return Err(Error::Validation {
			message: "missing_scan.max_batch must be greater than zero.".to_string(),
		});
	}
	if cfg.missing_scan.max_rounds == 0 {
		return Err(Error::Validation {
			message: "missing_scan.max_rounds must be greater than zero.".to_string(),
		});
	}
	if cfg.locations.cache_ttl_secs == 0 {
		return Err(Error::Validation {
			message: "locations.cache_ttl_secs must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	cfg.service.http_bind = cfg.service.http_bind.trim().to_string();
	cfg.service.admin_bind = cfg.service.admin_bind.trim().to_string();
}
