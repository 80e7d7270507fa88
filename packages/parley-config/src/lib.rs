mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Pagination, Postgres, Search, SearchPrefilter, Service, Storage};

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
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
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
	if cfg.pagination.max_per_page == 0 {
		return Err(Error::Validation {
			message: "pagination.max_per_page must be greater than zero.".to_string(),
		});
	}
	if cfg.pagination.default_per_page == 0 {
		return Err(Error::Validation {
			message: "pagination.default_per_page must be greater than zero.".to_string(),
		});
	}
	if cfg.pagination.default_per_page > cfg.pagination.max_per_page {
		return Err(Error::Validation {
			message: "pagination.default_per_page must not exceed pagination.max_per_page."
				.to_string(),
		});
	}
	if cfg.search.max_results == 0 {
		return Err(Error::Validation {
			message: "search.max_results must be greater than zero.".to_string(),
		});
	}
	if cfg.search.prefilter.max_candidates < cfg.search.max_results {
		return Err(Error::Validation {
			message: "search.prefilter.max_candidates must be at least search.max_results."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
	cfg.storage.postgres.dsn = cfg.storage.postgres.dsn.trim().to_string();
}
