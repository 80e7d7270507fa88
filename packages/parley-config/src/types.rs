use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub pagination: Pagination,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Page-size policy shared by every paged retrieval mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Pagination {
	/// Page size the CLI uses when `--per-page` is omitted.
	pub default_per_page: u32,
	/// Hard upper bound on a single page, whatever the caller asks for.
	pub max_per_page: u32,
}
impl Default for Pagination {
	fn default() -> Self {
		Self { default_per_page: 60, max_per_page: 200 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub max_results: u32,
	pub prefilter: SearchPrefilter,
}
impl Default for Search {
	fn default() -> Self {
		Self { max_results: 100, prefilter: SearchPrefilter::default() }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchPrefilter {
	/// Candidate rows read per prefilter round trip. Search keeps reading batches until enough
	/// posts pass exact term matching or the candidates run out.
	pub max_candidates: u32,
}
impl Default for SearchPrefilter {
	fn default() -> Self {
		Self { max_candidates: 1_000 }
	}
}
