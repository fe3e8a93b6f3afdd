use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub query: Query,
	#[serde(default)]
	pub missing_scan: MissingScan,
	#[serde(default)]
	pub locations: Locations,
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
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

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Query {
	/// Page size used when a request does not name one.
	pub default_page_size: u32,
	/// Upper bound applied to every requested page size.
	pub max_page_size: u32,
	pub request_timeout_ms: u64,
}
impl Default for Query {
	fn default() -> Self {
		Self { default_page_size: 50, max_page_size: 200, request_timeout_ms: 10_000 }
	}
}

/// Bounds for the `missing_only` scan-and-filter loop.
///
/// One request reads at most `max_rounds * max_batch` matrix records over `max_rounds` store
/// queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MissingScan {
	pub over_fetch_factor: u32,
	pub max_batch: u32,
	pub max_rounds: u32,
}
impl MissingScan {
	pub fn batch_size(&self, page_size: u32) -> u32 {
		page_size.saturating_mul(self.over_fetch_factor).min(self.max_batch).max(1)
	}

	pub fn worst_case_reads(&self) -> u64 {
		u64::from(self.max_rounds) * u64::from(self.max_batch)
	}
}
impl Default for MissingScan {
	fn default() -> Self {
		Self { over_fetch_factor: 3, max_batch: 500, max_rounds: 5 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Locations {
	pub cache_ttl_secs: u64,
}
impl Default for Locations {
	fn default() -> Self {
		Self { cache_ttl_secs: 300 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}
