pub mod assemble;
pub mod cursor;
pub mod locations;
pub mod missing;
pub mod planner;
pub mod query;

mod error;

pub use assemble::{MatrixQueryResponse, ScanSummary};
pub use error::{Error, Result};
pub use locations::{LocationMeta, LocationsResponse};
pub use planner::AccessMode;
pub use query::MatrixQueryRequest;

use std::{future::Future, sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use matrix_config::Config;
use matrix_domain::normalize::{is_exact_gtin, normalize_query};
use matrix_storage::{
	models::MatrixRecord,
	store::{BoxFuture, MatrixStore},
};

use crate::locations::LocationCache;

pub struct MatrixService {
	pub cfg: Config,
	pub store: Arc<dyn MatrixStore>,
	locations: LocationCache,
}
impl MatrixService {
	pub fn new(cfg: Config, store: Arc<dyn MatrixStore>) -> Self {
		let locations = LocationCache::new(Duration::from_secs(cfg.locations.cache_ttl_secs));

		Self { cfg, store, locations }
	}

	pub async fn locations(&self) -> Result<LocationsResponse> {
		let cancel = CancellationToken::new();
		let directory = self.with_timeout(self.locations.get(self.store.as_ref(), &cancel)).await?;

		Ok(directory.to_response())
	}

	/// Drops the cached directory and fetches it again.
	pub async fn refresh_locations(&self) -> Result<LocationsResponse> {
		self.locations.invalidate();

		self.locations().await
	}

	pub async fn get_record(&self, gtin: &str) -> Result<MatrixRecord> {
		let gtin = normalize_query(gtin);

		if !is_exact_gtin(&gtin) {
			return Err(Error::InvalidField {
				field: "gtin".to_string(),
				message: "gtin must be a digits-only identifier of at least 8 digits.".to_string(),
			});
		}

		let cancel = CancellationToken::new();
		let record = self.with_timeout(until_canceled(&cancel, self.store.get(&gtin))).await?;

		record.ok_or_else(|| Error::NotFound { message: format!("No matrix record for {gtin}.") })
	}

	async fn with_timeout<T, F>(&self, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		let timeout_ms = self.cfg.query.request_timeout_ms;

		match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
			Ok(result) => result,
			Err(_) => {
				tracing::warn!(timeout_ms, "Matrix request timed out.");

				Err(Error::Timeout { timeout_ms })
			},
		}
	}
}

/// Races a store call against `cancel`.
pub(crate) async fn until_canceled<T>(
	cancel: &CancellationToken,
	fut: BoxFuture<'_, matrix_storage::Result<T>>,
) -> Result<T> {
	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(Error::Canceled),
		result = fut => result.map_err(Error::from),
	}
}
