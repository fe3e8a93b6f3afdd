use std::{
	collections::BTreeMap,
	sync::{Arc, RwLock},
	time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use matrix_domain::location::location_label;
use matrix_storage::{models::LocationRecord, store::MatrixStore};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationMeta {
	pub loc_key: String,
	pub label: String,
	pub merchant_id: Option<String>,
	pub merchant_name: Option<String>,
	pub location_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationsResponse {
	pub locations: Vec<String>,
	pub locations_meta: BTreeMap<String, LocationMeta>,
}

/// Known locations in display order: label, then key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationDirectory {
	entries: Vec<LocationMeta>,
}
impl LocationDirectory {
	pub fn from_records(records: Vec<LocationRecord>) -> Self {
		let mut entries: Vec<LocationMeta> = records
			.into_iter()
			.map(|record| LocationMeta {
				label: location_label(
					record.merchant_name.as_deref(),
					record.location_name.as_deref(),
					&record.loc_key,
				),
				loc_key: record.loc_key,
				merchant_id: record.merchant_id,
				merchant_name: record.merchant_name,
				location_name: record.location_name,
			})
			.collect();

		entries.sort_by(|left, right| {
			left.label.cmp(&right.label).then_with(|| left.loc_key.cmp(&right.loc_key))
		});

		Self { entries }
	}

	pub fn entries(&self) -> &[LocationMeta] {
		&self.entries
	}

	pub fn contains(&self, loc_key: &str) -> bool {
		self.entries.iter().any(|entry| entry.loc_key == loc_key)
	}

	pub fn keys(&self) -> Vec<String> {
		self.entries.iter().map(|entry| entry.loc_key.clone()).collect()
	}

	pub fn meta(&self) -> BTreeMap<String, LocationMeta> {
		self.entries.iter().map(|entry| (entry.loc_key.clone(), entry.clone())).collect()
	}

	pub fn to_response(&self) -> LocationsResponse {
		LocationsResponse { locations: self.keys(), locations_meta: self.meta() }
	}
}

struct Cached {
	directory: Arc<LocationDirectory>,
	fetched_at: Instant,
}

/// Lazily loaded, TTL-bounded copy of the location directory.
///
/// Concurrent misses may each fetch; the last writer wins.
pub struct LocationCache {
	ttl: Duration,
	state: RwLock<Option<Cached>>,
}
impl LocationCache {
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, state: RwLock::new(None) }
	}

	pub async fn get(
		&self,
		store: &dyn MatrixStore,
		cancel: &CancellationToken,
	) -> Result<Arc<LocationDirectory>> {
		if let Some(directory) = self.fresh() {
			return Ok(directory);
		}

		let records = crate::until_canceled(cancel, store.list_locations()).await?;
		let directory = Arc::new(LocationDirectory::from_records(records));

		tracing::debug!(locations = directory.entries().len(), "Location directory refreshed.");

		*self.state.write().unwrap_or_else(|err| err.into_inner()) =
			Some(Cached { directory: directory.clone(), fetched_at: Instant::now() });

		Ok(directory)
	}

	pub fn invalidate(&self) {
		*self.state.write().unwrap_or_else(|err| err.into_inner()) = None;
	}

	fn fresh(&self) -> Option<Arc<LocationDirectory>> {
		let guard = self.state.read().unwrap_or_else(|err| err.into_inner());
		let cached = guard.as_ref()?;

		(cached.fetched_at.elapsed() < self.ttl).then(|| cached.directory.clone())
	}
}
