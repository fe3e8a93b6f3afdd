//! Scan-and-filter for records absent from a location.
//!
//! Absence of a key in `prices_by_location` cannot be pushed down to an ordered index, so the
//! scanner walks the base ordering in bounded batches and filters in process. Pagination resumes
//! from the last record read, not the last record returned, so no record is read twice across
//! pages and rejected stretches are never revisited.

use tokio_util::sync::CancellationToken;

use matrix_config::MissingScan;
use matrix_storage::{models::MatrixRecord, scan::ScanAnchor, store::MatrixStore};

use crate::{Error, Result, planner::QueryPlan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFilter {
	pub target: String,
	pub require_present_in: Option<String>,
}
impl MissingFilter {
	pub fn matches(&self, record: &MatrixRecord) -> bool {
		let prices = &record.prices_by_location;

		if prices.is_empty() || prices.contains_key(&self.target) {
			return false;
		}

		self.require_present_in.as_ref().is_none_or(|loc_key| prices.contains_key(loc_key))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
	pub rows: Vec<MatrixRecord>,
	/// Position of the last record read; `None` once the ordering is exhausted.
	pub resume: Option<ScanAnchor>,
	pub rounds: u32,
	pub scanned: u64,
}

pub async fn scan_missing(
	store: &dyn MatrixStore,
	plan: &QueryPlan,
	filter: &MissingFilter,
	after: Option<ScanAnchor>,
	page_size: u32,
	bounds: &MissingScan,
	cancel: &CancellationToken,
) -> Result<ScanOutcome> {
	let page_size = page_size.max(1) as usize;
	let batch = bounds.batch_size(page_size as u32);
	let mut position = after;
	let mut rows = Vec::with_capacity(page_size);
	let mut rounds = 0;
	let mut scanned = 0_u64;
	let mut exhausted = false;

	while rounds < bounds.max_rounds {
		if cancel.is_cancelled() {
			return Err(Error::Canceled);
		}

		let scan = plan.scan(position.clone(), batch);
		let records = crate::until_canceled(cancel, store.scan(&scan)).await?;
		let fetched = records.len();
		let mut consumed = 0;

		rounds += 1;

		for record in records {
			consumed += 1;
			scanned += 1;
			position = Some(plan.order.anchor_for(&record));

			if filter.matches(&record) {
				rows.push(record);

				if rows.len() >= page_size {
					break;
				}
			}
		}

		tracing::debug!(
			round = rounds,
			batch,
			fetched,
			consumed,
			matched = rows.len(),
			"Missing-filter scan round finished."
		);

		if fetched < batch as usize && consumed == fetched {
			exhausted = true;

			break;
		}
		if rows.len() >= page_size {
			break;
		}
	}

	let resume = if exhausted { None } else { position };

	Ok(ScanOutcome { rows, resume, rounds, scanned })
}
