use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use matrix_domain::pricing::price_summary;
use matrix_storage::models::MatrixRecord;

use crate::{
	locations::{LocationDirectory, LocationMeta},
	planner::AccessMode,
};

/// Work done to produce one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
	pub mode: AccessMode,
	pub rounds: u32,
	pub scanned: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixQueryResponse {
	pub rows: Vec<MatrixRecord>,
	pub locations: Vec<String>,
	pub locations_meta: BTreeMap<String, LocationMeta>,
	pub next_cursor: Option<String>,
	pub scan: ScanSummary,
}

pub fn assemble(
	rows: Vec<MatrixRecord>,
	directory: &LocationDirectory,
	next_cursor: Option<String>,
	scan: ScanSummary,
) -> MatrixQueryResponse {
	for row in &rows {
		let summary = price_summary(row.prices_by_location.values().map(|entry| entry.price));

		if !summary.agrees_with(row.has_mismatch, row.price_spread) {
			tracing::warn!(
				gtin = %row.gtin,
				stored_has_mismatch = row.has_mismatch,
				stored_price_spread = row.price_spread,
				derived_has_mismatch = summary.has_mismatch,
				derived_price_spread = summary.price_spread,
				"Matrix record carries stale mismatch flags."
			);
		}
	}

	MatrixQueryResponse {
		rows,
		locations: directory.keys(),
		locations_meta: directory.meta(),
		next_cursor,
		scan,
	}
}
