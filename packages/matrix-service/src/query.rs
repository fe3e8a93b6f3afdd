use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use matrix_storage::{
	models::MatrixRecord,
	scan::{ScanAnchor, SearchField},
};

use crate::{
	Error, MatrixService, Result,
	assemble::{self, MatrixQueryResponse, ScanSummary},
	cursor::{self, Cursor},
	locations::LocationDirectory,
	missing::{self, MissingFilter, ScanOutcome},
	planner::{self, QueryPlan},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixQueryRequest {
	#[serde(alias = "q", alias = "query", alias = "queryText")]
	pub query_text: String,
	#[serde(alias = "mismatchOnly")]
	pub mismatch_only: bool,
	#[serde(alias = "missingOnly")]
	pub missing_only: bool,
	#[serde(alias = "missingTarget")]
	pub missing_target: Option<String>,
	#[serde(alias = "missingRequirePresentIn")]
	pub missing_require_present_in: Option<String>,
	#[serde(alias = "searchField")]
	pub search_field: SearchField,
	#[serde(alias = "pageSize")]
	pub page_size: Option<u32>,
	pub cursor: Option<String>,
}
impl MatrixQueryRequest {
	fn missing_filter(&self) -> Result<Option<MissingFilter>> {
		let require_present_in = non_blank(self.missing_require_present_in.as_deref());

		if !self.missing_only {
			return Ok(None);
		}

		let Some(target) = non_blank(self.missing_target.as_deref()) else {
			return Err(Error::InvalidField {
				field: "missing_target".to_string(),
				message: "missing_target is required when missing_only is set.".to_string(),
			});
		};

		Ok(Some(MissingFilter { target, require_present_in }))
	}
}

impl MatrixService {
	/// Runs one page of a matrix query within the configured request timeout.
	pub async fn query(&self, req: MatrixQueryRequest) -> Result<MatrixQueryResponse> {
		let cancel = CancellationToken::new();

		self.with_timeout(self.query_with_cancel(req, &cancel)).await
	}

	pub async fn query_with_cancel(
		&self,
		req: MatrixQueryRequest,
		cancel: &CancellationToken,
	) -> Result<MatrixQueryResponse> {
		let started = Instant::now();
		let page_size = planner::clamp_page_size(req.page_size, &self.cfg.query);
		let plan = planner::plan(&req.query_text, req.mismatch_only, req.search_field);
		let missing = req.missing_filter()?;
		let directory = self.locations.get(self.store.as_ref(), cancel).await?;

		if let Some(filter) = missing.as_ref() {
			ensure_known(&directory, "missing_target", &filter.target)?;

			if let Some(loc_key) = filter.require_present_in.as_deref() {
				ensure_known(&directory, "missing_require_present_in", loc_key)?;
			}
		}

		let after = cursor::resume_anchor(req.cursor.as_deref(), &plan);
		let outcome = match missing.as_ref() {
			Some(filter) =>
				missing::scan_missing(
					self.store.as_ref(),
					&plan,
					filter,
					after,
					page_size,
					&self.cfg.missing_scan,
					cancel,
				)
				.await?,
			None => self.scan_page(&plan, after, page_size, cancel).await?,
		};
		let next_cursor = outcome
			.resume
			.map(|anchor| Cursor::from_anchor(&plan, anchor).encode())
			.transpose()?;
		let summary =
			ScanSummary { mode: plan.mode, rounds: outcome.rounds, scanned: outcome.scanned };

		tracing::info!(
			mode = plan.mode.as_str(),
			missing_only = missing.is_some(),
			mismatch_only = req.mismatch_only,
			page_size,
			rows = outcome.rows.len(),
			rounds = outcome.rounds,
			scanned = outcome.scanned,
			has_next = next_cursor.is_some(),
			elapsed_ms = started.elapsed().as_millis() as u64,
			"Matrix query served."
		);

		Ok(assemble::assemble(outcome.rows, &directory, next_cursor, summary))
	}

	/// Single-query page with one look-ahead record.
	async fn scan_page(
		&self,
		plan: &QueryPlan,
		after: Option<ScanAnchor>,
		page_size: u32,
		cancel: &CancellationToken,
	) -> Result<ScanOutcome> {
		let scan = plan.scan(after, page_size.saturating_add(1));
		let mut rows: Vec<MatrixRecord> =
			crate::until_canceled(cancel, self.store.scan(&scan)).await?;
		let scanned = rows.len() as u64;
		let resume = if rows.len() > page_size as usize {
			rows.truncate(page_size as usize);

			rows.last().map(|record| plan.order.anchor_for(record))
		} else {
			None
		};

		Ok(ScanOutcome { rows, resume, rounds: 1, scanned })
	}
}

fn non_blank(value: Option<&str>) -> Option<String> {
	value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

fn ensure_known(directory: &LocationDirectory, field: &str, loc_key: &str) -> Result<()> {
	if directory.contains(loc_key) {
		return Ok(());
	}

	Err(Error::InvalidField {
		field: field.to_string(),
		message: format!("{field} {loc_key:?} is not a known location."),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_only_requires_a_target() {
		let req = MatrixQueryRequest {
			missing_only: true,
			missing_target: Some("  ".to_string()),
			..Default::default()
		};

		assert!(matches!(
			req.missing_filter(),
			Err(Error::InvalidField { field, .. }) if field == "missing_target"
		));
	}

	#[test]
	fn request_accepts_camel_case_aliases() {
		let req: MatrixQueryRequest = serde_json::from_value(serde_json::json!({
			"q": "cola",
			"mismatchOnly": true,
			"missingOnly": true,
			"missingTarget": "L1",
			"searchField": "sku",
			"pageSize": 25
		}))
		.expect("request");

		assert_eq!(req.query_text, "cola");
		assert!(req.mismatch_only);
		assert_eq!(req.search_field, SearchField::Sku);
		assert_eq!(req.page_size, Some(25));
		assert_eq!(
			req.missing_filter().expect("filter"),
			Some(MissingFilter { target: "L1".to_string(), require_present_in: None })
		);
	}
}
