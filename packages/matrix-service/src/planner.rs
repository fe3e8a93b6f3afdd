//! Access-mode selection.
//!
//! Every request maps to exactly one [`AccessMode`], chosen from the normalized query text alone.
//! The first matching rule wins: empty text scans by key, long digit runs look up one GTIN, short
//! size/pack tokens look up `search_tokens`, and anything else is a search key prefix.

use serde::{Deserialize, Serialize};

use matrix_config::Query;
use matrix_domain::normalize::{is_exact_gtin, normalize_query, search_key, size_token};
use matrix_storage::scan::{MatrixScan, ScanAnchor, ScanFilter, ScanOrder, SearchField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
	ByKey,
	ExactKey,
	Token,
	Prefix,
}
impl AccessMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::ByKey => "by_key",
			Self::ExactKey => "exact_key",
			Self::Token => "token",
			Self::Prefix => "prefix",
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
	pub mode: AccessMode,
	pub order: ScanOrder,
	pub filter: ScanFilter,
	pub search_field: SearchField,
}
impl QueryPlan {
	pub fn scan(&self, after: Option<ScanAnchor>, limit: u32) -> MatrixScan {
		MatrixScan { order: self.order, filter: self.filter.clone(), after, limit }
	}
}

pub fn plan(query_text: &str, mismatch_only: bool, search_field: SearchField) -> QueryPlan {
	let normalized = normalize_query(query_text);
	let mut filter = ScanFilter { mismatch_only, ..Default::default() };
	let (mode, order) = if normalized.is_empty() {
		(AccessMode::ByKey, ScanOrder::Gtin)
	} else if is_exact_gtin(&normalized) {
		filter.gtin = Some(normalized);

		(AccessMode::ExactKey, ScanOrder::Gtin)
	} else if let Some(token) = size_token(&normalized) {
		filter.search_token = Some(token);

		(AccessMode::Token, ScanOrder::SpreadDesc)
	} else {
		filter.key_prefix = Some(search_key(&normalized));

		(AccessMode::Prefix, ScanOrder::SearchKey(search_field))
	};

	QueryPlan { mode, order, filter, search_field }
}

/// Absent sizes use the default; everything else is clamped to `[1, max_page_size]`.
pub fn clamp_page_size(requested: Option<u32>, cfg: &Query) -> u32 {
	requested.unwrap_or(cfg.default_page_size).clamp(1, cfg.max_page_size.max(1))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_text_scans_by_key() {
		let plan = plan("   ", false, SearchField::Name);

		assert_eq!(plan.mode, AccessMode::ByKey);
		assert_eq!(plan.order, ScanOrder::Gtin);
		assert_eq!(plan.filter, ScanFilter::default());
	}

	#[test]
	fn long_digit_runs_are_exact_lookups() {
		let plan = plan(" 0001 2345 6789 ", true, SearchField::Name);

		assert_eq!(plan.mode, AccessMode::ExactKey);
		assert_eq!(plan.filter.gtin.as_deref(), Some("000123456789"));
		assert!(plan.filter.mismatch_only);
	}

	#[test]
	fn short_digit_runs_fall_through_to_prefix() {
		let plan = plan("1234567", false, SearchField::Sku);

		assert_eq!(plan.mode, AccessMode::Prefix);
		assert_eq!(plan.order, ScanOrder::SearchKey(SearchField::Sku));
		assert_eq!(plan.filter.key_prefix.as_deref(), Some("1234567"));
	}

	#[test]
	fn size_tokens_look_up_search_tokens() {
		let plan = plan("200 ML", false, SearchField::Name);

		assert_eq!(plan.mode, AccessMode::Token);
		assert_eq!(plan.order, ScanOrder::SpreadDesc);
		assert_eq!(plan.filter.search_token.as_deref(), Some("200ml"));
	}

	#[test]
	fn long_tokens_are_prefixes() {
		let plan = plan("12345678901ml", false, SearchField::Name);

		assert_eq!(plan.mode, AccessMode::Prefix);
	}

	#[test]
	fn prefix_keys_drop_punctuation() {
		let plan = plan("Coca-Cola", false, SearchField::Name);

		assert_eq!(plan.mode, AccessMode::Prefix);
		assert_eq!(plan.filter.key_prefix.as_deref(), Some("cocacola"));
	}

	#[test]
	fn page_size_is_clamped() {
		let cfg = Query { default_page_size: 50, max_page_size: 200, request_timeout_ms: 1_000 };

		assert_eq!(clamp_page_size(None, &cfg), 50);
		assert_eq!(clamp_page_size(Some(0), &cfg), 1);
		assert_eq!(clamp_page_size(Some(10_000), &cfg), 200);
		assert_eq!(clamp_page_size(Some(7), &cfg), 7);
	}
}
