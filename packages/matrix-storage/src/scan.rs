//! Ordered, resumable scans over `gtin_matrix`.
//!
//! A [`MatrixScan`] names an ordering, a set of pushed-down predicates, an optional exclusive
//! resume anchor and a row limit. Every ordering ends with `gtin` so positions are total.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, models::MatrixRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
	#[default]
	Name,
	Sku,
}
impl SearchField {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Name => "name",
			Self::Sku => "sku",
		}
	}

	pub fn column(self) -> &'static str {
		match self {
			Self::Name => "name_key",
			Self::Sku => "sku_key",
		}
	}

	pub fn key_of(self, record: &MatrixRecord) -> &str {
		match self {
			Self::Name => record.name_key.as_str(),
			Self::Sku => record.sku_key.as_str(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
	/// `gtin ASC`.
	Gtin,
	/// `<field>_key ASC, gtin ASC`.
	SearchKey(SearchField),
	/// `price_spread DESC, gtin ASC`.
	SpreadDesc,
}
impl ScanOrder {
	pub fn compare(self, left: &MatrixRecord, right: &MatrixRecord) -> Ordering {
		match self {
			Self::Gtin => left.gtin.cmp(&right.gtin),
			Self::SearchKey(field) => field
				.key_of(left)
				.cmp(field.key_of(right))
				.then_with(|| left.gtin.cmp(&right.gtin)),
			Self::SpreadDesc => right
				.price_spread
				.total_cmp(&left.price_spread)
				.then_with(|| left.gtin.cmp(&right.gtin)),
		}
	}

	/// The position of `record` under this ordering.
	pub fn anchor_for(self, record: &MatrixRecord) -> ScanAnchor {
		match self {
			Self::Gtin => ScanAnchor::Gtin(record.gtin.clone()),
			Self::SearchKey(field) => ScanAnchor::SearchKey {
				key: field.key_of(record).to_string(),
				gtin: record.gtin.clone(),
			},
			Self::SpreadDesc =>
				ScanAnchor::Spread { spread: record.price_spread, gtin: record.gtin.clone() },
		}
	}

	fn accepts(self, anchor: &ScanAnchor) -> bool {
		matches!(
			(self, anchor),
			(Self::Gtin, ScanAnchor::Gtin(_))
				| (Self::SearchKey(_), ScanAnchor::SearchKey { .. })
				| (Self::SpreadDesc, ScanAnchor::Spread { .. })
		)
	}
}

/// Predicates the store evaluates server-side. All present predicates must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanFilter {
	pub gtin: Option<String>,
	/// Prefix of the search key column named by [`ScanOrder::SearchKey`].
	pub key_prefix: Option<String>,
	pub search_token: Option<String>,
	pub mismatch_only: bool,
}

/// An exclusive resume position: the scan yields only records strictly after it.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanAnchor {
	Gtin(String),
	SearchKey { key: String, gtin: String },
	Spread { spread: f64, gtin: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixScan {
	pub order: ScanOrder,
	pub filter: ScanFilter,
	pub after: Option<ScanAnchor>,
	pub limit: u32,
}
impl MatrixScan {
	pub fn validate(&self) -> Result<()> {
		if self.limit == 0 {
			return Err(Error::InvalidArgument("scan limit must be greater than zero.".to_string()));
		}
		if let Some(anchor) = self.after.as_ref()
			&& !self.order.accepts(anchor)
		{
			return Err(Error::InvalidArgument(format!(
				"scan anchor {anchor:?} does not match order {:?}.",
				self.order
			)));
		}
		if self.filter.key_prefix.is_some() && !matches!(self.order, ScanOrder::SearchKey(_)) {
			return Err(Error::InvalidArgument(
				"key_prefix requires a search key ordering.".to_string(),
			));
		}

		Ok(())
	}

	pub fn matches(&self, record: &MatrixRecord) -> bool {
		let filter = &self.filter;

		if let Some(gtin) = filter.gtin.as_ref()
			&& record.gtin != *gtin
		{
			return false;
		}
		if let (Some(prefix), ScanOrder::SearchKey(field)) = (filter.key_prefix.as_ref(), self.order)
			&& !field.key_of(record).starts_with(prefix.as_str())
		{
			return false;
		}
		if let Some(token) = filter.search_token.as_ref()
			&& !record.search_tokens.iter().any(|value| value == token)
		{
			return false;
		}
		if filter.mismatch_only && !record.has_mismatch {
			return false;
		}

		true
	}

	pub fn is_after_anchor(&self, record: &MatrixRecord) -> bool {
		let Some(anchor) = self.after.as_ref() else {
			return true;
		};

		match (anchor, self.order) {
			(ScanAnchor::Gtin(gtin), ScanOrder::Gtin) => record.gtin.as_str() > gtin.as_str(),
			(ScanAnchor::SearchKey { key, gtin }, ScanOrder::SearchKey(field)) =>
				(field.key_of(record), record.gtin.as_str()) > (key.as_str(), gtin.as_str()),
			(ScanAnchor::Spread { spread, gtin }, ScanOrder::SpreadDesc) =>
				record.price_spread < *spread
					|| (record.price_spread == *spread && record.gtin.as_str() > gtin.as_str()),
			_ => false,
		}
	}
}
