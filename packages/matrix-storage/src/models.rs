use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Catalog linkage and price of one product at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPrice {
	#[serde(default)]
	pub merchant_id: Option<String>,
	#[serde(default)]
	pub location_id: Option<String>,
	#[serde(default)]
	pub variation_id: Option<String>,
	#[serde(default)]
	pub item_id: Option<String>,
	pub price: f64,
	#[serde(default)]
	pub currency: Option<String>,
	#[serde(default, with = "crate::time_serde")]
	pub calculated_at: Option<OffsetDateTime>,
}

/// The per-GTIN aggregate. `has_mismatch` and `price_spread` are maintained by the writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRecord {
	pub gtin: String,
	pub name: String,
	pub sku: String,
	pub name_key: String,
	pub sku_key: String,
	pub search_tokens: Vec<String>,
	pub prices_by_location: BTreeMap<String, LocationPrice>,
	pub has_mismatch: bool,
	pub price_spread: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LocationRecord {
	pub loc_key: String,
	pub merchant_id: Option<String>,
	pub merchant_name: Option<String>,
	pub location_name: Option<String>,
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn price_entries_tolerate_sparse_writer_output() {
		let entry: LocationPrice = serde_json::from_value(serde_json::json!({
			"price": 2.5,
			"calculated_at": "2026-01-05T09:30:00Z"
		}))
		.expect("Failed to decode price entry.");

		assert_eq!(entry.price, 2.5);
		assert_eq!(entry.merchant_id, None);
		assert_eq!(entry.calculated_at, Some(datetime!(2026-01-05 09:30 UTC)));

		let encoded = serde_json::to_value(&entry).expect("Failed to encode price entry.");

		assert_eq!(encoded["calculated_at"], "2026-01-05T09:30:00Z");
		assert!(encoded["currency"].is_null());
	}
}
