use std::collections::BTreeMap;

use time::{OffsetDateTime, macros::datetime};

use matrix_domain::{
	normalize::{extract_search_tokens, search_key},
	pricing::price_summary,
};
use matrix_storage::models::{LocationPrice, LocationRecord, MatrixRecord};

const CALCULATED_AT: OffsetDateTime = datetime!(2026-01-05 09:30 UTC);

/// Builds a [`MatrixRecord`] whose derived fields follow the writer's rules.
pub struct RecordBuilder {
	gtin: String,
	name: String,
	sku: String,
	prices: BTreeMap<String, LocationPrice>,
	flags: Option<(bool, f64)>,
}
impl RecordBuilder {
	pub fn sku(mut self, sku: &str) -> Self {
		self.sku = sku.to_string();

		self
	}

	pub fn price(mut self, loc_key: &str, price: f64) -> Self {
		let ordinal = self.prices.len();

		self.prices.insert(
			loc_key.to_string(),
			LocationPrice {
				merchant_id: Some(format!("merchant-{loc_key}")),
				location_id: Some(loc_key.to_string()),
				variation_id: Some(format!("var-{}-{ordinal}", self.gtin)),
				item_id: Some(format!("item-{}", self.gtin)),
				price,
				currency: Some("USD".to_string()),
				calculated_at: Some(CALCULATED_AT),
			},
		);

		self
	}

	/// Overrides the derived mismatch flags, producing a record the writer would never emit.
	pub fn stale_flags(mut self, has_mismatch: bool, price_spread: f64) -> Self {
		self.flags = Some((has_mismatch, price_spread));

		self
	}

	pub fn build(self) -> MatrixRecord {
		let summary = price_summary(self.prices.values().map(|entry| entry.price));
		let (has_mismatch, price_spread) =
			self.flags.unwrap_or((summary.has_mismatch, summary.price_spread));

		MatrixRecord {
			name_key: search_key(&self.name),
			sku_key: search_key(&self.sku),
			search_tokens: extract_search_tokens(&self.name).into_iter().collect(),
			gtin: self.gtin,
			name: self.name,
			sku: self.sku,
			prices_by_location: self.prices,
			has_mismatch,
			price_spread,
		}
	}
}

pub fn record(gtin: &str, name: &str) -> RecordBuilder {
	RecordBuilder {
		gtin: gtin.to_string(),
		name: name.to_string(),
		sku: String::new(),
		prices: BTreeMap::new(),
		flags: None,
	}
}

pub fn location(loc_key: &str, merchant_name: Option<&str>) -> LocationRecord {
	LocationRecord {
		loc_key: loc_key.to_string(),
		merchant_id: Some(format!("merchant-{loc_key}")),
		merchant_name: merchant_name.map(str::to_string),
		location_name: Some(format!("Store {loc_key}")),
	}
}
