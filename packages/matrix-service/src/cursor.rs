//! Opaque resume tokens.
//!
//! A cursor is a mode-tagged JSON object encoded as URL-safe base64 without padding. Decoding
//! fails closed: anything that does not decode, or that was minted for another access mode or
//! search field, resumes from the beginning.
//!
//! Token cursors carry the spread as its IEEE 754 bit pattern. The resume predicate compares
//! spreads for equality, so the anchor must come back bit for bit.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use matrix_storage::scan::{ScanAnchor, SearchField};

use crate::{
	Error, Result,
	planner::{AccessMode, QueryPlan},
};

pub const MAX_CURSOR_CHARS: usize = 4_096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "m", rename_all = "snake_case")]
pub enum Cursor {
	Key { id: String },
	Exact { id: String },
	Prefix { f: SearchField, k: String, id: String },
	Token { s: u64, id: String },
}
impl Cursor {
	pub fn from_anchor(plan: &QueryPlan, anchor: ScanAnchor) -> Self {
		match anchor {
			ScanAnchor::Gtin(id) if plan.mode == AccessMode::ExactKey => Self::Exact { id },
			ScanAnchor::Gtin(id) => Self::Key { id },
			ScanAnchor::SearchKey { key, gtin } =>
				Self::Prefix { f: plan.search_field, k: key, id: gtin },
			ScanAnchor::Spread { spread, gtin } => Self::Token { s: spread.to_bits(), id: gtin },
		}
	}

	pub fn encode(&self) -> Result<String> {
		let json = serde_json::to_vec(self).map_err(|err| Error::InvalidRequest {
			message: format!("Failed to encode cursor: {err}."),
		})?;

		Ok(URL_SAFE_NO_PAD.encode(json))
	}

	pub fn decode(token: &str) -> Option<Self> {
		if token.len() > MAX_CURSOR_CHARS {
			return None;
		}

		let bytes = URL_SAFE_NO_PAD.decode(token.as_bytes()).ok()?;

		serde_json::from_slice(&bytes).ok()
	}

	/// The resume anchor for `plan`, or `None` when this cursor belongs to another mode.
	pub fn into_anchor(self, plan: &QueryPlan) -> Option<ScanAnchor> {
		match (self, plan.mode) {
			(Self::Key { id }, AccessMode::ByKey) | (Self::Exact { id }, AccessMode::ExactKey) =>
				Some(ScanAnchor::Gtin(id)),
			(Self::Prefix { f, k, id }, AccessMode::Prefix) if f == plan.search_field =>
				Some(ScanAnchor::SearchKey { key: k, gtin: id }),
			(Self::Token { s, id }, AccessMode::Token) if f64::from_bits(s).is_finite() =>
				Some(ScanAnchor::Spread { spread: f64::from_bits(s), gtin: id }),
			_ => None,
		}
	}
}

/// Resolves a client token into a resume anchor, logging and discarding tokens that do not fit.
pub fn resume_anchor(token: Option<&str>, plan: &QueryPlan) -> Option<ScanAnchor> {
	let token = token.map(str::trim).filter(|token| !token.is_empty())?;
	let Some(cursor) = Cursor::decode(token) else {
		tracing::warn!(
			mode = plan.mode.as_str(),
			token_len = token.len(),
			"Discarding undecodable cursor."
		);

		return None;
	};
	let anchor = cursor.clone().into_anchor(plan);

	if anchor.is_none() {
		tracing::warn!(
			mode = plan.mode.as_str(),
			search_field = plan.search_field.as_str(),
			?cursor,
			"Discarding cursor minted for another access mode."
		);
	}

	anchor
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::planner::plan;

	#[test]
	fn prefix_cursor_resumes_after_composite_key() {
		let plan = plan("cola", false, SearchField::Name);
		let anchor = ScanAnchor::SearchKey { key: "cola330ml".to_string(), gtin: "42".to_string() };
		let token = Cursor::from_anchor(&plan, anchor.clone()).encode().expect("encode");

		assert!(!token.contains('='));
		assert_eq!(resume_anchor(Some(&token), &plan), Some(anchor));
	}

	#[test]
	fn cursors_do_not_cross_modes() {
		let by_key = plan("", false, SearchField::Name);
		let token = Cursor::Key { id: "00000001".to_string() }.encode().expect("encode");

		for other in [
			plan("00000001", false, SearchField::Name),
			plan("200ml", false, SearchField::Name),
			plan("cola", false, SearchField::Name),
		] {
			assert_eq!(resume_anchor(Some(&token), &other), None);
		}

		assert_eq!(
			resume_anchor(Some(&token), &by_key),
			Some(ScanAnchor::Gtin("00000001".to_string()))
		);
	}

	#[test]
	fn prefix_cursor_is_bound_to_its_field() {
		let name_plan = plan("cola", false, SearchField::Name);
		let sku_plan = plan("cola", false, SearchField::Sku);
		let token = Cursor::Prefix { f: SearchField::Name, k: "cola".to_string(), id: "1".to_string() }
			.encode()
			.expect("encode");

		assert!(resume_anchor(Some(&token), &name_plan).is_some());
		assert_eq!(resume_anchor(Some(&token), &sku_plan), None);
	}

	#[test]
	fn garbage_and_oversize_tokens_fail_closed() {
		let plan = plan("", false, SearchField::Name);
		let oversize = "A".repeat(MAX_CURSOR_CHARS + 1);
		let not_json = URL_SAFE_NO_PAD.encode(b"not json");

		assert_eq!(resume_anchor(Some("%%%"), &plan), None);
		assert_eq!(resume_anchor(Some(&not_json), &plan), None);
		assert_eq!(resume_anchor(Some(&oversize), &plan), None);
		assert_eq!(resume_anchor(Some("  "), &plan), None);
	}

	#[test]
	fn token_cursor_keeps_exact_spread() {
		let plan = plan("200ml", false, SearchField::Name);
		let anchor = ScanAnchor::Spread { spread: 0.1 + 0.2, gtin: "7".to_string() };
		let token = Cursor::from_anchor(&plan, anchor.clone()).encode().expect("encode");

		assert_eq!(resume_anchor(Some(&token), &plan), Some(anchor));
	}

	#[test]
	fn token_cursor_round_trips_cent_differences() {
		let plan = plan("200ml", false, SearchField::Name);

		for high in 0..=300_u32 {
			for low in 0..=high {
				let spread = f64::from(high) / 100.0 - f64::from(low) / 100.0;
				let anchor = ScanAnchor::Spread { spread, gtin: "30000000".to_string() };
				let token = Cursor::from_anchor(&plan, anchor).encode().expect("encode");
				let Some(ScanAnchor::Spread { spread: resumed, .. }) =
					resume_anchor(Some(&token), &plan)
				else {
					panic!("token cursor for {high}/100 - {low}/100 did not resume");
				};

				assert_eq!(resumed.to_bits(), spread.to_bits(), "{high}/100 - {low}/100");
			}
		}
	}

	#[test]
	fn non_finite_spread_bits_fail_closed() {
		let plan = plan("200ml", false, SearchField::Name);

		for spread in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
			let token = Cursor::Token { s: spread.to_bits(), id: "1".to_string() }
				.encode()
				.expect("encode");

			assert_eq!(resume_anchor(Some(&token), &plan), None);
		}
	}
}
