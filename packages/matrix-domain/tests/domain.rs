use matrix_domain::{
	location::location_label,
	normalize::{extract_search_tokens, size_token},
	pricing::price_summary,
};

#[test]
fn two_distinct_prices_are_a_mismatch() {
	let summary = price_summary([2.0, 3.5, 2.0]);

	assert!(summary.has_mismatch);
	assert_eq!(summary.price_spread, 1.5);
}

#[test]
fn one_distinct_price_is_not_a_mismatch() {
	let summary = price_summary([4.25, 4.25]);

	assert!(!summary.has_mismatch);
	assert_eq!(summary.price_spread, 0.0);
}

#[test]
fn no_prices_is_not_a_mismatch() {
	let summary = price_summary(std::iter::empty());

	assert!(!summary.has_mismatch);
	assert_eq!(summary.price_spread, 0.0);
}

#[test]
fn non_finite_prices_are_ignored() {
	let summary = price_summary([f64::NAN, 1.0, f64::INFINITY]);

	assert!(!summary.has_mismatch);
	assert!(summary.agrees_with(false, 0.0));
}

#[test]
fn summary_detects_stale_flags() {
	let summary = price_summary([1.0, 3.0]);

	assert!(summary.agrees_with(true, 2.0));
	assert!(!summary.agrees_with(false, 0.0));
	assert!(!summary.agrees_with(true, 1.0));
}

#[test]
fn label_prefers_merchant_then_location_then_key() {
	assert_eq!(location_label(Some("Corner Mart"), Some("Main St"), "L1"), "Corner Mart");
	assert_eq!(location_label(Some("  "), Some("Main St"), "L1"), "Main St");
	assert_eq!(location_label(None, None, "L1"), "L1");
}

#[test]
fn tokens_cover_joined_and_split_sizes() {
	let tokens = extract_search_tokens("Fanta Orange 200 ml x 6pk (Glass)");

	assert!(tokens.contains("200ml"));
	assert!(tokens.contains("6pk"));
	assert!(!tokens.contains("glass"));
	assert_eq!(tokens.len(), 2);
}

#[test]
fn size_token_and_extraction_agree() {
	for token in extract_search_tokens("Evian 1L 500ml 24ct") {
		assert_eq!(size_token(&token).as_deref(), Some(token.as_str()));
	}
}
