use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Shortest all-digit query treated as a GTIN lookup.
pub const MIN_GTIN_DIGITS: usize = 8;
/// Longest alphanumeric token treated as a size/pack descriptor.
pub const MAX_SIZE_TOKEN_CHARS: usize = 10;

static SIZE_TOKEN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[0-9]+[a-z]+$").expect("Size token pattern must compile."));

/// Trims, lowercases and strips all whitespace.
pub fn normalize_query(raw: &str) -> String {
	raw.nfkc().flat_map(char::to_lowercase).filter(|ch| !ch.is_whitespace()).collect()
}

/// The lowercased, alphanumeric-only form stored in `name_key` and `sku_key`.
pub fn search_key(raw: &str) -> String {
	raw.nfkc().flat_map(char::to_lowercase).filter(|ch| ch.is_alphanumeric()).collect()
}

pub fn is_exact_gtin(normalized: &str) -> bool {
	normalized.len() >= MIN_GTIN_DIGITS && normalized.bytes().all(|byte| byte.is_ascii_digit())
}

/// Returns the size/pack token for queries such as `200ml` or `6 PK`.
pub fn size_token(raw: &str) -> Option<String> {
	let key = search_key(raw);

	if key.chars().count() > MAX_SIZE_TOKEN_CHARS || !SIZE_TOKEN.is_match(&key) {
		return None;
	}

	Some(key)
}

/// Extracts the size/pack tokens of a product name.
///
/// Both `200ml` and `200 ml` produce `200ml`.
pub fn extract_search_tokens(name: &str) -> BTreeSet<String> {
	let lowered: String = name.nfkc().flat_map(char::to_lowercase).collect();
	let words: Vec<&str> =
		lowered.split(|ch: char| !ch.is_alphanumeric()).filter(|word| !word.is_empty()).collect();
	let mut tokens = BTreeSet::new();

	for (idx, word) in words.iter().enumerate() {
		if let Some(token) = size_token(word) {
			tokens.insert(token);

			continue;
		}
		if !word.bytes().all(|byte| byte.is_ascii_digit()) {
			continue;
		}

		if let Some(unit) = words.get(idx + 1)
			&& unit.bytes().all(|byte| byte.is_ascii_lowercase())
			&& let Some(token) = size_token(&format!("{word}{unit}"))
		{
			tokens.insert(token);
		}
	}

	tokens
}
