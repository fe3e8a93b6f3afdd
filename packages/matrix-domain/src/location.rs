/// Display label for a location: merchant name, then location name, then the key itself.
pub fn location_label(
	merchant_name: Option<&str>,
	location_name: Option<&str>,
	loc_key: &str,
) -> String {
	[merchant_name, location_name]
		.into_iter()
		.flatten()
		.map(str::trim)
		.find(|value| !value.is_empty())
		.unwrap_or(loc_key)
		.to_string()
}
