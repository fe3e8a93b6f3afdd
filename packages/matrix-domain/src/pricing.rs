/// Mismatch flags derived from a record's per-location prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSummary {
	pub has_mismatch: bool,
	pub price_spread: f64,
}
impl PriceSummary {
	/// Whether stored flags agree with this summary.
	pub fn agrees_with(&self, has_mismatch: bool, price_spread: f64) -> bool {
		self.has_mismatch == has_mismatch && (self.price_spread - price_spread).abs() < 1e-9
	}
}

/// Two or more distinct prices mean a mismatch with a spread of `max - min`.
///
/// Non-finite prices are ignored.
pub fn price_summary<I>(prices: I) -> PriceSummary
where
	I: IntoIterator<Item = f64>,
{
	let mut bounds: Option<(f64, f64)> = None;

	for price in prices.into_iter().filter(|price| price.is_finite()) {
		bounds = Some(match bounds {
			Some((min, max)) => (min.min(price), max.max(price)),
			None => (price, price),
		});
	}

	match bounds {
		Some((min, max)) if max > min => PriceSummary { has_mismatch: true, price_spread: max - min },
		_ => PriceSummary { has_mismatch: false, price_spread: 0.0 },
	}
}
