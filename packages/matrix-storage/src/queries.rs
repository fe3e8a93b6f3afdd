use std::collections::BTreeMap;

use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};

use crate::{
	Result,
	models::{LocationPrice, LocationRecord, MatrixRecord},
	scan::{MatrixScan, ScanAnchor, ScanOrder},
};

const MATRIX_COLUMNS: &str = "gtin, name, sku, name_key, sku_key, search_tokens, prices_by_location, has_mismatch, price_spread";

#[derive(sqlx::FromRow)]
struct MatrixRow {
	gtin: String,
	name: String,
	sku: String,
	name_key: String,
	sku_key: String,
	search_tokens: Vec<String>,
	prices_by_location: Json<BTreeMap<String, LocationPrice>>,
	has_mismatch: bool,
	price_spread: f64,
}
impl From<MatrixRow> for MatrixRecord {
	fn from(row: MatrixRow) -> Self {
		Self {
			gtin: row.gtin,
			name: row.name,
			sku: row.sku,
			name_key: row.name_key,
			sku_key: row.sku_key,
			search_tokens: row.search_tokens,
			prices_by_location: row.prices_by_location.0,
			has_mismatch: row.has_mismatch,
			price_spread: row.price_spread,
		}
	}
}

pub async fn scan_matrix(pool: &PgPool, scan: &MatrixScan) -> Result<Vec<MatrixRecord>> {
	scan.validate()?;

	let mut builder = build_scan_query(scan);
	let rows: Vec<MatrixRow> = builder.build_query_as().fetch_all(pool).await?;

	Ok(rows.into_iter().map(MatrixRecord::from).collect())
}

pub async fn fetch_matrix_record(pool: &PgPool, gtin: &str) -> Result<Option<MatrixRecord>> {
	let row: Option<MatrixRow> =
		sqlx::query_as(&format!("SELECT {MATRIX_COLUMNS} FROM gtin_matrix WHERE gtin = $1"))
			.bind(gtin)
			.fetch_optional(pool)
			.await?;

	Ok(row.map(MatrixRecord::from))
}

pub async fn list_locations(pool: &PgPool) -> Result<Vec<LocationRecord>> {
	let rows = sqlx::query_as::<_, LocationRecord>(
		"\
SELECT loc_key, merchant_id, merchant_name, location_name
FROM matrix_locations
ORDER BY loc_key",
	)
	.fetch_all(pool)
	.await?;

	Ok(rows)
}

fn build_scan_query(scan: &MatrixScan) -> QueryBuilder<'static, Postgres> {
	let mut builder =
		QueryBuilder::new(format!("SELECT {MATRIX_COLUMNS} FROM gtin_matrix WHERE TRUE"));
	let filter = &scan.filter;

	if let Some(gtin) = filter.gtin.as_ref() {
		builder.push(" AND gtin = ");
		builder.push_bind(gtin.clone());
	}
	if let (Some(prefix), ScanOrder::SearchKey(field)) = (filter.key_prefix.as_ref(), scan.order) {
		builder.push(format!(" AND starts_with({}, ", field.column()));
		builder.push_bind(prefix.clone());
		builder.push(")");
	}
	if let Some(token) = filter.search_token.as_ref() {
		builder.push(" AND ");
		builder.push_bind(token.clone());
		builder.push(" = ANY(search_tokens)");
	}
	if filter.mismatch_only {
		builder.push(" AND has_mismatch = TRUE");
	}

	match (scan.after.as_ref(), scan.order) {
		(Some(ScanAnchor::Gtin(gtin)), _) => {
			builder.push(" AND gtin > ");
			builder.push_bind(gtin.clone());
		},
		(Some(ScanAnchor::SearchKey { key, gtin }), ScanOrder::SearchKey(field)) => {
			builder.push(format!(" AND ({}, gtin) > (", field.column()));
			builder.push_bind(key.clone());
			builder.push(", ");
			builder.push_bind(gtin.clone());
			builder.push(")");
		},
		(Some(ScanAnchor::Spread { spread, gtin }), _) => {
			builder.push(" AND (price_spread < ");
			builder.push_bind(*spread);
			builder.push(" OR (price_spread = ");
			builder.push_bind(*spread);
			builder.push(" AND gtin > ");
			builder.push_bind(gtin.clone());
			builder.push("))");
		},
		_ => {},
	}

	match scan.order {
		ScanOrder::Gtin => builder.push(" ORDER BY gtin ASC"),
		ScanOrder::SearchKey(field) =>
			builder.push(format!(" ORDER BY {} ASC, gtin ASC", field.column())),
		ScanOrder::SpreadDesc => builder.push(" ORDER BY price_spread DESC, gtin ASC"),
	};

	builder.push(" LIMIT ");
	builder.push_bind(i64::from(scan.limit));

	builder
}
