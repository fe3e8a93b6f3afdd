pub mod fixtures;
pub mod memory;

mod error;

pub use error::{Error, Result};
pub use memory::MemoryStore;

use std::{env, str::FromStr};

use sqlx::{
	ConnectOptions, Connection, Executor, PgPool,
	postgres::{PgConnectOptions, PgConnection},
	types::Json,
};
use uuid::Uuid;

use matrix_storage::models::{LocationRecord, MatrixRecord};

const DSN_VAR: &str = "MATRIX_PG_DSN";
const MAINTENANCE_DATABASE: &str = "postgres";

/// A scratch database for one ignored integration test. Call [`TestDatabase::cleanup`] when done.
pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let db = Self::plan(base_dsn)?;
		let mut conn = PgConnection::connect_with(&db.maintenance).await?;

		conn.execute(format!(r#"CREATE DATABASE "{}""#, db.name).as_str()).await?;
		conn.close().await?;

		Ok(db)
	}

	fn plan(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Failed to parse {DSN_VAR}: {err}.")))?;
		let name = format!("matrix_test_{}", Uuid::new_v4().simple());
		let maintenance = base.clone().database(MAINTENANCE_DATABASE);
		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Drops the database, disconnecting any pool still attached to it.
	pub async fn cleanup(self) -> Result<()> {
		let mut conn = PgConnection::connect_with(&self.maintenance).await?;

		conn.execute(format!(r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE)"#, self.name).as_str())
			.await?;
		conn.close().await?;

		Ok(())
	}
}

/// The base DSN for ignored Postgres tests, if one is configured.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_VAR).ok().filter(|dsn| !dsn.trim().is_empty())
}

/// Writes records and locations the way the external ingestion job would.
pub async fn seed(
	pool: &PgPool,
	records: &[MatrixRecord],
	locations: &[LocationRecord],
) -> Result<()> {
	for record in records {
		sqlx::query(
			"\
INSERT INTO gtin_matrix (
	gtin,
	name,
	sku,
	name_key,
	sku_key,
	search_tokens,
	prices_by_location,
	has_mismatch,
	price_spread
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
		)
		.bind(record.gtin.as_str())
		.bind(record.name.as_str())
		.bind(record.sku.as_str())
		.bind(record.name_key.as_str())
		.bind(record.sku_key.as_str())
		.bind(&record.search_tokens)
		.bind(Json(&record.prices_by_location))
		.bind(record.has_mismatch)
		.bind(record.price_spread)
		.execute(pool)
		.await?;
	}

	for location in locations {
		sqlx::query(
			"\
INSERT INTO matrix_locations (loc_key, merchant_id, merchant_name, location_name)
VALUES ($1, $2, $3, $4)",
		)
		.bind(location.loc_key.as_str())
		.bind(location.merchant_id.as_deref())
		.bind(location.merchant_name.as_deref())
		.bind(location.location_name.as_deref())
		.execute(pool)
		.await?;
	}

	Ok(())
}
