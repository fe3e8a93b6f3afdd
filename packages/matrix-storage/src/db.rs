use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
	Result,
	models::{LocationRecord, MatrixRecord},
	queries,
	scan::MatrixScan,
	schema,
	store::{BoxFuture, MatrixStore},
};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &matrix_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 7_120_115;
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}
}

impl MatrixStore for Db {
	fn scan<'a>(&'a self, scan: &'a MatrixScan) -> BoxFuture<'a, Result<Vec<MatrixRecord>>> {
		Box::pin(queries::scan_matrix(&self.pool, scan))
	}

	fn get<'a>(&'a self, gtin: &'a str) -> BoxFuture<'a, Result<Option<MatrixRecord>>> {
		Box::pin(queries::fetch_matrix_record(&self.pool, gtin))
	}

	fn list_locations(&self) -> BoxFuture<'_, Result<Vec<LocationRecord>>> {
		Box::pin(queries::list_locations(&self.pool))
	}
}
