use std::sync::Arc;

use matrix_config::Config;
use matrix_service::MatrixService;
use matrix_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MatrixService>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(MatrixService::new(config, Arc::new(db))))
	}

	pub fn from_service(service: MatrixService) -> Self {
		Self { service: Arc::new(service) }
	}
}
