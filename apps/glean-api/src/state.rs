use std::sync::Arc;

use glean_service::GleanService;
use glean_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<GleanService>,
}
impl AppState {
	pub async fn new(config: glean_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = GleanService::new(config, Arc::new(db));

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: GleanService) -> Self {
		Self { service: Arc::new(service) }
	}
}
