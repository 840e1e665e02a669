use std::sync::Arc;

use reqwest::Client;

use crate::config::AppConfig;
use marginalia_infra::api::ApiClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http_client: Client,
}

impl AppState {
    pub fn api_client(&self, viewer: Option<i64>) -> ApiClient {
        ApiClient::new(self.http_client.clone(), &self.config.api_url).with_viewer(viewer)
    }
}
