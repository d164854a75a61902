// src/state.rs

use std::sync::Arc;

use crate::backend::ProductBackend;
use crate::config::AppConfig;
use crate::file_handler::FileHandler;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub file_handler: FileHandler,
    pub backend: Arc<dyn ProductBackend>,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Arc<dyn ProductBackend>) -> Self {
        let file_handler = FileHandler::new(config.upload_session_ttl);
        AppState {
            config: Arc::new(config),
            file_handler,
            backend,
        }
    }
}
