use std::sync::Arc;

use crate::config::AppConfig;
use crate::global_session_manager::GlobalSessionManager;
use crate::models::report_index::ReportIndex;
use crate::services::llm_service::{AzureOpenAiClient, LlmError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub index: Arc<ReportIndex>,
    pub client: Arc<AzureOpenAiClient>,
    pub session_manager: GlobalSessionManager,
}

impl AppState {
    pub fn new(config: AppConfig, index: ReportIndex) -> Result<Self, LlmError> {
        let config = Arc::new(config);
        let client = Arc::new(AzureOpenAiClient::new(config.clone())?);
        Ok(AppState {
            config,
            index: Arc::new(index),
            client,
            session_manager: GlobalSessionManager::new(),
        })
    }
}
