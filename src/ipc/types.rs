use crate::api::Transport;
use crate::config::ClientConfig;
use crate::storage::StorageState;
use crate::store::Store;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub config: ClientConfig,
    pub storage: StorageState,
    pub store: Store,
    pub transport: Box<dyn Transport>,
}

impl AppState {
    pub fn new(config: ClientConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            workspace: None,
            config,
            storage: StorageState::default(),
            store: Store::new(),
            transport,
        }
    }
}
