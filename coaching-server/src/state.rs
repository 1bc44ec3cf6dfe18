use std::sync::Arc;

use super::{config::Config, sessions::SessionStore};

pub struct State {
    pub config: Config,
    pub sessions: SessionStore,
    pub http: reqwest::Client,
}

impl State {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            sessions: SessionStore::default(),
            http: reqwest::Client::new(),
        })
    }
}
