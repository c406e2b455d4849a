use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Config;
use crate::store::Store;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub auth: Arc<AuthService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<Store>, auth: Arc<AuthService>, config: Config) -> Self {
        Self {
            store,
            auth,
            config: Arc::new(config),
        }
    }
}
