use std::sync::Arc;

use cache::KvStore;
use completion::CompletionClient;
use config::Config;

pub mod cache;
pub mod completion;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod utils;

pub use router::create_router;

/// 应用状态，启动时构造一次，通过 axum `State` 注入到各个 handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn KvStore>,
    pub completion: Arc<CompletionClient>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KvStore>, completion: CompletionClient) -> Self {
        Self {
            config: Arc::new(config),
            store,
            completion: Arc::new(completion),
        }
    }
}
