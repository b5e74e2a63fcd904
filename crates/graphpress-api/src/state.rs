use std::sync::Arc;

use tracing::error;

use graphpress_db::GraphStore;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn GraphStore>,
    pub jwt_secret: String,
}

impl AppStateInner {
    pub fn new(store: Arc<dyn GraphStore>, jwt_secret: impl Into<String>) -> AppState {
        Arc::new(Self {
            store,
            jwt_secret: jwt_secret.into(),
        })
    }

    /// Run blocking store work off the async runtime.
    pub async fn with_store<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn GraphStore) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(e.into())
            })?
    }
}
