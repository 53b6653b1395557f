//! Route modules for Pecha Server

pub mod health;
pub mod pechas;
pub mod pedurma;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .nest("/api/v1/pedurma", pedurma::router())
        .nest("/api/v1/pechas", pechas::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum_test::TestServer;
    use tempfile::TempDir;

    use crate::config::Config;
    use crate::db;
    use crate::opf::OpfStore;
    use crate::state::AppState;

    /// Test server over a temporary OPF root and an in-memory database
    pub async fn server() -> (TempDir, TestServer) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.opf_root = temp_dir.path().to_path_buf();

        let store = OpfStore::with_local_storage(temp_dir.path().to_path_buf());
        let pool = db::memory_pool().await;
        let state = AppState::new(config, store, pool);

        let server = TestServer::new(super::app(state)).unwrap();
        (temp_dir, server)
    }
}
