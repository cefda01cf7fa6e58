//! Local mock of the managed backend.
//!
//! Serves the GraphQL note operations and the object storage routes from
//! memory, so the client can be developed and tested without the cloud
//! services.

mod backend;
mod handlers;
mod middleware;

use std::net::SocketAddr;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use backend::{BackendError, MockBackend, StoredBlob, DEFAULT_PAGE_SIZE};
pub use handlers::MAX_EXPIRY_SECS;
pub use middleware::SecurityConfig;

pub fn create_router(backend: MockBackend) -> Router {
    create_router_with_security(backend, SecurityConfig::from_env())
}

pub fn create_router_with_security(backend: MockBackend, security: SecurityConfig) -> Router {
    let protected = Router::new()
        .route("/graphql", post(handlers::graphql))
        .route(
            "/storage/{key}",
            put(handlers::put_blob).delete(handlers::delete_blob),
        )
        .route("/storage/{key}/url", get(handlers::signed_url))
        .route_layer(from_fn_with_state(security, middleware::auth_middleware));

    // Display URLs must be fetchable without credentials.
    let public = Router::new()
        .route("/storage/{key}", get(handlers::get_blob))
        .route("/health", get(handlers::health));

    protected
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(backend)
}

/// Run the mock server until the process is stopped.
pub async fn serve(backend: MockBackend, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(backend);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Mock backend listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
