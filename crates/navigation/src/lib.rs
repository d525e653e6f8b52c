pub mod errors;
pub mod handlers;
pub mod request_id;

use std::sync::Arc;

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use seed_data::{db::Seeder, models::Dataset, store::SeedBackend};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

use crate::{
    handlers::{SeedContext, health_check, seed_navigation},
    request_id::request_id_middleware,
};

pub fn create_router<B>(seeder: Seeder<B>, dataset: Dataset) -> Router
where
    B: SeedBackend + Clone + 'static,
{
    let ctx = SeedContext {
        seeder,
        dataset: Arc::new(dataset),
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/seed", get(seed_navigation::<B>))
        .layer(Extension(ctx))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

pub async fn run_server<B>(seeder: Seeder<B>, dataset: Dataset, port: u16) -> anyhow::Result<()>
where
    B: SeedBackend + Clone + 'static,
{
    let app = create_router(seeder, dataset);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    tracing::info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
