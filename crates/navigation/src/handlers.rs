//! HTTP request handlers for the navigation API.

use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode};
use seed_data::db::{SeedSummary, Seeder};
use seed_data::models::Dataset;
use seed_data::store::SeedBackend;
use serde::Serialize;

use crate::errors::AppError;

pub const SEED_SUCCESS_MESSAGE: &str = "Navigation database seeded successfully";

/// Seeder and dataset shared by every seed request.
pub struct SeedContext<B> {
    pub seeder: Seeder<B>,
    pub dataset: Arc<Dataset>,
}

impl<B: Clone> Clone for SeedContext<B> {
    fn clone(&self) -> Self {
        Self {
            seeder: self.seeder.clone(),
            dataset: Arc::clone(&self.dataset),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub summary: SeedSummary,
}

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Seed the navigation tables in one transaction.
pub async fn seed_navigation<B>(
    Extension(ctx): Extension<SeedContext<B>>,
) -> Result<Json<SeedResponse>, AppError>
where
    B: SeedBackend + Clone + 'static,
{
    let summary = ctx.seeder.run(&ctx.dataset).await?;

    Ok(Json(SeedResponse {
        message: SEED_SUCCESS_MESSAGE.to_string(),
        summary,
    }))
}
