use axum::extract::{Extension, Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::AppError;
use crate::models::nesting::NestingRequest;
use crate::models::optimization::{
    CompareOptimizationsRequest, ExportFormat, RerunOptimizationRequest, RunOptimizationRequest,
};
use crate::models::user::User;
use crate::models::Id;
use crate::services::nesting;

pub async fn index(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let optimizations = ctx.optimizations().list(user.id).await?;
    Ok(Json(optimizations))
}

pub async fn create(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Json(input): Json<RunOptimizationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let optimization = ctx.optimizations().run(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(optimization)))
}

pub async fn show(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, AppError> {
    let optimization = ctx.optimizations().get(id, user.id).await?;
    Ok(Json(optimization))
}

pub async fn delete(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, AppError> {
    ctx.optimizations().delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn statistics(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, AppError> {
    let optimization = ctx.optimizations().get(id, user.id).await?;
    Ok(Json(optimization.layout.stats))
}

pub async fn rerun(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
    Json(input): Json<RerunOptimizationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let optimization = ctx.optimizations().rerun(id, user.id, input).await?;
    Ok((StatusCode::CREATED, Json(optimization)))
}

pub async fn compare(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Json(input): Json<CompareOptimizationsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comparison = ctx.optimizations().compare(user.id, input).await?;
    Ok(Json(comparison))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    format: ExportFormat,
}

pub async fn export(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (body, content_type) = ctx.optimizations().export(id, user.id, query.format).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], body))
}

/// Ad-hoc, non-persisted run: calls the nesting
/// engine directly with a caller-supplied sheet size, skipping both the stock
/// sheet catalogue and the `optimizations` table entirely.
pub async fn optimize(
    Extension(ctx): Extension<AppContext>,
    Extension(_user): Extension<User>,
    Json(request): Json<NestingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let seed = rand::random();
    let timeout = ctx.settings().optimize_timeout();
    let result = nesting::solve(&request, timeout, seed)?;
    Ok(Json(result))
}
