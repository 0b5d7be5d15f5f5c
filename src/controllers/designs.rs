use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::AppError;
use crate::models::design::{DesignTemplate, MoveDesign, NewDesign, UpdateDesign};
use crate::models::elements::Elements;
use crate::models::user::User;
use crate::models::Id;
use crate::services::designs::DesignService;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

pub async fn index(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let designs = match query.q {
        Some(q) if !q.trim().is_empty() => ctx.designs().search(user.id, q).await?,
        _ => ctx.designs().list(user.id).await?,
    };
    Ok(Json(designs))
}

pub async fn create(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Json(input): Json<NewDesign>,
) -> Result<impl IntoResponse, AppError> {
    let design = ctx.designs().create(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(design)))
}

pub async fn show(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, AppError> {
    let design = ctx.designs().get(id, user.id).await?;
    Ok(Json(design))
}

pub async fn update(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateDesign>,
) -> Result<impl IntoResponse, AppError> {
    let design = ctx.designs().update(id, user.id, input).await?;
    Ok(Json(design))
}

pub async fn delete(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, AppError> {
    ctx.designs().delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_to_project(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
    Json(input): Json<MoveDesign>,
) -> Result<impl IntoResponse, AppError> {
    let design = ctx.designs().move_to_project(id, user.id, input).await?;
    Ok(Json(design))
}

pub async fn clone_design(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, AppError> {
    let design = ctx.designs().clone_design(id, user.id).await?;
    Ok((StatusCode::CREATED, Json(design)))
}

#[derive(Debug, Deserialize)]
pub struct ValidateDesignRequest {
    width_mm: f64,
    height_mm: f64,
    thickness_mm: f64,
    #[serde(default)]
    elements: Elements,
}

pub async fn validate(
    Extension(_ctx): Extension<AppContext>,
    Extension(_user): Extension<User>,
    Path(_id): Path<Id>,
    Json(input): Json<ValidateDesignRequest>,
) -> Result<impl IntoResponse, AppError> {
    DesignService::validate(input.width_mm, input.height_mm, input.thickness_mm, &input.elements)?;
    Ok(StatusCode::OK)
}

pub async fn templates() -> Json<Vec<DesignTemplate>> {
    Json(DesignService::templates())
}
