use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::AppError;
use crate::models::design::Design;
use crate::models::optimization::Optimization;
use crate::models::project::{NewProject, Paging, UpdateProject};
use crate::models::user::User;
use crate::models::Id;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    tree: bool,
    #[serde(flatten)]
    paging: Paging,
}

pub async fn index(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    if query.tree {
        let tree = ctx.projects().tree(user.id).await?;
        return Ok(Json(tree).into_response());
    }

    let projects = ctx.projects().list(user.id, query.paging).await?;
    Ok(Json(projects).into_response())
}

pub async fn create(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Json(input): Json<NewProject>,
) -> Result<impl IntoResponse, AppError> {
    let project = ctx.projects().create(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn show(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, AppError> {
    let project = ctx.projects().get(id, user.id).await?;
    Ok(Json(project))
}

pub async fn update(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateProject>,
) -> Result<impl IntoResponse, AppError> {
    let project = ctx.projects().update(id, user.id, input).await?;
    Ok(Json(project))
}

pub async fn delete(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, AppError> {
    ctx.projects().delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn designs(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<Design>>, AppError> {
    let designs = ctx.designs().list_for_project(id, user.id).await?;
    Ok(Json(designs))
}

pub async fn optimizations(
    Extension(ctx): Extension<AppContext>,
    Extension(user): Extension<User>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<Optimization>>, AppError> {
    let optimizations = ctx.optimizations().list_for_project(id, user.id).await?;
    Ok(Json(optimizations))
}
