use axum::extract::Extension;
use axum::Json;

use crate::context::AppContext;
use crate::error::AppError;
use crate::models::stock_sheet::StockSheet;

pub async fn index(Extension(ctx): Extension<AppContext>) -> Result<Json<Vec<StockSheet>>, AppError> {
    let sheets = ctx.stock_sheets().list().await?;
    Ok(Json(sheets))
}
