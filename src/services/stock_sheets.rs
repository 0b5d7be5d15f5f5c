use crate::db::DbPool;
use crate::error::AppError;
use crate::models::stock_sheet::StockSheet;
use crate::models::Id;
use crate::repo::stock_sheets as stock_sheets_repo;

#[derive(Clone)]
pub struct StockSheetService {
    db: DbPool,
}

impl StockSheetService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<StockSheet>, AppError> {
        crate::db::with_conn(&self.db, stock_sheets_repo::list_all).await
    }

    pub async fn get(&self, id: Id) -> Result<StockSheet, AppError> {
        crate::db::with_conn(&self.db, move |conn| {
            stock_sheets_repo::find_by_id(conn, id)?.ok_or(AppError::NotFound)
        })
        .await
    }
}
