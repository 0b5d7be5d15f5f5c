use std::time::Duration;

use rand::RngCore;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::nesting::{NestingRequest, PieceRequest};
use crate::models::optimization::{
    CompareOptimizationsRequest, Optimization, OptimizationComparison, RerunOptimizationRequest,
    RunOptimizationRequest,
};
use crate::models::optimization::ExportFormat;
use crate::models::Id;
use crate::repo::{designs as designs_repo, optimizations as optimizations_repo, stock_sheets as stock_sheets_repo};

use super::{export, nesting};

#[derive(Clone)]
pub struct OptimizationService {
    db: DbPool,
    optimize_timeout: Duration,
}

/// Price conversion constant: `price_per_sqm` is quoted per square metre, but
/// geometry throughout this service is in millimetres.
const MM2_PER_M2: f64 = 1_000_000.0;

impl OptimizationService {
    pub fn new(db: DbPool, optimize_timeout: Duration) -> Self {
        Self { db, optimize_timeout }
    }

    fn random_seed() -> u64 {
        rand::rngs::OsRng.next_u64()
    }

    async fn resolve_pieces(&self, owner_id: Id, items: &[crate::models::optimization::OptimizationDesignItem]) -> Result<Vec<PieceRequest>, AppError> {
        let mut pieces = Vec::with_capacity(items.len());
        for item in items {
            let (width, height, label) = match (item.override_width_mm, item.override_height_mm) {
                (Some(w), Some(h)) => (w, h, item.override_name.clone()),
                _ => {
                    let design_id = item
                        .design_id
                        .ok_or_else(|| AppError::Validation("design_id is required unless both overrides are set".into()))?;
                    let design = {
                        let db = self.db.clone();
                        crate::db::with_conn(&db, move |conn| {
                            designs_repo::find_by_id_for_owner(conn, design_id, owner_id)?.ok_or(AppError::NotFound)
                        })
                        .await?
                    };
                    (
                        item.override_width_mm.unwrap_or(design.width_mm),
                        item.override_height_mm.unwrap_or(design.height_mm),
                        item.override_name.clone().or(Some(design.name)),
                    )
                }
            };

            pieces.push(PieceRequest {
                design_id: item.design_id,
                width,
                height,
                quantity: item.quantity,
                priority: item.priority,
                label,
            });
        }
        Ok(pieces)
    }

    pub async fn run(&self, owner_id: Id, input: RunOptimizationRequest) -> Result<Optimization, AppError> {
        let sheet = {
            let sheet_id = input.sheet_id;
            crate::db::with_conn(&self.db, move |conn| {
                stock_sheets_repo::find_by_id(conn, sheet_id)?.ok_or(AppError::NotFound)
            })
            .await?
        };

        let pieces = self.resolve_pieces(owner_id, &input.design_items).await?;

        let request = NestingRequest {
            sheet_width: sheet.width_mm,
            sheet_height: sheet.height_mm,
            pieces,
            algorithm: input.algorithm,
            options: input.options.clone(),
        };

        let result = nesting::solve(&request, self.optimize_timeout, Self::random_seed())?;

        let total_area_mm2 = sheet.area_mm2();
        let used_area_mm2 = total_area_mm2 * result.layout.stats.utilization;
        let waste_pct = result.layout.stats.waste * 100.0;
        let total_cost = (total_area_mm2 / MM2_PER_M2) * sheet.price_per_sqm;

        crate::db::with_conn(&self.db, move |conn| {
            optimizations_repo::insert(
                conn,
                owner_id,
                optimizations_repo::NewOptimizationRow {
                    project_id: input.project_id,
                    name: &input.name,
                    sheet_id: input.sheet_id,
                    design_items: &input.design_items,
                    algorithm: input.algorithm,
                    options: &input.options,
                    layout: &result.layout,
                    total_area_mm2,
                    used_area_mm2,
                    waste_pct,
                    total_cost,
                    execution_ms: result.execution_ms as i64,
                },
            )
        })
        .await
    }

    pub async fn get(&self, id: Id, owner_id: Id) -> Result<Optimization, AppError> {
        crate::db::with_conn(&self.db, move |conn| {
            optimizations_repo::find_by_id_for_owner(conn, id, owner_id)?.ok_or(AppError::NotFound)
        })
        .await
    }

    pub async fn list(&self, owner_id: Id) -> Result<Vec<Optimization>, AppError> {
        crate::db::with_conn(&self.db, move |conn| optimizations_repo::list_for_owner(conn, owner_id)).await
    }

    pub async fn list_for_project(&self, project_id: Id, owner_id: Id) -> Result<Vec<Optimization>, AppError> {
        crate::db::with_conn(&self.db, move |conn| {
            optimizations_repo::list_for_project(conn, project_id, owner_id)
        })
        .await
    }

    /// Re-runs an existing optimisation with optionally overridden name,
    /// algorithm, or options, always creating a fresh record rather than
    /// mutating the original.
    pub async fn rerun(&self, id: Id, owner_id: Id, input: RerunOptimizationRequest) -> Result<Optimization, AppError> {
        let existing = self.get(id, owner_id).await?;

        let run_request = RunOptimizationRequest {
            project_id: existing.project_id,
            name: input.name.unwrap_or_else(|| format!("{} (rerun)", existing.name)),
            sheet_id: existing.sheet_id,
            design_items: existing.design_items,
            algorithm: input.algorithm.unwrap_or(existing.algorithm),
            options: input.options.unwrap_or(existing.options),
        };

        self.run(owner_id, run_request).await
    }

    pub async fn compare(&self, owner_id: Id, input: CompareOptimizationsRequest) -> Result<OptimizationComparison, AppError> {
        if input.optimization_ids.is_empty() {
            return Err(AppError::Validation("optimization_ids must not be empty".into()));
        }

        let mut optimizations = Vec::with_capacity(input.optimization_ids.len());
        for id in input.optimization_ids {
            optimizations.push(self.get(id, owner_id).await?);
        }

        let best_by_utilization = optimizations
            .iter()
            .max_by(|a, b| a.layout.stats.utilization.partial_cmp(&b.layout.stats.utilization).unwrap())
            .map(|o| o.id);

        let best_by_waste = optimizations
            .iter()
            .min_by(|a, b| a.waste_pct.partial_cmp(&b.waste_pct).unwrap())
            .map(|o| o.id);

        Ok(OptimizationComparison {
            optimizations,
            best_by_utilization,
            best_by_waste,
        })
    }

    /// Renders a stored optimisation as json, svg, dxf, or a cutting list.
    /// JSON and the cutting list serialise data the caller already has; SVG and
    /// DXF are produced from the same `Layout` so all four stay consistent.
    pub async fn export(&self, id: Id, owner_id: Id, format: ExportFormat) -> Result<(String, &'static str), AppError> {
        let optimization = self.get(id, owner_id).await?;

        let body = match format {
            ExportFormat::Json => (export::optimization_json(&optimization)?, "application/json"),
            ExportFormat::Svg => (export::to_svg(&optimization.layout), "image/svg+xml"),
            ExportFormat::Dxf => (export::to_dxf(&optimization.layout), "application/dxf"),
            ExportFormat::CuttingList => (
                serde_json::to_string_pretty(&export::cutting_list(&optimization.layout))?,
                "application/json",
            ),
        };

        Ok(body)
    }

    pub async fn delete(&self, id: Id, owner_id: Id) -> Result<(), AppError> {
        crate::db::with_conn(&self.db, move |conn| optimizations_repo::delete(conn, id, owner_id))
            .await
            .and_then(|deleted| if deleted { Ok(()) } else { Err(AppError::NotFound) })
    }
}
