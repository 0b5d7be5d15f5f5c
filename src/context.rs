use crate::config::Settings;
use crate::db::DbPool;
use crate::services::auth::AuthService;
use crate::services::designs::DesignService;
use crate::services::optimizations::OptimizationService;
use crate::services::projects::ProjectService;
use crate::services::stock_sheets::StockSheetService;

/// Everything a handler needs, injected via `axum::Extension`. Cloning is
/// cheap: the pool and every service hold only a pooled-connection handle or
/// a reference, never the database itself.
#[derive(Clone)]
pub struct AppContext {
    db: DbPool,
    settings: &'static Settings,
    auth: AuthService,
    projects: ProjectService,
    designs: DesignService,
    optimizations: OptimizationService,
    stock_sheets: StockSheetService,
}

impl AppContext {
    pub fn new(db: DbPool, settings: &'static Settings) -> Self {
        let auth = AuthService::new(db.clone(), &settings.jwt_secret);
        let projects = ProjectService::new(db.clone());
        let designs = DesignService::new(db.clone());
        let optimizations = OptimizationService::new(db.clone(), settings.optimize_timeout());
        let stock_sheets = StockSheetService::new(db.clone());

        Self {
            db,
            settings,
            auth,
            projects,
            designs,
            optimizations,
            stock_sheets,
        }
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }

    pub fn settings(&self) -> &'static Settings {
        self.settings
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn projects(&self) -> &ProjectService {
        &self.projects
    }

    pub fn designs(&self) -> &DesignService {
        &self.designs
    }

    pub fn optimizations(&self) -> &OptimizationService {
        &self.optimizations
    }

    pub fn stock_sheets(&self) -> &StockSheetService {
        &self.stock_sheets
    }
}
