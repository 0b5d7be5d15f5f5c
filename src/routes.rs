use axum::routing::{get, post, put};
use axum::{middleware as axum_middleware, Extension, Router};
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::controllers::{auth, designs, health, optimizations, projects, sheets};
use crate::cors::cors_layer;
use crate::middleware::auth::{optional_auth, require_auth};

/// Builds the full router. Every `/api` route except health and the three
/// public auth endpoints goes through `require_auth`; `GET /api/auth/me` uses
/// `optional_auth` only insofar as the handler itself demands a `User`
/// extension (`require_auth` still applies, see the nested router below).
pub fn routes(ctx: AppContext) -> Router {
    let public_auth = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/verify-email", get(auth::verify_email));

    let authenticated_auth = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route_layer(axum_middleware::from_fn(require_auth));

    let projects_routes = Router::new()
        .route("/projects", get(projects::index).post(projects::create))
        .route(
            "/projects/:id",
            get(projects::show).put(projects::update).delete(projects::delete),
        )
        .route("/projects/:id/designs", get(projects::designs))
        .route("/projects/:id/optimizations", get(projects::optimizations))
        .route_layer(axum_middleware::from_fn(require_auth));

    let designs_routes = Router::new()
        .route("/designs/templates", get(designs::templates))
        .route("/designs", get(designs::index).post(designs::create))
        .route(
            "/designs/:id",
            get(designs::show).put(designs::update).delete(designs::delete),
        )
        .route("/designs/:id/move", put(designs::move_to_project))
        .route("/designs/:id/clone", post(designs::clone_design))
        .route("/designs/:id/validate", post(designs::validate))
        .route_layer(axum_middleware::from_fn(require_auth));

    let optimizations_routes = Router::new()
        .route("/optimize", post(optimizations::optimize))
        .route("/optimizations/compare", post(optimizations::compare))
        .route("/optimizations", get(optimizations::index).post(optimizations::create))
        .route(
            "/optimizations/:id",
            get(optimizations::show).delete(optimizations::delete),
        )
        .route("/optimizations/:id/export", get(optimizations::export))
        .route("/optimizations/:id/statistics", get(optimizations::statistics))
        .route("/optimizations/:id/rerun", post(optimizations::rerun))
        .route_layer(axum_middleware::from_fn(require_auth));

    let sheets_routes = Router::new()
        .route("/sheets", get(sheets::index))
        .route_layer(axum_middleware::from_fn(optional_auth));

    let api = Router::new()
        .route("/health", get(health::check))
        .merge(public_auth)
        .merge(authenticated_auth)
        .merge(projects_routes)
        .merge(designs_routes)
        .merge(optimizations_routes)
        .merge(sheets_routes);

    Router::new().nest("/api", api).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(ConcurrencyLimitLayer::new(256))
            .layer(cors_layer(ctx.settings()))
            .layer(Extension(ctx)),
    )
}
