use axum::http::Method;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Settings;

pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let configured_origins = settings.cors_allowed_origins();

    CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
        .allow_origin(allowed_origins(configured_origins))
}

fn allowed_origins(configured_origins: Vec<String>) -> AllowOrigin {
    if configured_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins = configured_origins
            .into_iter()
            .filter_map(|o| o.parse().ok())
            .collect::<Vec<_>>();
        AllowOrigin::list(origins)
    }
}
