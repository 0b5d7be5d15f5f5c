use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::context::AppContext;
use crate::error::AppError;
use crate::models::user::User;

const AUTH_COOKIE_NAME: &str = "auth_token";

/// Caller extraction order: cookie, then bearer header, then query
/// parameter.
pub(crate) fn extract_token(req: &Request) -> Option<String> {
    let jar = CookieJar::from_headers(req.headers());
    if let Some(cookie) = jar.get(AUTH_COOKIE_NAME) {
        return Some(cookie.value().to_owned());
    }

    if let Some(header_value) = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = header_value.strip_prefix("Bearer ") {
            return Some(token.to_owned());
        }
    }

    req.uri().query().and_then(|query| {
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == "token").then(|| value.to_owned())
        })
    })
}

/// Whether this request expects a JSON error body rather than an HTML
/// redirect on auth failure: an `/api` path, an `Accept` header that
/// prefers JSON over HTML, a JSON `Content-Type`, or the conventional AJAX
/// marker header.
fn is_api_shaped(req: &Request) -> bool {
    if req.uri().path().starts_with("/api") {
        return true;
    }

    let headers = req.headers();

    if let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
        if accept.contains("application/json") && !accept.contains("text/html") {
            return true;
        }
    }

    if let Some(content_type) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        if content_type.starts_with("application/json") {
            return true;
        }
    }

    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
        .unwrap_or(false)
}

fn short_circuit(req: &Request, api_error: AppError) -> Response {
    if is_api_shaped(req) {
        api_error.into_response()
    } else {
        Redirect::to("/auth").into_response()
    }
}

fn context_of(req: &Request) -> AppContext {
    req.extensions()
        .get::<AppContext>()
        .cloned()
        .expect("AppContext extension layer must run before the auth middleware")
}

/// Resolves the caller and attaches it to the request, or short-circuits with
/// a JSON 401 or a redirect to `/auth` depending on request shape.
pub async fn require_auth(mut req: Request, next: Next) -> Response {
    let ctx = context_of(&req);

    let user = match extract_token(&req) {
        Some(token) => ctx.auth().validate_token(&token).await.ok(),
        None => None,
    };

    match user {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => short_circuit(&req, AppError::Authentication("authentication required".into())),
    }
}

/// Attaches the caller when a valid token is present; never short-circuits.
pub async fn optional_auth(mut req: Request, next: Next) -> Response {
    let ctx = context_of(&req);

    if let Some(token) = extract_token(&req) {
        if let Ok(user) = ctx.auth().validate_token(&token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}

/// Must run after `require_auth` so a `User` is already attached. Asserts the
/// caller's email domain is in the admin allowlist.
pub async fn require_admin(req: Request, next: Next) -> Response {
    let ctx = context_of(&req);

    let Some(user) = req.extensions().get::<User>().cloned() else {
        return short_circuit(&req, AppError::Authentication("authentication required".into()));
    };

    let domain = user.email.rsplit_once('@').map(|(_, domain)| domain.to_lowercase());
    let allowed = domain
        .map(|d| ctx.settings().admin_domain_list().contains(&d))
        .unwrap_or(false);

    if !allowed {
        return short_circuit(&req, AppError::Authorization);
    }

    next.run(req).await
}
