use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower::util::ServiceExt;

use vitrari::config::Settings;
use vitrari::context::AppContext;
use vitrari::db::{self, DbPool};
use vitrari::routes::routes;

/// Creates a `TestContext` with its own in-memory database and a fully
/// wired router, the way each test needs one.
macro_rules! test_context {
    () => {
        crate::support::context::TestContext::new()
    };
}

pub(crate) use test_context;

fn test_settings() -> &'static Settings {
    // Settings::validate only rejects the default JWT secret in production,
    // and tests run under the default (development) environment, so the
    // struct can be built directly without touching the environment.
    let settings = Settings {
        port: 0,
        db_path: ":memory:".to_owned(),
        jwt_secret: "test-secret".to_owned(),
        log_level: "error".to_owned(),
        admin_domains: "vitrari.com".to_owned(),
        request_timeout_secs: 30,
        optimize_timeout_secs: 5,
        cors_allowed_origins: "*".to_owned(),
    };
    Box::leak(Box::new(settings))
}

pub struct TestContext {
    pub db: DbPool,
    app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let db = db::open_test_pool().expect("to open an in-memory test database");
        let ctx = AppContext::new(db.clone(), test_settings());
        let app = routes(ctx);
        Self { db, app }
    }

    pub async fn get(&self, path: &str) -> Response {
        self.request(Method::GET, path, Body::empty(), None).await
    }

    pub async fn get_as(&self, path: &str, token: &str) -> Response {
        self.request(Method::GET, path, Body::empty(), Some(token)).await
    }

    pub async fn post<P: Serialize + ?Sized>(&self, path: &str, body: &P) -> Response {
        self.request(Method::POST, path, json_body(body), None).await
    }

    pub async fn post_as<P: Serialize + ?Sized>(&self, path: &str, body: &P, token: &str) -> Response {
        self.request(Method::POST, path, json_body(body), Some(token)).await
    }

    pub async fn put_as<P: Serialize + ?Sized>(&self, path: &str, body: &P, token: &str) -> Response {
        self.request(Method::PUT, path, json_body(body), Some(token)).await
    }

    pub async fn delete_as(&self, path: &str, token: &str) -> Response {
        self.request(Method::DELETE, path, Body::empty(), Some(token)).await
    }

    async fn request(&self, method: Method, path: &str, body: Body, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(path).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = builder.body(body).expect("to build request");

        self.app.clone().oneshot(req).await.expect("router to always respond")
    }
}

fn json_body<P: Serialize + ?Sized>(body: &P) -> Body {
    Body::from(serde_json::to_vec(body).expect("to serialize request body"))
}

pub async fn json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("to read response body");
    serde_json::from_slice(&bytes).expect("response body to deserialize")
}
