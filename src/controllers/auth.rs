use axum::extract::{Extension, Query, Request};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::config::app_env;
use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::auth::extract_token;
use crate::models::user::{ForgotPasswordInput, LoginInput, PublicUser, ResetPasswordInput, SignupInput, User};
use crate::services::auth::LoginContext;

const AUTH_COOKIE_NAME: &str = "auth_token";

#[derive(Debug, Serialize)]
struct LoginBody {
    user: PublicUser,
    token: String,
    expires_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    token: String,
}

pub async fn signup(
    Extension(ctx): Extension<AppContext>,
    Json(input): Json<SignupInput>,
) -> Result<impl IntoResponse, AppError> {
    let user = ctx.auth().register(input).await?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

pub async fn login(
    Extension(ctx): Extension<AppContext>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, AppError> {
    let remember_me = input.remember_me;
    let outcome = ctx
        .auth()
        .login(
            input,
            LoginContext {
                source_address: None,
                user_agent: None,
            },
        )
        .await?;

    let max_age = if remember_me {
        time::Duration::days(30)
    } else {
        time::Duration::hours(24)
    };

    let mut cookie = Cookie::new(AUTH_COOKIE_NAME, outcome.token.clone());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_secure(app_env().is_production());
    cookie.set_max_age(max_age);

    let jar = jar.add(cookie);
    let body = LoginBody {
        user: PublicUser::from(&outcome.user),
        token: outcome.token,
        expires_at: outcome.expires_at.timestamp(),
    };

    Ok((jar, Json(body)))
}

pub async fn logout(
    Extension(ctx): Extension<AppContext>,
    jar: CookieJar,
    req: Request,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = extract_token(&req) {
        ctx.auth().logout(&token).await?;
    }

    let jar = jar.remove(Cookie::from(AUTH_COOKIE_NAME));
    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn me(Extension(user): Extension<User>) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

pub async fn forgot_password(
    Extension(ctx): Extension<AppContext>,
    Json(input): Json<ForgotPasswordInput>,
) -> Result<impl IntoResponse, AppError> {
    ctx.auth().request_password_reset(&input.email).await?;
    Ok(StatusCode::OK)
}

pub async fn reset_password(
    Extension(ctx): Extension<AppContext>,
    Json(input): Json<ResetPasswordInput>,
) -> Result<impl IntoResponse, AppError> {
    ctx.auth().reset_password(&input.token, &input.password).await?;
    Ok(StatusCode::OK)
}

pub async fn verify_email(
    Extension(ctx): Extension<AppContext>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    ctx.auth().verify_email(&query.token).await?;
    Ok(StatusCode::OK)
}
