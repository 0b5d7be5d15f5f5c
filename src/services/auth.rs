use chrono::Duration;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::user::{LoginInput, SignupInput, User};
use crate::repo::{sessions as sessions_repo, users as users_repo};

use super::password;
use super::tokens::{opaque_token, BearerTokens};

const LOCKOUT_THRESHOLD: i64 = 5;
const LOCKOUT_MINUTES: i64 = 30;
const SHORT_SESSION_HOURS: i64 = 24;
const REMEMBER_ME_DAYS: i64 = 30;

#[derive(Clone)]
pub struct AuthService {
    db: DbPool,
    tokens: BearerTokens,
}

pub struct LoginOutcome {
    pub user: User,
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub struct LoginContext {
    pub source_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AuthService {
    pub fn new(db: DbPool, jwt_secret: &str) -> Self {
        Self {
            db,
            tokens: BearerTokens::new(jwt_secret),
        }
    }

    fn validate_signup(input: &SignupInput) -> Result<(), AppError> {
        if !input.email.contains('@') || input.email.trim().is_empty() {
            return Err(AppError::Validation("email is not a valid address".into()));
        }
        if input.password.len() < 8 {
            return Err(AppError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }
        Ok(())
    }

    pub async fn register(&self, input: SignupInput) -> Result<User, AppError> {
        Self::validate_signup(&input)?;
        let password_hash = password::hash(&input.password)?;
        let verification_token = opaque_token();

        crate::db::with_conn(&self.db, move |conn| {
            users_repo::insert(
                conn,
                users_repo::NewUserRow {
                    email: &input.email,
                    password_hash: &password_hash,
                    given_name: &input.first_name,
                    family_name: &input.last_name,
                    verified: false,
                    verification_token: Some(&verification_token),
                },
            )
        })
        .await
    }

    /// Registers a user pre-verified, used only by the admin CLI.
    pub async fn register_admin(&self, input: SignupInput) -> Result<User, AppError> {
        Self::validate_signup(&input)?;
        let password_hash = password::hash(&input.password)?;

        crate::db::with_conn(&self.db, move |conn| {
            users_repo::insert(
                conn,
                users_repo::NewUserRow {
                    email: &input.email,
                    password_hash: &password_hash,
                    given_name: &input.first_name,
                    family_name: &input.last_name,
                    verified: true,
                    verification_token: None,
                },
            )
        })
        .await
    }

    pub async fn login(&self, input: LoginInput, ctx: LoginContext) -> Result<LoginOutcome, AppError> {
        let email = input.email.to_lowercase();
        let password = input.password;
        let remember_me = input.remember_me;

        let user = crate::db::with_conn(&self.db, {
            let email = email.clone();
            move |conn| {
                users_repo::find_by_email(conn, &email)?
                    .ok_or_else(|| AppError::Authentication("invalid credentials".into()))
            }
        })
        .await?;

        if user.is_locked(chrono::Utc::now()) {
            return Err(AppError::Locked("account locked".into()));
        }

        if !password::verify(&password, &user.password_hash) {
            let user_id = user.id;
            crate::db::with_conn(&self.db, move |conn| {
                users_repo::record_login_failure(conn, user_id, LOCKOUT_THRESHOLD, LOCKOUT_MINUTES)
            })
            .await?;
            return Err(AppError::Authentication("invalid credentials".into()));
        }

        let user_id = user.id;
        crate::db::with_conn(&self.db, move |conn| users_repo::record_login_success(conn, user_id)).await?;

        let ttl = if remember_me {
            Duration::days(REMEMBER_ME_DAYS)
        } else {
            Duration::hours(SHORT_SESSION_HOURS)
        };

        let (token, expires_at) = self
            .tokens
            .mint(user.id, ttl)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

        let session_id = opaque_token();
        crate::db::with_conn(&self.db, move |conn| {
            sessions_repo::insert(
                conn,
                sessions_repo::NewSessionRow {
                    owner_id: user_id,
                    session_id: &session_id,
                    expires_at,
                    source_address: ctx.source_address.as_deref(),
                    user_agent: ctx.user_agent.as_deref(),
                },
            )
        })
        .await?;

        Ok(LoginOutcome {
            user,
            token,
            expires_at,
        })
    }

    /// Idempotent: an unrecognised or already-expired token is not an error.
    /// The session row is advisory, not the source of truth for
    /// authentication, so logout simply revokes every active session for the
    /// caller the token resolves to.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let Ok(claims) = self.tokens.verify(token) else {
            return Ok(());
        };
        crate::db::with_conn(&self.db, move |conn| {
            sessions_repo::delete_all_for_owner(conn, claims.subject)
        })
        .await
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AppError::Authentication("invalid token".into()))?;

        crate::db::with_conn(&self.db, move |conn| {
            users_repo::find_by_id(conn, claims.subject)?
                .ok_or_else(|| AppError::Authentication("invalid token".into()))
        })
        .await
    }

    /// Never reveals whether the email exists.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        let email = email.to_lowercase();
        let user = crate::db::with_conn(&self.db, {
            let email = email.clone();
            move |conn| users_repo::find_by_email(conn, &email)
        })
        .await?;

        if let Some(user) = user {
            let token = opaque_token();
            let expires_at = chrono::Utc::now() + Duration::hours(1);
            crate::db::with_conn(&self.db, move |conn| {
                users_repo::set_reset_token(conn, user.id, &token, expires_at)
            })
            .await?;
        }

        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        if new_password.len() < 8 {
            return Err(AppError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }

        let token = token.to_owned();
        let user = crate::db::with_conn(&self.db, {
            let token = token.clone();
            move |conn| {
                users_repo::find_by_reset_token(conn, &token)?
                    .ok_or_else(|| AppError::Validation("reset token is invalid or has expired".into()))
            }
        })
        .await?;

        let expired = user
            .reset_token_expires_at
            .map(|exp| exp <= chrono::Utc::now())
            .unwrap_or(true);
        if expired {
            return Err(AppError::Validation(
                "reset token is invalid or has expired".into(),
            ));
        }

        let password_hash = password::hash(new_password)?;
        let user_id = user.id;
        crate::db::with_conn(&self.db, move |conn| users_repo::set_password(conn, user_id, &password_hash)).await?;
        // Invalidate existing sessions.
        crate::db::with_conn(&self.db, move |conn| sessions_repo::delete_all_for_owner(conn, user_id)).await?;

        Ok(())
    }

    pub async fn verify_email(&self, token: &str) -> Result<(), AppError> {
        let token = token.to_owned();
        let user = crate::db::with_conn(&self.db, move |conn| users_repo::find_by_verification_token(conn, &token))
            .await?
            .ok_or_else(|| AppError::Validation("verification token is invalid".into()))?;

        let user_id = user.id;
        crate::db::with_conn(&self.db, move |conn| users_repo::verify_email(conn, user_id)).await
    }
}
