use vitrari::db::DbPool;
use vitrari::models::Id;
use vitrari::models::user::{LoginInput, PublicUser, SignupInput};
use vitrari::services::auth::{AuthService, LoginContext};

/// Registers and logs in a fresh user, returning its public view and a
/// bearer token usable with `TestContext::*_as`.
pub async fn signed_up_user(db: &DbPool, email: &str) -> (PublicUser, String) {
    let auth = AuthService::new(db.clone(), "test-secret");

    let user = auth
        .register(SignupInput {
            email: email.to_owned(),
            password: "correct-horse-battery-staple".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        })
        .await
        .expect("to register test user");

    let outcome = auth
        .login(
            LoginInput {
                email: email.to_owned(),
                password: "correct-horse-battery-staple".to_owned(),
                remember_me: false,
            },
            LoginContext {
                source_address: None,
                user_agent: None,
            },
        )
        .await
        .expect("to log in test user");

    (PublicUser::from(&user), outcome.token)
}

/// Stock sheets have no write endpoint,
/// so tests insert the catalogue row directly.
pub fn insert_stock_sheet(db: &DbPool, width_mm: f64, height_mm: f64, price_per_sqm: f64) -> Id {
    let conn = db.get().expect("to check out a pooled connection");
    conn.execute(
        "INSERT INTO stock_sheets (name, width_mm, height_mm, thickness_mm, price_per_sqm, in_stock, \
         properties_json, created_at, updated_at) VALUES ('Test pane', ?1, ?2, 4.0, ?3, 10, '{}', ?4, ?4)",
        rusqlite::params![width_mm, height_mm, price_per_sqm, chrono::Utc::now().to_rfc3339()],
    )
    .expect("to insert test stock sheet");
    conn.last_insert_rowid()
}
