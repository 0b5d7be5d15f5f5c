use serde_json::json;

use crate::support::context::json;
use crate::support::test_context;

#[tokio::test]
async fn signup_then_login_then_me_round_trips_the_caller() {
    let t = test_context!();

    let signup = t
        .post(
            "/api/auth/signup",
            &json!({
                "email": "nadia@example.com",
                "password": "correct-horse-battery-staple",
                "firstName": "Nadia",
                "lastName": "Volkov",
            }),
        )
        .await;
    assert_eq!(201, signup.status().as_u16());

    let login = t
        .post(
            "/api/auth/login",
            &json!({
                "email": "nadia@example.com",
                "password": "correct-horse-battery-staple",
                "rememberMe": false,
            }),
        )
        .await;
    assert_eq!(200, login.status().as_u16());

    let login_body: serde_json::Value = json(login).await;
    let token = login_body["token"].as_str().expect("token in login response").to_owned();
    assert!(login_body["expires_at"].as_i64().unwrap() > 0);

    let me = t.get_as("/api/auth/me", &token).await;
    assert_eq!(200, me.status().as_u16());
    let me_body: serde_json::Value = json(me).await;
    assert_eq!("nadia@example.com", me_body["email"]);
}

#[tokio::test]
async fn signup_rejects_a_duplicate_email() {
    let t = test_context!();
    let payload = json!({
        "email": "dup@example.com",
        "password": "correct-horse-battery-staple",
        "firstName": "A",
        "lastName": "B",
    });

    let first = t.post("/api/auth/signup", &payload).await;
    assert_eq!(201, first.status().as_u16());

    let second = t.post("/api/auth/signup", &payload).await;
    assert_eq!(409, second.status().as_u16());
}

#[tokio::test]
async fn five_failed_logins_lock_the_account() {
    let t = test_context!();
    t.post(
        "/api/auth/signup",
        &json!({
            "email": "lockout@example.com",
            "password": "correct-horse-battery-staple",
            "firstName": "Lock",
            "lastName": "Out",
        }),
    )
    .await;

    let bad_login = json!({
        "email": "lockout@example.com",
        "password": "wrong-password",
        "rememberMe": false,
    });

    for _ in 0..5 {
        let response = t.post("/api/auth/login", &bad_login).await;
        assert_eq!(401, response.status().as_u16());
    }

    let good_login = json!({
        "email": "lockout@example.com",
        "password": "correct-horse-battery-staple",
        "rememberMe": false,
    });
    let locked_response = t.post("/api/auth/login", &good_login).await;
    assert_eq!(423, locked_response.status().as_u16());
}

#[tokio::test]
async fn an_unauthenticated_request_is_rejected() {
    let t = test_context!();

    let response = t.get("/api/auth/me").await;

    assert_eq!(401, response.status().as_u16());
}
