use crate::support::test_context;

#[tokio::test]
async fn health_check_reports_ok() {
    let t = test_context!();

    let response = t.get("/api/health").await;

    assert!(response.status().is_success());
}
