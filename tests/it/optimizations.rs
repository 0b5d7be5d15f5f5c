use serde_json::json;

use crate::support::context::json;
use crate::support::factory;
use crate::support::test_context;

#[tokio::test]
async fn running_an_optimization_persists_a_layout_and_statistics() {
    let t = test_context!();
    let (_user, token) = factory::signed_up_user(&t.db, "glazier@example.com").await;
    let sheet_id = factory::insert_stock_sheet(&t.db, 1000.0, 1000.0, 45.0);

    let request = json!({
        "name": "Morning run",
        "sheet_id": sheet_id,
        "design_items": [
            {"override_width_mm": 480.0, "override_height_mm": 480.0, "override_name": "Pane", "quantity": 4},
        ],
    });

    let created = t.post_as("/api/optimizations", &request, &token).await;
    assert_eq!(201, created.status().as_u16());
    let body: serde_json::Value = json(created).await;
    let id = body["id"].as_i64().unwrap();

    let utilization = body["layout"]["stats"]["utilization"].as_f64().unwrap();
    assert!(utilization > 0.5 && utilization <= 1.0, "utilization was {utilization}");
    assert_eq!(4, body["layout"]["stats"]["placed_count"].as_u64().unwrap());

    let fetched = t.get_as(&format!("/api/optimizations/{id}"), &token).await;
    assert_eq!(200, fetched.status().as_u16());

    let stats = t.get_as(&format!("/api/optimizations/{id}/statistics"), &token).await;
    assert_eq!(200, stats.status().as_u16());
    let stats_body: serde_json::Value = json(stats).await;
    assert_eq!(4, stats_body["placed_count"].as_u64().unwrap());
}

#[tokio::test]
async fn a_piece_larger_than_the_sheet_is_reported_as_unplaced() {
    let t = test_context!();
    let (_user, token) = factory::signed_up_user(&t.db, "overflow@example.com").await;
    let sheet_id = factory::insert_stock_sheet(&t.db, 500.0, 500.0, 45.0);

    let request = json!({
        "name": "Too big",
        "sheet_id": sheet_id,
        "design_items": [
            {"override_width_mm": 900.0, "override_height_mm": 900.0, "override_name": "Giant", "quantity": 1},
        ],
    });

    let created = t.post_as("/api/optimizations", &request, &token).await;
    assert_eq!(201, created.status().as_u16());
    let body: serde_json::Value = json(created).await;
    assert_eq!(0, body["layout"]["stats"]["placed_count"].as_u64().unwrap());
    assert_eq!(1, body["layout"]["stats"]["unplaced_count"].as_u64().unwrap());
    assert_eq!(1, body["layout"]["unplaced"].as_array().unwrap().len());
}

#[tokio::test]
async fn rerun_creates_a_new_record_and_compare_ranks_them() {
    let t = test_context!();
    let (_user, token) = factory::signed_up_user(&t.db, "rerun@example.com").await;
    let sheet_id = factory::insert_stock_sheet(&t.db, 1000.0, 1000.0, 45.0);

    let request = json!({
        "name": "Baseline",
        "sheet_id": sheet_id,
        "design_items": [
            {"override_width_mm": 300.0, "override_height_mm": 200.0, "override_name": "Light", "quantity": 3},
        ],
    });
    let created = t.post_as("/api/optimizations", &request, &token).await;
    let created_body: serde_json::Value = json(created).await;
    let first_id = created_body["id"].as_i64().unwrap();

    let rerun = t
        .post_as(&format!("/api/optimizations/{first_id}/rerun"), &json!({"name": "Rerun"}), &token)
        .await;
    assert_eq!(201, rerun.status().as_u16());
    let rerun_body: serde_json::Value = json(rerun).await;
    let second_id = rerun_body["id"].as_i64().unwrap();
    assert_ne!(first_id, second_id);

    let compare = t
        .post_as(
            "/api/optimizations/compare",
            &json!({"optimization_ids": [first_id, second_id]}),
            &token,
        )
        .await;
    assert_eq!(200, compare.status().as_u16());
    let compare_body: serde_json::Value = json(compare).await;
    assert!(compare_body["best_by_utilization"].is_i64());
    assert_eq!(2, compare_body["optimizations"].as_array().unwrap().len());
}

#[tokio::test]
async fn export_supports_json_svg_dxf_and_cutting_list() {
    let t = test_context!();
    let (_user, token) = factory::signed_up_user(&t.db, "exporter@example.com").await;
    let sheet_id = factory::insert_stock_sheet(&t.db, 1000.0, 1000.0, 45.0);

    let request = json!({
        "name": "Export me",
        "sheet_id": sheet_id,
        "design_items": [
            {"override_width_mm": 400.0, "override_height_mm": 300.0, "override_name": "Panel", "quantity": 2},
        ],
    });
    let created = t.post_as("/api/optimizations", &request, &token).await;
    let created_body: serde_json::Value = json(created).await;
    let id = created_body["id"].as_i64().unwrap();

    for (format, content_type) in [
        ("json", "application/json"),
        ("svg", "image/svg+xml"),
        ("dxf", "application/dxf"),
        ("cutting_list", "application/json"),
    ] {
        let response = t
            .get_as(&format!("/api/optimizations/{id}/export?format={format}"), &token)
            .await;
        assert_eq!(200, response.status().as_u16(), "format {format}");
        assert_eq!(
            content_type,
            response.headers().get("content-type").unwrap().to_str().unwrap(),
            "format {format}"
        );
    }
}

#[tokio::test]
async fn an_ad_hoc_optimize_call_is_never_persisted() {
    let t = test_context!();
    let (_user, token) = factory::signed_up_user(&t.db, "adhoc@example.com").await;

    let request = json!({
        "sheet_width": 1000.0,
        "sheet_height": 1000.0,
        "pieces": [
            {"width": 400.0, "height": 300.0, "quantity": 2},
        ],
    });

    let response = t.post_as("/api/optimize", &request, &token).await;
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = json(response).await;
    assert_eq!(2, body["layout"]["stats"]["placed_count"].as_u64().unwrap());

    let list = t.get_as("/api/optimizations", &token).await;
    let list_body: serde_json::Value = json(list).await;
    assert!(list_body.as_array().unwrap().is_empty());
}
