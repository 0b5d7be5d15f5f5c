use serde_json::json;

use crate::support::context::json;
use crate::support::factory;
use crate::support::test_context;

fn simple_pane(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "width_mm": 600.0,
        "height_mm": 400.0,
        "thickness_mm": 6.0,
        "elements": {
            "shapes": [{
                "shape": "rectangle",
                "id": "outer",
                "x": 0.0, "y": 0.0, "width": 600.0, "height": 400.0,
            }],
        },
    })
}

#[tokio::test]
async fn create_then_clone_a_design() {
    let t = test_context!();
    let (_user, token) = factory::signed_up_user(&t.db, "designer@example.com").await;

    let created = t.post_as("/api/designs", &simple_pane("Pane A"), &token).await;
    assert_eq!(201, created.status().as_u16());
    let created_body: serde_json::Value = json(created).await;
    let id = created_body["id"].as_i64().unwrap();

    let cloned = t.post_as(&format!("/api/designs/{id}/clone"), &json!({}), &token).await;
    assert_eq!(201, cloned.status().as_u16());
    let cloned_body: serde_json::Value = json(cloned).await;
    assert_eq!("Pane A (copy)", cloned_body["name"]);
    assert_ne!(id, cloned_body["id"].as_i64().unwrap());
}

#[tokio::test]
async fn validate_rejects_holes_that_exceed_the_outer_area() {
    let t = test_context!();
    let (_user, token) = factory::signed_up_user(&t.db, "validator@example.com").await;

    let created = t.post_as("/api/designs", &simple_pane("Pane B"), &token).await;
    let created_body: serde_json::Value = json(created).await;
    let id = created_body["id"].as_i64().unwrap();

    let oversized_hole = json!({
        "width_mm": 600.0,
        "height_mm": 400.0,
        "thickness_mm": 6.0,
        "elements": {
            "holes": [{
                "kind": "rectangular",
                "id": "h1",
                "x": 0.0, "y": 0.0, "width": 1000.0, "height": 1000.0,
            }],
        },
    });
    let response = t
        .post_as(&format!("/api/designs/{id}/validate"), &oversized_hole, &token)
        .await;
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn templates_lists_the_built_in_presets() {
    let t = test_context!();
    let (_user, token) = factory::signed_up_user(&t.db, "templates@example.com").await;

    let response = t.get_as("/api/designs/templates", &token).await;
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = json(response).await;
    assert!(body.as_array().unwrap().len() >= 2);
}
