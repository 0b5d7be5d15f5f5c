use serde_json::json;

use crate::support::context::json;
use crate::support::factory;
use crate::support::test_context;

#[tokio::test]
async fn renaming_a_project_rewrites_descendant_paths() {
    let t = test_context!();
    let (_user, token) = factory::signed_up_user(&t.db, "owner@example.com").await;

    let parent = t
        .post_as("/api/projects", &json!({"name": "Workshop"}), &token)
        .await;
    let parent_body: serde_json::Value = json(parent).await;
    let parent_id = parent_body["id"].as_i64().unwrap();

    let child = t
        .post_as(
            "/api/projects",
            &json!({"name": "Kitchen", "parent_id": parent_id}),
            &token,
        )
        .await;
    let child_body: serde_json::Value = json(child).await;
    let child_id = child_body["id"].as_i64().unwrap();
    assert_eq!("/Workshop/Kitchen", child_body["path"]);

    let renamed = t
        .put_as(
            &format!("/api/projects/{parent_id}"),
            &json!({"name": "Studio", "parent_id": null}),
            &token,
        )
        .await;
    assert_eq!(200, renamed.status().as_u16());

    let child_after = t.get_as(&format!("/api/projects/{child_id}"), &token).await;
    let child_after_body: serde_json::Value = json(child_after).await;
    assert_eq!("/Studio/Kitchen", child_after_body["path"]);
}

#[tokio::test]
async fn a_project_is_invisible_across_tenants() {
    let t = test_context!();
    let (_owner, owner_token) = factory::signed_up_user(&t.db, "owner2@example.com").await;
    let (_stranger, stranger_token) = factory::signed_up_user(&t.db, "stranger@example.com").await;

    let created = t
        .post_as("/api/projects", &json!({"name": "Private"}), &owner_token)
        .await;
    let created_body: serde_json::Value = json(created).await;
    let project_id = created_body["id"].as_i64().unwrap();

    let as_owner = t.get_as(&format!("/api/projects/{project_id}"), &owner_token).await;
    assert_eq!(200, as_owner.status().as_u16());

    let as_stranger = t.get_as(&format!("/api/projects/{project_id}"), &stranger_token).await;
    assert_eq!(404, as_stranger.status().as_u16());
}

#[tokio::test]
async fn tree_nests_projects_by_parent() {
    let t = test_context!();
    let (_user, token) = factory::signed_up_user(&t.db, "tree@example.com").await;

    let root = t.post_as("/api/projects", &json!({"name": "Root"}), &token).await;
    let root_body: serde_json::Value = json(root).await;
    let root_id = root_body["id"].as_i64().unwrap();

    t.post_as("/api/projects", &json!({"name": "Branch", "parent_id": root_id}), &token)
        .await;

    let tree = t.get_as("/api/projects?tree=true", &token).await;
    assert_eq!(200, tree.status().as_u16());
    let tree_body: serde_json::Value = json(tree).await;
    let roots = tree_body.as_array().expect("tree response is an array");
    assert_eq!(1, roots.len());
    assert_eq!(1, roots[0]["children"].as_array().unwrap().len());
}
