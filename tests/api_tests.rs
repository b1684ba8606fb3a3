//! Integration tests for the `PharmaList` HTTP API
//!
//! Tests cover:
//! - Health endpoint
//! - Category creation, duplicate detection, listing, and deletion
//! - Valid name CRUD
//! - Promotion of raw medicines
//! - Image upload and removal on delete
//! - Error bodies for malformed requests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use pharmalist::{
    api::{AppState, RouterConfig, build_router},
    config::database::create_tables,
    storage::{LocalImageStore, MemoryRawStore, RawMedicine, RawMedicineStore},
};
use sea_orm::Database;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: Fresh in-memory database, raw list, and upload directory
struct TestApp {
    router: Router,
    uploads: TempDir,
}

impl TestApp {
    async fn new(raw: Vec<RawMedicine>) -> Self {
        Self::with_upload_limit(raw, 1024 * 1024).await
    }

    async fn with_upload_limit(raw: Vec<RawMedicine>, max_upload_bytes: usize) -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Should open in-memory database");
        create_tables(&db).await.expect("Should create tables");

        let uploads = TempDir::new().expect("Should create upload dir");
        let state = AppState::new(
            db,
            RawMedicineStore::new(MemoryRawStore::new(raw)),
            Arc::new(LocalImageStore::new(uploads.path())),
        );
        let config = RouterConfig {
            max_upload_bytes,
            uploads_dir: Some(uploads.path().to_path_buf()),
        };

        Self {
            router: build_router(state, &config),
            uploads,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Should parse JSON")
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(empty_request("GET", uri)).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(empty_request("DELETE", uri)).await
    }

    async fn json(&self, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn multipart_request(
    method: &str,
    uri: &str,
    field: &str,
    content_type: &str,
    bytes: &[u8],
) -> Request<Body> {
    let boundary = "pharmalist-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"box.png\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new(vec![]).await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "pharmalist");
    assert!(body["version"].is_string());
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_create_category_and_reject_case_insensitive_duplicate() {
    let app = TestApp::new(vec![]).await;

    let (status, created) = app
        .json("POST", "/api/categories", &json!({ "name": "Antibiotic" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Antibiotic");
    assert_eq!(created["color"], "#10b981");

    let (status, body) = app
        .json("POST", "/api/categories", &json!({ "name": "antibiotic" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_create_category_requires_name() {
    let app = TestApp::new(vec![]).await;

    let (status, body) = app
        .json("POST", "/api/categories", &json!({ "name": "   " }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_list_categories_sorted_by_name() {
    let app = TestApp::new(vec![]).await;
    for name in ["vitamin", "Analgesic", "antibiotic"] {
        app.json("POST", "/api/categories", &json!({ "name": name }))
            .await;
    }

    let (status, body) = app.get("/api/categories").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Analgesic", "antibiotic", "vitamin"]);
}

#[tokio::test]
async fn test_delete_category_detaches_it_from_valid_names() {
    let app = TestApp::new(vec![]).await;
    let (_, category) = app
        .json("POST", "/api/categories", &json!({ "name": "Antibiotic" }))
        .await;
    let (_, name) = app
        .json("POST", "/api/valid-names", &json!({ "name": "Amoxicillin" }))
        .await;
    let uri = format!("/api/valid-names/{}", name["id"]);
    let (status, _) = app
        .json("PUT", &uri, &json!({ "categories": [category["id"]] }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .delete(&format!("/api/categories/{}", category["id"]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted");
    assert_eq!(body["category"]["name"], "Antibiotic");
    assert_eq!(body["detached"], 1);

    let (_, fetched) = app.get(&uri).await;
    assert_eq!(fetched["categories"], json!([]));

    let (status, _) = app
        .delete(&format!("/api/categories/{}", category["id"]))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Valid names
// =============================================================================

#[tokio::test]
async fn test_valid_name_crud() {
    let app = TestApp::new(vec![]).await;

    let (status, created) = app
        .json(
            "POST",
            "/api/valid-names",
            &json!({ "name": " Paracetamol ", "units": ["tab", "B", "tab"] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Paracetamol");
    assert_eq!(created["units"], json!(["tab", "B"]));
    assert_eq!(created["hasImage"], false);

    let (status, _) = app
        .json("POST", "/api/valid-names", &json!({ "name": "PARACETAMOL" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/api/valid-names/{}", created["id"]);
    let (status, updated) = app
        .json("PUT", &uri, &json!({ "name": "Paracetamol 500", "units": ["B"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Paracetamol 500");
    assert_eq!(updated["units"], json!(["B"]));

    let (status, listed) = app.get("/api/valid-names?search=cetamol").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Valid name deleted");
    assert_eq!(body["validName"]["id"], created["id"]);
    assert_eq!(body["validName"]["name"], "Paracetamol 500");

    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_update_with_unknown_category_is_rejected() {
    let app = TestApp::new(vec![]).await;
    let (_, created) = app
        .json("POST", "/api/valid-names", &json!({ "name": "Ibuprofen" }))
        .await;

    let (status, _) = app
        .json(
            "PUT",
            &format!("/api/valid-names/{}", created["id"]),
            &json!({ "categories": [999] }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_returns_error_body() {
    let app = TestApp::new(vec![]).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/valid-names")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let app = TestApp::new(vec![]).await;

    let (status, body) = app.get("/api/valid-names/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// =============================================================================
// Promotion
// =============================================================================

#[tokio::test]
async fn test_promote_raw_medicine_with_corrected_name() {
    let app = TestApp::new(vec![
        RawMedicine::new("Amoxicilin", ["B"]),
        RawMedicine::new("Ibuprofen", ["tab"]),
    ])
    .await;

    let (status, body) = app
        .json(
            "PUT",
            "/api/raw-medicines/validate",
            &json!({
                "medicineattributes": {
                    "oldname": "Amoxicilin",
                    "newname": "Amoxicillin",
                    "units": ["P"]
                }
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["validName"]["name"], "Amoxicillin");
    assert_eq!(body["validName"]["units"], json!(["B", "P"]));
    assert_eq!(body["validName"]["categories"], json!([]));

    let (_, raw) = app.get("/api/raw-medicines").await;
    assert_eq!(raw[0]["edited"], true);
    assert_eq!(raw[0]["correctedname"], "Amoxicillin");
    assert_eq!(raw[1]["edited"], false);

    let (_, pending) = app.get("/api/raw-medicines?pending=true").await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["name"], "Ibuprofen");

    let (status, _) = app
        .json(
            "PUT",
            "/api/raw-medicines/validate",
            &json!({ "medicineattributes": { "oldname": "Amoxicilin" } }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_promote_accepts_medicine_name_alias() {
    let app = TestApp::new(vec![RawMedicine::new("Cetirizine", ["B"])]).await;

    let (status, body) = app
        .json(
            "PUT",
            "/api/raw-medicines/validate",
            &json!({ "medicineName": { "oldname": "cetirizine" } }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["validName"]["name"], "Cetirizine");
}

#[tokio::test]
async fn test_promote_unknown_raw_medicine_is_not_found() {
    let app = TestApp::new(vec![RawMedicine::new("Cetirizine", ["B"])]).await;

    let (status, body) = app
        .json(
            "PUT",
            "/api/raw-medicines/validate",
            &json!({ "medicineattributes": { "oldname": "Loratadine" } }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Loratadine"));
}

#[tokio::test]
async fn test_promote_onto_existing_valid_name_conflicts() {
    let app = TestApp::new(vec![RawMedicine::new("Amoxicilin", ["B"])]).await;
    app.json("POST", "/api/valid-names", &json!({ "name": "Amoxicillin" }))
        .await;

    let (status, _) = app
        .json(
            "PUT",
            "/api/raw-medicines/validate",
            &json!({ "medicineattributes": { "oldname": "Amoxicilin", "newname": "amoxicillin" } }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, raw) = app.get("/api/raw-medicines").await;
    assert_eq!(raw[0]["edited"], false);
}

#[tokio::test]
async fn test_pending_groups_merge_duplicate_raw_names() {
    let app = TestApp::new(vec![
        RawMedicine::new("Aspirin", ["B"]),
        RawMedicine::new("aspirin", ["tab"]),
        RawMedicine::new("Zinc", ["B"]),
    ])
    .await;
    app.json("POST", "/api/valid-names", &json!({ "name": "Zinc" }))
        .await;

    let (status, groups) = app.get("/api/raw-medicines/pending").await;

    assert_eq!(status, StatusCode::OK);
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["name"], "Aspirin");
    assert_eq!(groups[0]["units"], json!(["B", "tab"]));
}

// =============================================================================
// Images
// =============================================================================

#[tokio::test]
async fn test_upload_image_then_delete_removes_file() {
    let app = TestApp::new(vec![]).await;
    let (_, created) = app
        .json("POST", "/api/valid-names", &json!({ "name": "Amoxicillin" }))
        .await;
    let uri = format!("/api/valid-names/{}", created["id"]);

    let (status, updated) = app
        .send(multipart_request(
            "PUT",
            &format!("{uri}/upload"),
            "image",
            "image/png",
            b"\x89PNG fake",
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["hasImage"], true);
    let image_path = updated["imagePath"].as_str().unwrap().to_string();
    assert!(image_path.starts_with("/uploads/medicines/"));
    assert!(image_path.ends_with(".png"));

    let file_name = image_path.rsplit('/').next().unwrap();
    let on_disk = app.uploads.path().join("medicines").join(file_name);
    assert!(on_disk.exists());

    let (status, _) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!on_disk.exists());
}

#[tokio::test]
async fn test_upload_rejects_non_image() {
    let app = TestApp::new(vec![]).await;
    let (_, created) = app
        .json("POST", "/api/valid-names", &json!({ "name": "Amoxicillin" }))
        .await;

    let (status, body) = app
        .send(multipart_request(
            "PUT",
            &format!("/api/valid-names/{}/upload", created["id"]),
            "image",
            "text/plain",
            b"not an image",
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_upload_without_image_field_is_rejected() {
    let app = TestApp::new(vec![]).await;
    let (_, created) = app
        .json("POST", "/api/valid-names", &json!({ "name": "Amoxicillin" }))
        .await;

    let (status, body) = app
        .send(multipart_request(
            "PUT",
            &format!("/api/valid-names/{}/upload", created["id"]),
            "photo",
            "image/png",
            b"\x89PNG fake",
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image provided");
}

#[tokio::test]
async fn test_upload_to_missing_valid_name_is_not_found() {
    let app = TestApp::new(vec![]).await;

    let (status, _) = app
        .send(multipart_request(
            "PUT",
            "/api/valid-names/42/upload",
            "image",
            "image/png",
            b"\x89PNG fake",
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_image_with_post() {
    let app = TestApp::new(vec![]).await;
    let (_, created) = app
        .json("POST", "/api/valid-names", &json!({ "name": "Amoxicillin" }))
        .await;

    let (status, updated) = app
        .send(multipart_request(
            "POST",
            &format!("/api/valid-names/{}/upload", created["id"]),
            "image",
            "image/jpeg",
            b"\xff\xd8 fake jpeg",
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["hasImage"], true);
    assert!(
        updated["imagePath"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/medicines/")
    );
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let app = TestApp::with_upload_limit(vec![], 1024).await;
    let (_, created) = app
        .json("POST", "/api/valid-names", &json!({ "name": "Amoxicillin" }))
        .await;
    let uri = format!("/api/valid-names/{}", created["id"]);

    let (status, body) = app
        .send(multipart_request(
            "POST",
            &format!("{uri}/upload"),
            "image",
            "image/png",
            &[0u8; 4096],
        ))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());

    let (_, fetched) = app.get(&uri).await;
    assert_eq!(fetched["hasImage"], false);
    assert!(!app.uploads.path().join("medicines").exists());
}
