//! End-to-end tests of the HTTP API over in-memory backends.

mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use common::{OTHER_OWNER, OWNER, TestApp, part};

#[tokio::test]
async fn test_missing_owner_header_is_unauthorized() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Request::builder()
                .uri("/api/folders")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTHENTICATION");

    let (status, _) = app.get("   ", "/api/folders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_reports_memory_backends() {
    let app = TestApp::new().await;
    let (status, body) = app.get(OWNER, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "memory");
    assert_eq!(body["data"]["storage"], "available");
}

#[tokio::test]
async fn test_folder_crud_and_owner_isolation() {
    let app = TestApp::new().await;
    let docs = app.create_folder(OWNER, "Docs", None).await;
    let sub = app.create_folder(OWNER, "Sub", Some(&docs)).await;

    let (status, body) = app.get(OWNER, &format!("/api/folders/{docs}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Docs");
    assert_eq!(body["data"]["lifecycleState"], "active");

    let (status, body) = app.get(OTHER_OWNER, &format!("/api/folders/{docs}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, body) = app
        .send_json(
            "PUT",
            OWNER,
            &format!("/api/folders/{sub}"),
            json!({ "name": "Renamed", "parentId": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed");
    assert!(body["data"]["parentId"].is_null());

    let (status, body) = app.get(OWNER, "/api/folders?sortField=name&sortOrder=asc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalItems"], 2);
    assert_eq!(body["data"]["items"][0]["name"], "Docs");
    assert_eq!(body["data"]["items"][1]["name"], "Renamed");
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let app = TestApp::new().await;
    app.create_folder(OWNER, "Docs", None).await;

    let (status, body) = app
        .get(OWNER, "/api/folders?page=184467440737095516&limit=100")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalItems"], 1);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["hasNext"], false);

    let (status, _) = app
        .get(OWNER, &format!("/api/files?page={}&limit=100", u64::MAX))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_folder_validation() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send_json("POST", OWNER, "/api/folders", json!({ "name": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION");

    let (status, _) = app
        .send_json(
            "POST",
            OWNER,
            "/api/folders",
            json!({ "name": "Orphan", "parentId": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get(OWNER, "/api/folders?sortField=colour").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_move_folder_into_own_subtree_is_rejected() {
    let app = TestApp::new().await;
    let a = app.create_folder(OWNER, "A", None).await;
    let b = app.create_folder(OWNER, "B", Some(&a)).await;

    let (status, body) = app
        .send_json(
            "PUT",
            OWNER,
            &format!("/api/folders/{a}"),
            json!({ "parentId": b }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_upload_then_download_returns_identical_bytes() {
    let app = TestApp::new().await;
    let folder = app.create_folder(OWNER, "Docs", None).await;

    let content = b"quarterly numbers\n";
    let (status, body) = app
        .upload(OWNER, Some(&folder), part("report.txt", "text/plain", content))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let file_id = body["data"]["id"].as_str().unwrap().to_string();
    let blob_id = body["data"]["blobId"].as_str().unwrap().to_string();
    assert_eq!(
        body["data"]["url"],
        format!("http://drive.test/api/files/blob/{blob_id}")
    );
    assert_eq!(body["data"]["file"]["parentId"], folder.as_str());
    assert_eq!(body["data"]["file"]["byteSize"], content.len());

    let response = app
        .send(
            common::request("GET", &format!("/api/files/{file_id}/download"), OWNER)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report.txt\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], content);

    let response = app
        .send(
            common::request("GET", &format!("/api/files/blob/{blob_id}"), OWNER)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = app
        .get(OWNER, &format!("/api/files/{file_id}/metadata"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filename"], "report.txt");
    assert_eq!(body["data"]["byteLength"], content.len());
}

#[tokio::test]
async fn test_download_of_foreign_file_is_forbidden() {
    let app = TestApp::new().await;
    let (_, body) = app
        .upload(OWNER, None, part("secret.txt", "text/plain", b"s3cr3t"))
        .await;
    let file_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .get(OTHER_OWNER, &format!("/api/files/{file_id}/download"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = app
        .get(
            OWNER,
            &format!("/api/files/{}/download", uuid::Uuid::new_v4()),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejects_disallowed_extension() {
    let app = TestApp::new().await;
    let (status, body) = app
        .upload(
            OWNER,
            None,
            part("tool.exe", "application/octet-stream", b"MZ"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION");

    let (_, body) = app.get(OWNER, "/api/files/root").await;
    assert_eq!(body["data"]["totalItems"], 0);
}

#[tokio::test]
async fn test_upload_many_reports_each_file() {
    let app = TestApp::new().await;
    let (status, body) = app
        .upload_many(
            OWNER,
            None,
            &[
                part("a.txt", "text/plain", b"a"),
                part("b.exe", "application/octet-stream", b"b"),
                part("c.png", "image/png", b"\x89PNG"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["stored"], 2);
    assert_eq!(body["data"]["rejected"], 1);
    assert_eq!(body["message"], "2 file(s) stored, 1 rejected");

    let files = body["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 3);
    assert!(files[0]["fileId"].is_string());
    assert!(files[1]["error"].is_object());
    assert!(files[2]["url"].is_string());
}

#[tokio::test]
async fn test_folder_lifecycle_cascades_over_http() {
    let app = TestApp::new().await;
    let a = app.create_folder(OWNER, "A", None).await;
    let b = app.create_folder(OWNER, "B", Some(&a)).await;
    let (_, body) = app
        .upload(OWNER, Some(&b), part("doc.pdf", "application/pdf", b"%PDF-1.7"))
        .await;
    let doc = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app.delete(OWNER, &format!("/api/folders/{a}/hard")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.delete(OWNER, &format!("/api/folders/{a}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["transition"], "trash");
    assert_eq!(body["data"]["foldersChanged"], 2);
    assert_eq!(body["data"]["filesChanged"], 1);

    let (_, body) = app.get(OWNER, &format!("/api/files/{doc}")).await;
    assert_eq!(body["data"]["lifecycleState"], "trashed");

    let (_, body) = app.get(OWNER, "/api/drive/trash").await;
    assert_eq!(body["data"]["folders"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 1);

    let (status, _) = app.post_empty(OWNER, &format!("/api/folders/{a}/restore")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(OWNER, &format!("/api/folders/{b}")).await;
    assert_eq!(body["data"]["lifecycleState"], "active");

    app.delete(OWNER, &format!("/api/folders/{a}")).await;
    let (status, body) = app.delete(OWNER, &format!("/api/folders/{a}/hard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["blobsPurged"], 1);
    assert!(body.get("message").is_none());

    let (status, _) = app.get(OWNER, &format!("/api/files/{doc}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(OWNER, &format!("/api/folders/{b}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_lifecycle_over_http() {
    let app = TestApp::new().await;
    let (_, body) = app
        .upload(OWNER, None, part("notes.txt", "text/plain", b"n"))
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app.post_empty(OWNER, &format!("/api/files/{id}/restore")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.delete(OWNER, &format!("/api/files/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lifecycleState"], "trashed");

    let (_, body) = app.get(OWNER, "/api/files/trash").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app.delete(OWNER, &format!("/api/files/{id}/hard")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    let (status, _) = app.get(OWNER, &format!("/api/files/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_and_folder_listing() {
    let app = TestApp::new().await;
    let folder = app.create_folder(OWNER, "Work", None).await;
    for name in ["Plan.txt", "budget.xlsx"] {
        let (status, _) = app
            .upload(OWNER, Some(&folder), part(name, "application/octet-stream", b"x"))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.get(OWNER, "/api/files/search?name=plan").await;
    let hits = body["data"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Plan.txt");

    let (_, body) = app.get(OWNER, &format!("/api/files/folder/{folder}")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app.get(OWNER, &format!("/api/folders/{folder}/contents")).await;
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 2);

    let (_, body) = app.get(OWNER, "/api/files?limit=1").await;
    assert_eq!(body["data"]["totalItems"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_drive_contents_pages_folders_and_files() {
    let app = TestApp::new().await;
    app.create_folder(OWNER, "One", None).await;
    app.create_folder(OWNER, "Two", None).await;
    app.upload(OWNER, None, part("top.txt", "text/plain", b"t"))
        .await;

    let (status, body) = app
        .get(OWNER, "/api/drive/contents?limit=1&sortField=name&sortOrder=asc")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalFolders"], 2);
    assert_eq!(body["data"]["totalFiles"], 1);
    assert_eq!(body["data"]["folders"]["items"][0]["name"], "One");
    assert_eq!(body["data"]["folders"]["hasNext"], true);

    let (_, body) = app.get(OWNER, "/api/drive/contents?search=tw").await;
    assert_eq!(body["data"]["totalFolders"], 1);
    assert_eq!(body["data"]["totalFiles"], 0);
}

#[tokio::test]
async fn test_registering_a_taken_blob_is_rejected() {
    let app = TestApp::new().await;
    let (_, body) = app
        .upload(OWNER, None, part("photo.png", "image/png", b"\x89PNG"))
        .await;
    let blob_id = body["data"]["blobId"].as_str().unwrap().to_string();
    assert_eq!(
        body["data"]["file"]["publicUrl"],
        format!("http://drive.test/api/files/blob/{blob_id}")
    );

    let register = |name: &str| {
        json!({
            "name": name,
            "blobRef": blob_id,
            "mimeType": "image/png",
            "byteSize": 4
        })
    };

    let (status, body) = app
        .send_json("POST", OWNER, "/api/files", register("copy.png"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = app
        .send_json("POST", OTHER_OWNER, "/api/files", register("stolen.png"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send_json(
            "POST",
            OWNER,
            "/api/files",
            json!({ "name": "neg.png", "blobRef": blob_id, "mimeType": "image/png", "byteSize": -1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_blob_upload_then_register_file() {
    let app = TestApp::new().await;
    let folder = app.create_folder(OWNER, "Inbox", None).await;

    let (status, body) = app
        .upload_blob(OWNER, part("scan.pdf", "application/pdf", b"%PDF-1.7"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let blob_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(
        body["data"]["url"],
        format!("http://drive.test/api/files/blob/{blob_id}")
    );
    assert_eq!(body["data"]["mimeType"], "application/pdf");
    assert_eq!(body["data"]["byteSize"], 8);

    let (_, body) = app.get(OWNER, "/api/files").await;
    assert_eq!(body["data"]["totalItems"], 0);

    let (status, body) = app
        .send_json(
            "POST",
            OWNER,
            "/api/files",
            json!({
                "name": "scan.pdf",
                "parentId": folder,
                "blobRef": blob_id,
                "mimeType": "application/pdf",
                "byteSize": 8
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["blobRef"], blob_id.as_str());
    assert_eq!(body["data"]["parentId"], folder.as_str());
    let file_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .send(
            common::request("GET", &format!("/api/files/{file_id}/download"), OWNER)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.7");

    let (status, _) = app
        .upload_blob(OWNER, part("tool.exe", "application/octet-stream", b"MZ"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_many_with_oversized_file_keeps_the_valid_one() {
    let mut config = common::memory_config();
    config.upload.max_batch_file_size_bytes = 16;
    let app = TestApp::with_config(config).await;

    let oversized = [b'x'; 17];
    let (status, body) = app
        .upload_many(
            OWNER,
            None,
            &[
                part("small.txt", "text/plain", b"fits"),
                part("large.txt", "text/plain", &oversized),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["stored"], 1);
    assert_eq!(body["data"]["rejected"], 1);

    let files = body["data"]["files"].as_array().unwrap();
    assert!(files[1]["fileId"].is_null());
    assert_eq!(files[1]["error"]["kind"], "Validation");
    let file_id = files[0]["fileId"].as_str().unwrap().to_string();

    let response = app
        .send(
            common::request("GET", &format!("/api/files/{file_id}/download"), OWNER)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"fits");
}
