//! Integration tests for on-demand generation and the media library.

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_generated_image_is_listed_and_served() {
    let app = common::build_test_app(Some(common::scripted_providers()));

    let (status, json) = common::post_json(
        app.router(),
        "/api/generate-media",
        &json!({ "type": "image", "prompt": "a lighthouse in a storm" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["type"], "image");
    assert_eq!(json["method"], "image_generation");
    assert_eq!(json["total_files"], 1);
    let filename = json["filename"].as_str().unwrap().to_owned();
    assert_eq!(filename, "generated_scene_20260115_100000.png");
    assert_eq!(json["url"], format!("/api/media/{filename}"));

    let (status, files) = common::get_json(app.router(), "/api/media-files").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(files["images"], json!([filename]));
    assert_eq!(files["videos"], json!([]));

    let (status, content_type, body) =
        common::get_bytes(app.router(), &format!("/api/media/{filename}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(body, b"asset");
}

#[tokio::test]
async fn test_video_request_falls_back_to_image_when_video_fails() {
    let app = common::build_test_app(Some(common::failing_media_providers()));

    let (status, json) = common::post_json(
        app.router(),
        "/api/generate-media",
        &json!({ "type": "video", "prompt": "a chase across rooftops" }),
    )
    .await;

    // The fallback image fails too, so the final attempt surfaces.
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "provider_error");
}

#[tokio::test]
async fn test_generate_media_for_unknown_session_returns_404() {
    let app = common::build_test_app(Some(common::scripted_providers()));

    let (status, _) = common::post_json(
        app.router(),
        "/api/generate-media",
        &json!({
            "type": "music",
            "prompt": "rain on neon",
            "session_id": uuid::Uuid::new_v4(),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_files_in_media_dir_are_listed_by_kind() {
    let app = common::build_test_app(None);
    let dir = app.media_dir.path();
    std::fs::write(dir.join("generated_video_20260101_000000.mp4"), b"v").unwrap();
    std::fs::write(dir.join("lyria_final_theme_20260101_000000.wav"), b"m").unwrap();
    std::fs::write(dir.join("notes.txt"), b"x").unwrap();

    let (status, json) = common::get_json(app.router(), "/api/media-files").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["videos"], json!(["generated_video_20260101_000000.mp4"]));
    assert_eq!(json["music"], json!(["lyria_final_theme_20260101_000000.wav"]));
    assert_eq!(json["images"], json!([]));
}

#[tokio::test]
async fn test_path_traversal_is_rejected() {
    let app = common::build_test_app(None);

    let (status, json) = common::get_json(app.router(), "/api/media/..%2F..%2Fetc%2Fpasswd").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_missing_media_file_returns_404() {
    let app = common::build_test_app(None);

    let (status, json) = common::get_json(app.router(), "/api/media/generated_scene_x.png").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "media_not_found");
}
