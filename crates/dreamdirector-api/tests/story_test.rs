//! Integration tests for story play.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_story_plays_five_choices_to_completion() {
    let app = common::build_test_app(Some(common::scripted_providers()));

    let (status, json) = common::post_json(
        app.router(),
        "/api/start-story",
        &json!({ "story_request": "a cyberpunk detective chase" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id: Uuid = json["session_id"].as_str().unwrap().parse().unwrap();
    assert_eq!(json["choices_remaining"], 5);
    assert_eq!(json["total_choices"], 5);

    for n in 1..=4 {
        let (status, json) = common::post_json(
            app.router(),
            "/api/make-choice",
            &json!({ "session_id": session_id, "choice": format!("option {n}") }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["scene_id"], format!("scene_{n}"));
        assert_eq!(json["current_choice"], n);
        assert_eq!(json["story_complete"], false);
        assert_eq!(json["choices"].as_array().unwrap().len(), 3);
    }

    let (status, json) = common::post_json(
        app.router(),
        "/api/make-choice",
        &json!({ "session_id": session_id, "choice": "face the syndicate" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["scene_id"], "finale");
    assert_eq!(json["story_complete"], true);
    assert!(json["choices"].as_array().unwrap().is_empty());
    assert!(json["scene_description"].as_str().unwrap().ends_with(" - FINALE"));
    let kinds: Vec<&str> = json["story_progression"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["choice_result", "story_climax"]);

    let (status, json) = common::get_json(
        app.router(),
        &format!("/api/story-status/{session_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["story_complete"], true);
    assert_eq!(json["user_choices_made"], 5);
    assert_eq!(json["danger_level"], 10);
    assert_eq!(json["media_generated"]["videos"], 1);
    assert_eq!(json["media_generated"]["music"], 1);
}

#[tokio::test]
async fn test_choice_after_completion_returns_409() {
    let app = common::build_test_app(Some(common::scripted_providers()));
    let (_, json) = common::post_json(
        app.router(),
        "/api/start-story",
        &json!({ "story_request": "an enchanted forest" }),
    )
    .await;
    let session_id = json["session_id"].clone();
    for n in 1..=5 {
        let (status, _) = common::post_json(
            app.router(),
            "/api/make-choice",
            &json!({ "session_id": session_id, "choice": format!("step {n}") }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = common::post_json(
        app.router(),
        "/api/make-choice",
        &json!({ "session_id": session_id, "choice": "one more" }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "story_complete");
}

#[tokio::test]
async fn test_story_survives_failing_media_providers() {
    let app = common::build_test_app(Some(common::failing_media_providers()));

    let (status, json) = common::post_json(
        app.router(),
        "/api/start-story",
        &json!({ "story_request": "a dragon's lair" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["choices"].as_array().unwrap().len(), 3);
    let (_, files) = common::get_json(app.router(), "/api/media-files").await;
    assert!(files["images"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_start_story_without_providers_returns_503() {
    let app = common::build_test_app(None);

    let (status, json) = common::post_json(
        app.router(),
        "/api/start-story",
        &json!({ "story_request": "anything" }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "generation_unavailable");
}

#[tokio::test]
async fn test_blank_choice_returns_400() {
    let app = common::build_test_app(Some(common::scripted_providers()));
    let (_, json) = common::post_json(
        app.router(),
        "/api/start-story",
        &json!({ "story_request": "a heist" }),
    )
    .await;

    let (status, json) = common::post_json(
        app.router(),
        "/api/make-choice",
        &json!({ "session_id": json["session_id"], "choice": "   " }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_story_status_for_unknown_session_returns_404() {
    let app = common::build_test_app(None);

    let (status, json) = common::get_json(
        app.router(),
        &format!("/api/story-status/{}", Uuid::new_v4()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session_not_found");
}
