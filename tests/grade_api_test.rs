mod common;

use axum::http::StatusCode;
use common::{app, chat, config, post_json, spawn_upstream};
use interview_backend::config::Config;
use serde_json::json;

fn reverse_question() -> serde_json::Value {
    json!({
        "id": "c1",
        "type": "coding",
        "prompt": "Reverse a list in Python",
        "referenceSolution": "def rev(xs): return xs[::-1]",
        "language": "python"
    })
}

#[tokio::test]
async fn grades_against_reference_solution() {
    let verdict = json!({ "score": 80, "verdict": "partial", "feedback": "Works, but mutates input." });
    let upstream = spawn_upstream(vec![chat(format!("```json\n{}\n```", verdict))]).await;
    let app = app(&config(&upstream.base_url, Some("sk-test")));

    let (status, body) = post_json(
        &app,
        "/api/grade-code",
        json!({ "question": reverse_question(), "userCode": "xs.reverse(); return xs" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["score"], 80);
    assert_eq!(body["data"]["verdict"], "partial");
    assert_eq!(body["data"]["feedback"], "Works, but mutates input.");
    assert!(body["data"].get("raw").is_none());

    let sent = &upstream.requests()[0];
    assert_eq!(sent["temperature"], 0.0);
    assert_eq!(sent["max_tokens"], 800);
    let user = sent["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("def rev(xs): return xs[::-1]"));
    assert!(user.contains("xs.reverse(); return xs"));
}

#[tokio::test]
async fn prose_reply_falls_back_to_raw_text() {
    let upstream = spawn_upstream(vec![chat("Looks reasonable overall.")]).await;
    let app = app(&config(&upstream.base_url, Some("sk-test")));

    let (status, body) = post_json(
        &app,
        "/api/grade-code",
        json!({ "question": reverse_question(), "userCode": "return xs[::-1]" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["raw"], "Looks reasonable overall.");
    assert!(body["data"].get("verdict").is_none());
}

#[tokio::test]
async fn missing_reference_solution_is_rejected_before_any_call() {
    let upstream = spawn_upstream(vec![chat("unused")]).await;
    let app = app(&config(&upstream.base_url, Some("sk-test")));

    let (status, body) = post_json(
        &app,
        "/api/grade-code",
        json!({
            "question": { "id": "c9", "type": "coding", "prompt": "Write a trigger" },
            "userCode": "12345"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "missing_reference_solution");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn missing_question_is_rejected() {
    let upstream = spawn_upstream(vec![chat("unused")]).await;
    let app = app(&config(&upstream.base_url, Some("sk-test")));

    let (status, body) = post_json(&app, "/api/grade-code", json!({ "userCode": "print(1)" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "missing_question");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn missing_credential_is_500() {
    let upstream = spawn_upstream(vec![chat("unused")]).await;
    let app = app(&config(&upstream.base_url, None));

    let (status, body) = post_json(
        &app,
        "/api/grade-code",
        json!({ "question": reverse_question(), "userCode": "return xs[::-1]" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "OpenAI key not configured on server");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn upstream_error_is_502() {
    let upstream = spawn_upstream(vec![(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "rate limited" } }),
    )])
    .await;
    let app = app(&config(&upstream.base_url, Some("sk-test")));

    let (status, body) = post_json(
        &app,
        "/api/grade-code",
        json!({ "question": reverse_question(), "userCode": "return xs[::-1]" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 429);
    assert!(body["detail"].as_str().unwrap().contains("rate limited"));
    assert_eq!(upstream.hits(), 1);
}

#[tokio::test]
async fn mock_grader_uses_length_heuristic() {
    let cfg = Config {
        use_mock: true,
        ..config("http://127.0.0.1:9/v1", None)
    };
    let app = app(&cfg);

    let (status, body) = post_json(
        &app,
        "/api/grade-code",
        json!({ "question": reverse_question(), "userCode": "def rev(xs): return list(reversed(xs))" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], 90);
    assert_eq!(body["data"]["verdict"], "pass");
}
