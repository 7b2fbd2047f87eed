use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/tts", &json!({ "text": "   " }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("Text cannot be empty");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_oversized_text(ctx: &TestContext) {
    let text = "a".repeat(10_001);
    let response = ctx.client.post("/tts", &json!({ "text": text })).await.unwrap();

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    response.assert_error_message("10,000 characters or less");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_speak_and_report_a_speech_session(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/tts", &json!({ "text": "dinner is ready" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("result").and_then(|v| v.as_str()), Some("started"));
    assert_eq!(body.get("kind").and_then(|v| v.as_str()), Some("speech"));

    let status = ctx.client.get("/status").await.unwrap();
    let body = status.body.as_ref().unwrap();
    assert_eq!(body.get("state").and_then(|v| v.as_str()), Some("speaking"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_resume_music_after_speech_finishes(ctx: &TestContext) {
    ctx.add_track("sunrise");

    ctx.client
        .post("/hc3/command", &json!({ "type": "play_music", "song_name": "sunrise" }))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    ctx.client
        .post("/tts", &json!({ "text": "short announcement" }))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let status = ctx.client.get("/status").await.unwrap();
    let body = status.body.as_ref().unwrap();
    assert_eq!(body.get("state").and_then(|v| v.as_str()), Some("speaking"));

    // The stub speech player exits after a second; music should come
    // back on its own.
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let status = ctx.client.get("/status").await.unwrap();
    let body = status.body.as_ref().unwrap();
    assert_eq!(
        body.get("state").and_then(|v| v.as_str()),
        Some("playing_track")
    );
    let session = body.get("session").expect("session present");
    assert_eq!(
        session.get("source").and_then(|v| v.as_str()),
        Some("sunrise")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_repeated_phrases(ctx: &TestContext) {
    // Second request hits the synthesis cache; both must succeed.
    for _ in 0..2 {
        ctx.client
            .post("/tts", &json!({ "text": "good morning" }))
            .await
            .unwrap()
            .assert_status(StatusCode::OK);
    }
}
