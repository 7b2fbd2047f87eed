use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_idle_initially(ctx: &TestContext) {
    let response = ctx.client.get("/status").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("state").and_then(|v| v.as_str()), Some("idle"));
    assert_eq!(body.get("volume").and_then(|v| v.as_u64()), Some(50));
    assert!(body.get("session").is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_the_active_session(ctx: &TestContext) {
    ctx.add_track("sunrise");

    ctx.client
        .post("/hc3/command", &json!({ "type": "play_music", "song_name": "sunrise" }))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx.client.get("/status").await.unwrap();
    let body = response.body.as_ref().unwrap();

    assert_eq!(
        body.get("state").and_then(|v| v.as_str()),
        Some("playing_track")
    );
    let session = body.get("session").expect("session present");
    assert_eq!(session.get("kind").and_then(|v| v.as_str()), Some("track"));
    assert_eq!(
        session.get("source").and_then(|v| v.as_str()),
        Some("sunrise")
    );
    assert!(session.get("started_at").is_some());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_playlist_progress(ctx: &TestContext) {
    ctx.add_track("a");
    ctx.add_track("b");
    ctx.add_playlist("evening", &["a", "b"]);

    ctx.client
        .post(
            "/hc3/command",
            &json!({ "type": "play_playlist", "playlist_name": "evening" }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx.client.get("/status").await.unwrap();
    let body = response.body.as_ref().unwrap();

    assert_eq!(
        body.get("state").and_then(|v| v.as_str()),
        Some("playing_playlist")
    );
    let session = body.get("session").expect("session present");
    assert_eq!(session.get("position").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(
        session.get("playlist_length").and_then(|v| v.as_u64()),
        Some(2)
    );
}
