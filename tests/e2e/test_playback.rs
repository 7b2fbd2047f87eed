use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_song(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/hc3/command", &json!({ "type": "play_music", "song_name": "ghost" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_message("ghost");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_start_playback_for_a_known_song(ctx: &TestContext) {
    ctx.add_track("sunrise");

    let response = ctx
        .client
        .post("/hc3/command", &json!({ "type": "play_music", "song_name": "sunrise" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("result").and_then(|v| v.as_str()), Some("started"));
    assert_eq!(body.get("kind").and_then(|v| v.as_str()), Some("track"));
    assert_eq!(body.get("source").and_then(|v| v.as_str()), Some("sunrise"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_supersede_with_the_latest_play_command(ctx: &TestContext) {
    ctx.add_track("first");
    ctx.add_track("second");

    for song in ["first", "second"] {
        ctx.client
            .post("/hc3/command", &json!({ "type": "play_music", "song_name": song }))
            .await
            .unwrap()
            .assert_status(StatusCode::OK);
    }

    let status = ctx.client.get("/status").await.unwrap();
    let body = status.body.as_ref().unwrap();
    let session = body.get("session").expect("session present");
    assert_eq!(
        session.get("source").and_then(|v| v.as_str()),
        Some("second")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stop_playback_and_stay_stopped(ctx: &TestContext) {
    ctx.add_track("song");

    ctx.client
        .post("/hc3/command", &json!({ "type": "play_music", "song_name": "song" }))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .post("/hc3/command", &json!({ "type": "stop_music" }))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("result").and_then(|v| v.as_str()), Some("stopped"));

    let status = ctx.client.get("/status").await.unwrap();
    let body = status.body.as_ref().unwrap();
    assert_eq!(body.get("state").and_then(|v| v.as_str()), Some("idle"));

    // Stopping while idle is still a success.
    ctx.client
        .post("/hc3/command", &json!({ "type": "stop_music" }))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_set_volume_while_idle(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/hc3/command", &json!({ "type": "volume", "volume": 75 }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(
        body.get("result").and_then(|v| v.as_str()),
        Some("volume_set")
    );
    assert_eq!(body.get("level").and_then(|v| v.as_u64()), Some(75));

    let status = ctx.client.get("/status").await.unwrap();
    let body = status.body.as_ref().unwrap();
    assert_eq!(body.get("volume").and_then(|v| v.as_u64()), Some(75));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_resolve_a_search_and_stream_it(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/hc3/command", &json!({ "type": "play_search", "query": "lofi beats" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("result").and_then(|v| v.as_str()), Some("started"));
    assert_eq!(body.get("kind").and_then(|v| v.as_str()), Some("stream"));
    assert_eq!(
        body.get("source").and_then(|v| v.as_str()),
        Some("Test Stream Title")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stream_a_direct_url(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/hc3/command",
            &json!({
                "type": "play_youtube_url",
                "url": "https://youtu.be/abc",
                "audio_only": true
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("result").and_then(|v| v.as_str()), Some("started"));
    assert_eq!(body.get("kind").and_then(|v| v.as_str()), Some("stream"));
    assert_eq!(
        body.get("source").and_then(|v| v.as_str()),
        Some("Test Stream Title")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_play_a_remote_playlist_url(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/hc3/command",
            &json!({
                "type": "play_youtube_playlist",
                "playlist_url": "https://example.com/playlist"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("result").and_then(|v| v.as_str()), Some("started"));
    assert_eq!(body.get("kind").and_then(|v| v.as_str()), Some("playlist"));

    let status = ctx.client.get("/status").await.unwrap();
    let body = status.body.as_ref().unwrap();
    assert_eq!(
        body.get("state").and_then(|v| v.as_str()),
        Some("playing_playlist")
    );
    let session = body.get("session").expect("session present");
    assert_eq!(session.get("playlist_length").and_then(|v| v.as_u64()), Some(1));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_a_non_http_url(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/hc3/command",
            &json!({ "type": "play_youtube_url", "url": "file:///etc/passwd" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_command_types(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/hc3/command", &json!({ "type": "reboot" }))
        .await
        .unwrap();

    // axum rejects the unparseable body before the dispatcher sees it
    assert!(response.status.is_client_error());
}
