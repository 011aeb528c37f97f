//! RFC 3977 Section 6.3.1 - POST Command Tests
//!
//! POST is a two-phase exchange: the server answers 340 to invite the
//! article, then 240 or 441 once the terminating dot line arrives.
//!
//! Reference: https://datatracker.ietf.org/doc/html/rfc3977#section-6.3.1

use crate::common::{SERVER_HOST, Script, config_for, spawn_mock};
use newsrelay::{Article, NntpPoster, RelayError, SessionState};

const ARTICLE: &str = "From: anon@example.org\r\nNewsgroups: alt.test\r\nSubject: hi\r\n\r\nhello\r\n";

#[tokio::test]
async fn test_post_success_sends_article_then_quit() {
    let (proxy, mock) = spawn_mock(Script::default()).await;
    let config = config_for(proxy);

    let poster = NntpPoster::connect(&config).await.unwrap();
    assert_eq!(poster.state(), SessionState::Greeted);

    let response = poster.post(&Article::new(ARTICLE)).await.unwrap();
    assert_eq!(response.raw, "240 Article received OK\r\n");

    let transcript = mock.await.unwrap();
    assert_eq!(transcript.target_host, SERVER_HOST);
    assert_eq!(transcript.target_port, 119);
    assert_eq!(
        transcript.received_text(),
        format!("POST\r\n{}.\r\nQUIT\r\n", ARTICLE)
    );
}

#[tokio::test]
async fn test_post_appends_missing_crlf() {
    let (proxy, mock) = spawn_mock(Script::default()).await;
    let poster = NntpPoster::connect(&config_for(proxy)).await.unwrap();

    let article = "Newsgroups: alt.test\r\n\r\nno newline at end";
    poster.post(&Article::new(article)).await.unwrap();

    let transcript = mock.await.unwrap();
    assert_eq!(
        transcript.received_text(),
        format!("POST\r\n{}\r\n.\r\nQUIT\r\n", article)
    );
}

#[tokio::test]
async fn test_post_lf_only_article_gets_crlf() {
    let (proxy, mock) = spawn_mock(Script::default()).await;
    let poster = NntpPoster::connect(&config_for(proxy)).await.unwrap();

    let article = "Newsgroups: alt.test\n\nbody\n";
    poster.post(&Article::new(article)).await.unwrap();

    let transcript = mock.await.unwrap();
    assert_eq!(
        transcript.received_text(),
        format!("POST\r\n{}\r\n.\r\nQUIT\r\n", article)
    );
}

#[tokio::test]
async fn test_post_does_not_dot_stuff() {
    let (proxy, mock) = spawn_mock(Script::default()).await;
    let poster = NntpPoster::connect(&config_for(proxy)).await.unwrap();

    let article = "Newsgroups: alt.test\r\n\r\n.hidden\r\n..two\r\n";
    poster.post(&Article::new(article)).await.unwrap();

    let transcript = mock.await.unwrap();
    let text = transcript.received_text();
    assert!(text.contains("\r\n.hidden\r\n"));
    assert!(text.contains("\r\n..two\r\n"));
    assert!(!text.contains("...two"));
}

#[tokio::test]
async fn test_post_rejected_sends_no_article_bytes() {
    let script = Script::default().post_reply("440 Posting not allowed\r\n");
    let (proxy, mock) = spawn_mock(script).await;
    let poster = NntpPoster::connect(&config_for(proxy)).await.unwrap();

    let err = poster.post(&Article::new(ARTICLE)).await.unwrap_err();
    match &err {
        RelayError::PostNotAccepted(raw) => assert_eq!(raw, "440 Posting not allowed"),
        other => panic!("expected PostNotAccepted, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "server did not accept POST command: 440 Posting not allowed"
    );

    // Session closed without QUIT and without the article
    let transcript = mock.await.unwrap();
    assert_eq!(transcript.received, b"POST\r\n");
}

#[tokio::test]
async fn test_post_unexpected_success_code_is_still_rejection() {
    let script = Script::default().post_reply("240 already posted?\r\n");
    let (proxy, mock) = spawn_mock(script).await;
    let poster = NntpPoster::connect(&config_for(proxy)).await.unwrap();

    let err = poster.post(&Article::new(ARTICLE)).await.unwrap_err();
    assert!(matches!(err, RelayError::PostNotAccepted(_)));
    assert_eq!(mock.await.unwrap().received, b"POST\r\n");
}

#[tokio::test]
async fn test_post_non_numeric_reply_is_rejection() {
    let script = Script::default().post_reply("Go away\r\n");
    let (proxy, mock) = spawn_mock(script).await;
    let poster = NntpPoster::connect(&config_for(proxy)).await.unwrap();

    let err = poster.post(&Article::new(ARTICLE)).await.unwrap_err();
    assert_eq!(err.to_string(), "server did not accept POST command: Go away");
    assert_eq!(mock.await.unwrap().received, b"POST\r\n");
}

#[tokio::test]
async fn test_post_transfer_failed_after_full_article() {
    let script = Script::default().result_reply(Some("441 Posting failed\r\n"));
    let (proxy, mock) = spawn_mock(script).await;
    let poster = NntpPoster::connect(&config_for(proxy)).await.unwrap();

    let err = poster.post(&Article::new(ARTICLE)).await.unwrap_err();
    assert_eq!(err.to_string(), "article transfer failed: 441 Posting failed");

    // Whole article went out, no QUIT after a failure
    let transcript = mock.await.unwrap();
    assert_eq!(
        transcript.received_text(),
        format!("POST\r\n{}.\r\n", ARTICLE)
    );
}

#[tokio::test]
async fn test_post_server_hangs_up_before_result() {
    let script = Script::default().result_reply(None);
    let (proxy, mock) = spawn_mock(script).await;
    let poster = NntpPoster::connect(&config_for(proxy)).await.unwrap();

    let err = poster.post(&Article::new(ARTICLE)).await.unwrap_err();
    assert!(matches!(err.root(), RelayError::ConnectionClosed));
    assert!(err.to_string().starts_with("error reading server response"));
    mock.await.unwrap();
}

#[tokio::test]
async fn test_missing_greeting_aborts_connect() {
    let script = Script::default().greeting(None);
    let (proxy, mock) = spawn_mock(script).await;

    let err = NntpPoster::connect(&config_for(proxy)).await.err().unwrap();
    assert!(matches!(err.root(), RelayError::ConnectionClosed));
    assert_eq!(
        err.to_string(),
        "error reading server greeting: Connection closed"
    );
    assert!(mock.await.unwrap().received.is_empty());
}

#[tokio::test]
async fn test_greeting_content_is_not_interpreted() {
    let script = Script::default().greeting(Some("201 no posting\r\n"));
    let (proxy, mock) = spawn_mock(script).await;

    let poster = NntpPoster::connect(&config_for(proxy)).await.unwrap();
    poster.post(&Article::new(ARTICLE)).await.unwrap();
    mock.await.unwrap();
}
