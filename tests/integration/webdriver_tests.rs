//! WebDriver session tests against a mock WebDriver server

use gleaner::browser::{check_status, BrowserSession, Locator, SessionError, WebDriverSession};
use gleaner::config::BrowserConfig;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION: &str = "/session/abc123";

fn ok(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": value }))
}

fn webdriver_error(status: u16, error: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "value": { "error": error, "message": message, "stacktrace": "" }
    }))
}

async fn mount_status(server: &MockServer, ready: bool) {
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ok(json!({ "ready": ready, "message": "ChromeDriver ready for new sessions." })))
        .mount(server)
        .await;
}

async fn mount_new_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ok(json!({ "sessionId": "abc123", "capabilities": {} })))
        .mount(server)
        .await;
}

/// Starts a mock driver that is ready, opens sessions and accepts timeouts
async fn start_driver() -> MockServer {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    mount_new_session(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{}/timeouts", SESSION)))
        .and(body_string_contains("pageLoad"))
        .respond_with(ok(json!(null)))
        .mount(&server)
        .await;

    server
}

/// Serves the tab's current URL, which navigation reads first
async fn mount_current_url(server: &MockServer, url: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{}/url", SESSION)))
        .respond_with(ok(json!(url)))
        .mount(server)
        .await;
}

fn browser_config(server: &MockServer) -> BrowserConfig {
    BrowserConfig {
        webdriver_url: server.uri(),
        headless: true,
        ..BrowserConfig::default()
    }
}

async fn connect(server: &MockServer) -> WebDriverSession {
    WebDriverSession::connect(
        &browser_config(server),
        Duration::from_millis(500),
        Duration::from_millis(10),
    )
    .await
    .unwrap()
}

fn feed() -> Locator {
    Locator::parse("feed", r#"div[role="feed"]"#).unwrap()
}

#[tokio::test]
async fn test_connect_and_close() {
    let server = start_driver().await;
    Mock::given(method("DELETE"))
        .and(path(SESSION))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = connect(&server).await;
    assert!(session.is_open());

    session.close().await.unwrap();
    assert!(!session.is_open());

    // Closing twice is a no-op; other commands report the closed session
    session.close().await.unwrap();
    let result = session.navigate("https://example.com/").await;
    assert!(matches!(result, Err(SessionError::Closed)));
}

#[tokio::test]
async fn test_capabilities_are_sent() {
    let server = start_driver().await;
    let mut session = connect(&server).await;

    let requests = server.received_requests().await.unwrap();
    let new_session = requests
        .iter()
        .find(|r| r.url.path() == "/session")
        .unwrap();
    let body = String::from_utf8_lossy(&new_session.body);
    assert!(body.contains("goog:chromeOptions"));
    assert!(body.contains("--headless=new"));

    session.close().await.ok();
}

#[tokio::test]
async fn test_driver_not_ready() {
    let server = MockServer::start().await;
    mount_status(&server, false).await;

    let result = WebDriverSession::connect(
        &browser_config(&server),
        Duration::from_millis(500),
        Duration::from_millis(10),
    )
    .await;

    assert!(matches!(result, Err(SessionError::NotReady(_))));

    // No session was requested from a driver that is not ready
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() == "/status"));
}

#[tokio::test]
async fn test_check_status_reports_message() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;

    let message = check_status(&format!("{}/", server.uri())).await.unwrap();
    assert_eq!(message, "ChromeDriver ready for new sessions.");
}

#[tokio::test]
async fn test_failed_timeout_setup_releases_session() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    mount_new_session(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("{}/timeouts", SESSION)))
        .respond_with(webdriver_error(400, "invalid argument", "bad timeouts"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(SESSION))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let result = WebDriverSession::connect(
        &browser_config(&server),
        Duration::from_millis(500),
        Duration::from_millis(10),
    )
    .await;

    assert!(matches!(result, Err(SessionError::Command(_))));
}

#[tokio::test]
async fn test_session_not_created() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(webdriver_error(500, "session not created", "Chrome failed to start"))
        .mount(&server)
        .await;

    let result = WebDriverSession::connect(
        &browser_config(&server),
        Duration::from_millis(500),
        Duration::from_millis(10),
    )
    .await;

    assert!(matches!(result, Err(SessionError::NewSession(_))));
}

#[tokio::test]
async fn test_navigate_and_read_document() {
    let server = start_driver().await;
    mount_current_url(&server, "https://maps.example.com/maps/search/pizza").await;
    Mock::given(method("POST"))
        .and(path(format!("{}/url", SESSION)))
        .and(body_string_contains("maps.example.com"))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/source", SESSION)))
        .respond_with(ok(json!(r#"<html><body><div role="feed"></div></body></html>"#)))
        .mount(&server)
        .await;

    let mut session = connect(&server).await;
    session
        .navigate("https://maps.example.com/maps/search/pizza")
        .await
        .unwrap();

    let document = session.current_document().await.unwrap();
    assert_eq!(document.url, "https://maps.example.com/maps/search/pizza");
    assert_eq!(document.count(&feed()), 1);

    session.close().await.ok();
}

#[tokio::test]
async fn test_navigation_timeout_is_classified() {
    let server = start_driver().await;
    mount_current_url(&server, "about:blank").await;
    Mock::given(method("POST"))
        .and(path(format!("{}/url", SESSION)))
        .respond_with(webdriver_error(500, "timeout", "page load timed out"))
        .mount(&server)
        .await;

    let mut session = connect(&server).await;
    let error = session
        .navigate("https://maps.example.com/maps/place/slow")
        .await
        .unwrap_err();

    match &error {
        SessionError::Timeout { what, waited } => {
            assert!(what.contains("maps/place/slow"));
            assert_eq!(*waited, Duration::from_millis(500));
        }
        other => panic!("expected timeout, got {}", other),
    }
    assert!(error.is_timeout());

    session.close().await.ok();
}

#[tokio::test]
async fn test_wait_for_present_element() {
    let server = start_driver().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/element", SESSION)))
        .and(body_string_contains("css selector"))
        .respond_with(ok(json!({ "element-6066-11e4-a52e-4f735466cecf": "e-1" })))
        .mount(&server)
        .await;

    let mut session = connect(&server).await;
    session
        .wait_for(&feed(), Duration::from_millis(200))
        .await
        .unwrap();

    session.close().await.ok();
}

#[tokio::test]
async fn test_wait_for_times_out() {
    let server = start_driver().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/element", SESSION)))
        .respond_with(webdriver_error(404, "no such element", "Unable to locate element"))
        .mount(&server)
        .await;

    let mut session = connect(&server).await;
    let error = session
        .wait_for(&feed(), Duration::from_millis(60))
        .await
        .unwrap_err();

    match error {
        SessionError::Timeout { what, waited } => {
            assert_eq!(what, r#"div[role="feed"]"#);
            assert_eq!(waited, Duration::from_millis(60));
        }
        other => panic!("expected timeout, got {}", other),
    }

    // More than one poll happened before giving up
    let polls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with("/element"))
        .count();
    assert!(polls > 1);

    session.close().await.ok();
}

#[tokio::test]
async fn test_scroll_step_runs_script() {
    let server = start_driver().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/execute/sync", SESSION)))
        .and(body_string_contains("scrollTop"))
        .and(body_string_contains("1200"))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = connect(&server).await;
    session.invoke_scroll_step(&feed(), 1200).await.unwrap();

    session.close().await.ok();
}
