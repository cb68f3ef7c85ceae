use batchfetch::capability::DEFAULT_USER_AGENT;
use batchfetch::{BatchController, Capability, Configuration, HttpCapability, execute};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn capability() -> HttpCapability {
    HttpCapability::new("batchfetch-test").unwrap()
}

#[tokio::test]
async fn successful_get_returns_body_and_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/page", mock_server.uri());
    let response = capability().fetch(&url).await.unwrap();

    assert!(response.succeeded);
    assert_eq!(response.status_code, Some(200));
    assert_eq!(response.payload.as_deref(), Some(&b"hello world"[..]));
    assert_eq!(response.final_url.as_deref(), Some(url.as_str()));
}

#[tokio::test]
async fn error_status_is_an_ordinary_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = format!("{}/missing", mock_server.uri());
    let response = capability().fetch(&url).await.unwrap();

    assert!(!response.succeeded);
    assert_eq!(response.status_code, Some(404));
    assert_eq!(response.error.as_deref(), Some("HTTP 404 Not Found"));
}

#[tokio::test]
async fn connection_refused_is_raised() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let url = format!("http://127.0.0.1:{port}/gone");

    let result = capability().fetch(&url).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn batch_over_http_mixes_success_failure_and_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let urls = vec![
        format!("{base}/ok"),
        format!("{base}/broken"),
        format!("{base}/slow"),
        format!("{base}/ok"),
    ];
    let timeout = Duration::from_millis(300);
    let http = Arc::new(capability());
    let summary = execute(urls, http, Configuration::new(2, timeout).unwrap())
        .await
        .unwrap();

    assert_eq!((summary.total, summary.succeeded, summary.failed), (4, 2, 2));
    assert_eq!(summary.outcomes[1].status_code, Some(500));
    assert_eq!(summary.outcomes[2].error.as_deref(), Some("timeout"));
    assert!(summary.outcomes[3].succeeded);
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn slow_server_is_always_reported_as_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let urls: Vec<String> = (0..40).map(|i| format!("{base}/p{i}")).collect();

    // Same wiring as the `run` command.
    let http = Arc::new(HttpCapability::new(DEFAULT_USER_AGENT).unwrap());
    let controller =
        BatchController::new(Configuration::new(8, Duration::from_millis(200)).unwrap(), None)
            .unwrap();
    let summary = controller.execute(urls, http).await;

    assert_eq!((summary.total, summary.failed), (40, 40));
    for outcome in &summary.outcomes {
        assert_eq!(
            outcome.error.as_deref(),
            Some("timeout"),
            "{} was not reported as a timeout",
            outcome.identifier()
        );
        assert_eq!(outcome.status_code, None);
    }
    assert_eq!(controller.get_metrics().items_timed_out, 40);
}
