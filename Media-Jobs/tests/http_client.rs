mod test_helpers;

use media_jobs::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::StubServer;

fn http() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn client(server: &StubServer) -> InferenceClient {
    InferenceClient::new(format!("{}/api/", server.base_url))
        .with_http_client(http())
        .with_token("sk-test")
}

#[tokio::test]
async fn test_create_job_request_shape() {
    let server = StubServer::start(vec![(201, r#"{"id":"job-1","status":"starting"}"#)]).await;
    let body = GenerationRequest::new("a fox in snow")
        .duration(6)
        .resolution(Resolution::P1080)
        .to_body()
        .unwrap();

    let handle = client(&server).create_job(&body).await.unwrap();
    assert_eq!(handle.id, "job-1");
    assert_eq!(handle.status, JobStatus::Queued);

    let seen = server.recorded();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/api/predictions");
    assert_eq!(seen[0].header("authorization"), Some("Bearer sk-test"));

    let sent: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(sent["prompt"], "a fox in snow");
    assert_eq!(sent["duration"], 6);
    assert_eq!(sent["resolution"], "1080p");
    assert_eq!(sent["enhance_prompt"], true);
}

#[tokio::test]
async fn test_create_job_rejection_detail() {
    let server = StubServer::start(vec![(422, r#"{"detail":"Duration not supported"}"#)]).await;
    let body = GenerationRequest::new("a fox").to_body().unwrap();

    let err = client(&server).create_job(&body).await.unwrap_err();
    match err {
        JobError::Submission { status, detail } => {
            assert_eq!(status, 422);
            assert_eq!(detail, "Duration not supported");
        }
        other => panic!("expected submission error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_job_status_list_output() {
    let server = StubServer::start(vec![(
        200,
        r#"{"id":"job-2","status":"succeeded","output":["https://cdn/x.png","https://cdn/x.MP4?sig=1"],"logs":"step 30/30"}"#,
    )])
    .await;

    let report = client(&server).job_status("job-2").await.unwrap();
    assert_eq!(report.id, "job-2");
    assert_eq!(report.status, JobStatus::Succeeded);
    assert_eq!(report.output.as_deref(), Some("https://cdn/x.MP4?sig=1"));
    assert_eq!(report.logs.as_deref(), Some("step 30/30"));
    assert_eq!(report.error, None);

    let seen = server.recorded();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/api/predictions/job-2");
}

#[tokio::test]
async fn test_job_status_keeps_id_in_one_segment() {
    let server = StubServer::start(vec![(200, r#"{"status":"processing"}"#)]).await;

    let report = client(&server).job_status("a/../../x?b").await.unwrap();
    assert_eq!(report.id, "a/../../x?b");
    assert_eq!(report.status, JobStatus::Running);

    let seen = server.recorded();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/api/predictions/a%2F..%2F..%2Fx%3Fb");
}

#[tokio::test]
async fn test_job_status_server_error() {
    let server = StubServer::start(vec![(500, r#"{"detail":"database down"}"#)]).await;

    let err = client(&server).job_status("job-3").await.unwrap_err();
    match err {
        JobError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database down");
        }
        other => panic!("expected http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_poller_surfaces_transport_failure() {
    let server = StubServer::start(vec![
        (200, r#"{"id":"job-4","status":"processing"}"#),
        (502, "bad gateway"),
    ])
    .await;
    let poller =
        StatusPoller::new(Arc::new(client(&server))).with_interval(Duration::from_millis(10));

    let mut updates = 0;
    let err = poller.poll("job-4", |_| updates += 1).await.unwrap_err();
    assert!(matches!(err, JobError::PollingTransport { ref job_id, .. } if job_id == "job-4"));
    assert_eq!(updates, 1);
    assert_eq!(server.recorded().len(), 2);
}

#[tokio::test]
async fn test_full_run_into_file_library() {
    let server = StubServer::start(vec![
        (201, r#"{"id":"job-5","status":"starting"}"#),
        (200, r#"{"id":"job-5","status":"starting"}"#),
        (200, r#"{"id":"job-5","status":"processing","logs":"50%"}"#),
        (200, r#"{"id":"job-5","status":"succeeded","output":{"video":"https://cdn/job-5.mp4"}}"#),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let library = Arc::new(ResultCache::new(FileStorage::new(dir.path())));
    let runner = JobRunner::new(client(&server), Arc::clone(&library))
        .with_poll_interval(Duration::from_millis(10));

    let request = GenerationRequest::new("rain on a tin roof").duration(3);
    let report = runner.run(&request, |_| {}).await.unwrap();
    assert_eq!(report.handle.id, "job-5");
    assert_eq!(report.outcome.url(), Some("https://cdn/job-5.mp4"));

    // A fresh cache over the same directory sees the saved item.
    let reopened = ResultCache::new(FileStorage::new(dir.path()));
    let items = reopened.load();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "job-5");
    assert_eq!(items[0].duration, 3);
    assert_eq!(items[0].resolution, Resolution::P720);
    assert_eq!(items[0].url, "https://cdn/job-5.mp4");
}

#[tokio::test]
async fn test_proxy_passes_backend_answer_through() {
    let server = StubServer::start(vec![(404, r#"{"detail":"workflow not found"}"#)]).await;
    let proxy = BackendProxy::new(format!("{}/v1/", server.base_url))
        .with_http_client(http())
        .with_token("backend-secret");

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer browser-token"));
    headers.insert("x-tenant", HeaderValue::from_static("acme"));
    let req = ProxyRequest::new(Method::GET, "/workflows/42").with_headers(headers);

    let resp = proxy.forward(req).await.unwrap();
    assert_eq!(resp.status, 404);
    assert!(!resp.is_success());
    assert_eq!(resp.body, br#"{"detail":"workflow not found"}"#.to_vec());
    assert_eq!(
        resp.headers.get("x-upstream").and_then(|v| v.to_str().ok()),
        Some("stub")
    );
    assert!(resp.headers.get("connection").is_none());

    let seen = server.recorded();
    assert_eq!(seen[0].path, "/v1/workflows/42");
    assert_eq!(seen[0].header("authorization"), Some("Bearer backend-secret"));
    assert_eq!(seen[0].header("x-tenant"), Some("acme"));
}

#[tokio::test]
async fn test_proxy_relays_redirect() {
    let server = StubServer::start_with_headers(vec![
        (302, "", vec![("Location", "/login")]),
        (200, "login page", Vec::new()),
    ])
    .await;
    let proxy = BackendProxy::new(format!("{}/v1", server.base_url)).with_token("backend-secret");

    let req = ProxyRequest::new(Method::POST, "/workflows/1").with_body("{}");
    let resp = proxy.forward(req).await.unwrap();
    assert_eq!(resp.status, 302);
    assert_eq!(
        resp.headers.get("location").and_then(|v| v.to_str().ok()),
        Some("/login")
    );
    assert!(resp.body.is_empty());

    let seen = server.recorded();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/v1/workflows/1");
}

#[tokio::test]
async fn test_proxy_forwards_body() {
    let server = StubServer::start(vec![(201, r#"{"id":7}"#)]).await;
    let proxy = BackendProxy::new(&server.base_url).with_http_client(http());

    let req = ProxyRequest::new(Method::POST, "comments").with_body(r#"{"comment":"hi"}"#);
    let resp = proxy.forward(req).await.unwrap();
    assert_eq!(resp.status, 201);
    assert!(resp.is_success());

    let seen = server.recorded();
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/comments");
    assert_eq!(seen[0].body, r#"{"comment":"hi"}"#);
    assert_eq!(seen[0].header("authorization"), None);
}
