#![allow(dead_code)]

use media_jobs::*;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One scripted answer to a status query.
#[derive(Debug, Clone)]
pub enum Step {
    Report {
        status: &'static str,
        output: Value,
        error: Option<&'static str>,
    },
    TransportError,
}

/// In-memory inference backend that plays back a script of status words.
/// Once the script runs out every query answers `running`.
pub struct FakeBackend {
    pub job_id: String,
    pub create_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub last_body: Mutex<Option<CreateJobBody>>,
    script: Mutex<VecDeque<Step>>,
    reject: Option<(u16, String)>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            job_id: uuid::Uuid::new_v4().to_string(),
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            last_body: Mutex::new(None),
            script: Mutex::new(VecDeque::new()),
            reject: None,
        }
    }

    pub fn then(self, status: &'static str, output: Value) -> Self {
        self.push(Step::Report {
            status,
            output,
            error: None,
        })
    }

    pub fn then_error(self, status: &'static str, message: &'static str) -> Self {
        self.push(Step::Report {
            status,
            output: Value::Null,
            error: Some(message),
        })
    }

    pub fn then_transport_error(self) -> Self {
        self.push(Step::TransportError)
    }

    pub fn rejecting(mut self, status: u16, detail: &str) -> Self {
        self.reject = Some((status, detail.to_string()));
        self
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn push(self, step: Step) -> Self {
        self.script.lock().unwrap().push_back(step);
        self
    }
}

impl InferenceBackend for FakeBackend {
    async fn create_job(&self, body: &CreateJobBody) -> Result<JobHandle> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().unwrap() = Some(body.clone());
        if let Some((status, detail)) = &self.reject {
            return Err(JobError::Submission {
                status: *status,
                detail: detail.clone(),
            });
        }
        Ok(JobHandle {
            id: self.job_id.clone(),
            status: JobStatus::Running,
        })
    }

    async fn job_status(&self, id: &str) -> Result<StatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Report {
                status,
                output,
                error,
            }) => Ok(StatusReport {
                id: id.to_string(),
                status: JobStatus::from_provider(status),
                output: normalize_output(&output),
                logs: None,
                error: error.map(String::from),
            }),
            Some(Step::TransportError) => Err(JobError::Http {
                status: 503,
                body: "upstream unavailable".into(),
            }),
            None => Ok(StatusReport {
                id: id.to_string(),
                status: JobStatus::Running,
                output: None,
                logs: None,
                error: None,
            }),
        }
    }
}

/// A request as the stub server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// One canned answer: status, body, extra response headers.
pub type StubResponse = (u16, &'static str, Vec<(&'static str, &'static str)>);

/// Minimal HTTP/1.1 server answering with canned responses in order, one
/// per connection.
pub struct StubServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        Self::start_with_headers(
            responses
                .into_iter()
                .map(|(status, body)| (status, body, Vec::new()))
                .collect(),
        )
        .await
    }

    pub async fn start_with_headers(responses: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let mut responses: VecDeque<_> = responses.into();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (status, body, extra) = responses.pop_front().unwrap_or((
                    500,
                    r#"{"detail":"stub exhausted"}"#,
                    Vec::new(),
                ));
                serve_one(stream, status, body, &extra, &recorded).await;
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve_one(
    mut stream: TcpStream,
    status: u16,
    body: &str,
    extra: &[(&str, &str)],
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> Option<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_in = String::from_utf8_lossy(&buf[header_end..]).to_string();

    // Record before answering so the client never sees a reply first.
    recorded.lock().unwrap().push(RecordedRequest {
        method,
        path,
        headers,
        body: body_in,
    });

    let extra_headers: String = extra
        .iter()
        .map(|(k, v)| format!("{}: {}\r\n", k, v))
        .collect();
    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nX-Upstream: stub\r\n{}Connection: close\r\n\r\n{}",
        status,
        body.len(),
        extra_headers,
        body
    );
    stream.write_all(response.as_bytes()).await.ok()?;
    stream.shutdown().await.ok()?;
    Some(())
}
