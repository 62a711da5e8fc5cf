//! HTTP probing and status classification

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use tracing::debug;

/// Errors constructing the HTTP probe
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Outcome of one HTTP request
#[derive(Debug, Clone, Default)]
pub struct HttpOutcome {
    /// Response status, if a response arrived
    pub status: Option<u16>,
    /// Response body, when requested and readable
    pub body: Option<String>,
    /// Transport error (connect, timeout, body read)
    pub error: Option<String>,
}

impl HttpOutcome {
    /// Classifies the response status
    pub fn class(&self) -> StatusClass {
        classify_status(self.status)
    }
}

/// Classification of an endpoint's status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200
    Ok,
    /// 404
    NotFound,
    /// 500
    ServerError,
    /// Anything else, including no status at all
    Unexpected(Option<u16>),
}

impl StatusClass {
    pub fn is_ok(&self) -> bool {
        matches!(self, StatusClass::Ok)
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusClass::Ok => write!(f, "HTTP 200 - Endpoint working"),
            StatusClass::NotFound => write!(f, "HTTP 404 - Endpoint not found"),
            StatusClass::ServerError => write!(f, "HTTP 500 - Server error"),
            StatusClass::Unexpected(Some(code)) => write!(f, "HTTP {} - Unexpected response", code),
            StatusClass::Unexpected(None) => write!(f, "HTTP (no status) - Unexpected response"),
        }
    }
}

/// Maps a status code onto the classes the endpoint check reports
pub fn classify_status(status: Option<u16>) -> StatusClass {
    match status {
        Some(200) => StatusClass::Ok,
        Some(404) => StatusClass::NotFound,
        Some(500) => StatusClass::ServerError,
        other => StatusClass::Unexpected(other),
    }
}

/// Issues single, unretried HTTP requests
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Creates a probe whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .user_agent(concat!("pfmt-diagnose/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Sends a request and reports only the status code
    pub async fn status(&self, method: Method, url: &str) -> HttpOutcome {
        self.send(method, url, false).await
    }

    /// Sends a request and reads the body as text
    pub async fn fetch(&self, method: Method, url: &str) -> HttpOutcome {
        self.send(method, url, true).await
    }

    async fn send(&self, method: Method, url: &str, read_body: bool) -> HttpOutcome {
        let start = Instant::now();
        let mut request = self.client.request(method.clone(), url);
        if method == Method::POST {
            request = request.header(CONTENT_TYPE, "application/json");
        }

        let outcome = match request.send().await {
            Ok(response) => {
                let status = Some(response.status().as_u16());
                if read_body {
                    match response.text().await {
                        Ok(body) => HttpOutcome {
                            status,
                            body: Some(body),
                            error: None,
                        },
                        Err(e) => HttpOutcome {
                            status,
                            body: None,
                            error: Some(e.to_string()),
                        },
                    }
                } else {
                    HttpOutcome {
                        status,
                        ..Default::default()
                    }
                }
            }
            Err(e) => HttpOutcome {
                error: Some(e.to_string()),
                ..Default::default()
            },
        };

        debug!(
            %method,
            url,
            status = ?outcome.status,
            elapsed = ?start.elapsed(),
            "HTTP request finished"
        );

        outcome
    }
}
