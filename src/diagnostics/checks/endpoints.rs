//! API endpoint status probes

use async_trait::async_trait;
use reqwest::Method;

use crate::config::DiagnosticConfig;
use crate::diagnostics::check::{CheckResult, CheckStatus, SystemCheck};
use crate::diagnostics::context::ProbeContext;
use crate::probe::{HttpOutcome, StatusClass};

/// Backend paths probed, with their HTTP method and description
const BACKEND_ENDPOINTS: [(&str, &str, &str); 4] = [
    ("GET", "/health", "Backend health check"),
    ("GET", "/api/health", "API health check"),
    ("POST", "/api/wizard/init", "Wizard initialization endpoint"),
    ("GET", "/api/wizard/templates", "Wizard templates endpoint"),
];

/// One endpoint to probe for its status code
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: Method,
    pub url: String,
    pub description: String,
}

/// The four backend endpoints followed by the frontend root
pub fn endpoints(config: &DiagnosticConfig) -> Vec<Endpoint> {
    let mut list: Vec<Endpoint> = BACKEND_ENDPOINTS
        .iter()
        .map(|(method, path, description)| Endpoint {
            method: if *method == "POST" { Method::POST } else { Method::GET },
            url: config.backend_endpoint(path),
            description: description.to_string(),
        })
        .collect();

    list.push(Endpoint {
        method: Method::GET,
        url: config.frontend_url.clone(),
        description: "Frontend availability".to_string(),
    });

    list
}

/// Line printed for a classified status
pub fn status_line(class: StatusClass) -> String {
    match class {
        StatusClass::Ok => format!("✅ {}", class),
        StatusClass::NotFound | StatusClass::ServerError => format!("❌ {}", class),
        StatusClass::Unexpected(_) => format!("⚠️  {}", class),
    }
}

/// Probes each endpoint once and classifies its status code
pub struct EndpointCheck;

impl EndpointCheck {
    pub fn new() -> Self {
        Self
    }

    fn report(&self, ctx: &ProbeContext, outcome: &HttpOutcome) -> StatusClass {
        if let Some(error) = &outcome.error {
            ctx.say(format!("❌ Request failed: {}", error));
        }
        let class = outcome.class();
        ctx.say(status_line(class));
        class
    }
}

impl Default for EndpointCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemCheck for EndpointCheck {
    fn name(&self) -> &'static str {
        "API Endpoints"
    }

    fn banner(&self) -> &'static str {
        "🌐 API ENDPOINT TESTING"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Status codes of backend and frontend endpoints")
    }

    async fn check(&self, ctx: &ProbeContext) -> CheckResult {
        let endpoints = endpoints(&ctx.config);
        let mut working = 0;
        let mut broken = Vec::new();

        for endpoint in &endpoints {
            ctx.blank();
            ctx.say(format!("🔍 {}", endpoint.description));
            ctx.say(format!("Request: {} {}", endpoint.method, endpoint.url));

            let outcome = ctx.http.status(endpoint.method.clone(), &endpoint.url).await;
            if self.report(ctx, &outcome).is_ok() {
                working += 1;
            } else {
                broken.push(endpoint.description.as_str());
            }
        }

        let status = CheckStatus::from_counts(working, endpoints.len());
        if broken.is_empty() {
            CheckResult::with_status(status, format!("{} endpoints working", working))
        } else {
            CheckResult::with_status(
                status,
                format!("{}/{} endpoints working", working, endpoints.len()),
            )
            .with_details(broken.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let list = endpoints(&DiagnosticConfig::default());
        let urls: Vec<_> = list.iter().map(|e| e.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                "http://localhost:3002/health",
                "http://localhost:3002/api/health",
                "http://localhost:3002/api/wizard/init",
                "http://localhost:3002/api/wizard/templates",
                "http://localhost:3000",
            ]
        );
        assert_eq!(list[2].method, Method::POST);
        assert!(list.iter().filter(|e| e.method == Method::POST).count() == 1);
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(status_line(StatusClass::Ok), "✅ HTTP 200 - Endpoint working");
        assert_eq!(status_line(StatusClass::NotFound), "❌ HTTP 404 - Endpoint not found");
        assert_eq!(status_line(StatusClass::ServerError), "❌ HTTP 500 - Server error");
        assert_eq!(
            status_line(StatusClass::Unexpected(Some(503))),
            "⚠️  HTTP 503 - Unexpected response"
        );
    }
}
