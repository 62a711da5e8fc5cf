//! End-to-end wizard test: initialization and template listing

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::diagnostics::check::{CheckResult, CheckStatus, SystemCheck};
use crate::diagnostics::context::ProbeContext;

/// Number of templates echoed from the listing
pub const TEMPLATE_PREVIEW_LEN: usize = 3;

/// How the wizard initialization endpoint answered
#[derive(Debug, Clone, PartialEq)]
pub enum InitOutcome {
    /// `success` was truthy
    Initialized(Value),
    /// `success` missing or falsy, with the `message` field if any
    Failed {
        response: Value,
        message: Option<String>,
    },
    /// Valid JSON that is not an object
    UnexpectedShape(Value),
    /// Body did not decode; carries the raw body
    InvalidJson(String),
}

/// Name and category of one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub name: String,
    pub category: String,
}

/// How the templates endpoint answered
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatesOutcome {
    /// `success` truthy and a non-empty `templates` array
    Found {
        count: usize,
        preview: Vec<TemplateSummary>,
    },
    /// Anything else that decoded as an object
    NoTemplates,
    UnexpectedShape(Value),
    InvalidJson(String),
}

/// JSON truthiness: null, false, zero, and empty strings/arrays/objects are
/// falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Field rendered as plain text: strings unquoted, other values as JSON
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_is_truthy(response: &Value, field: &str) -> bool {
    response.get(field).is_some_and(is_truthy)
}

pub fn interpret_init(body: &str) -> InitOutcome {
    let response: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return InitOutcome::InvalidJson(body.to_string()),
    };
    if !response.is_object() {
        return InitOutcome::UnexpectedShape(response);
    }

    if field_is_truthy(&response, "success") {
        InitOutcome::Initialized(response)
    } else {
        let message = response.get("message").map(field_text);
        InitOutcome::Failed { response, message }
    }
}

pub fn interpret_templates(body: &str) -> TemplatesOutcome {
    let response: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return TemplatesOutcome::InvalidJson(body.to_string()),
    };
    if !response.is_object() {
        return TemplatesOutcome::UnexpectedShape(response);
    }
    if !field_is_truthy(&response, "success") {
        return TemplatesOutcome::NoTemplates;
    }

    match response.get("templates") {
        Some(Value::Array(templates)) if !templates.is_empty() => TemplatesOutcome::Found {
            count: templates.len(),
            preview: templates
                .iter()
                .take(TEMPLATE_PREVIEW_LEN)
                .map(|template| TemplateSummary {
                    name: template
                        .get("name")
                        .map(field_text)
                        .unwrap_or_else(|| "Unknown".to_string()),
                    category: template
                        .get("category")
                        .map(field_text)
                        .unwrap_or_else(|| "No category".to_string()),
                })
                .collect(),
        },
        _ => TemplatesOutcome::NoTemplates,
    }
}

/// Exercises the wizard API the way the frontend does
pub struct WizardCheck;

impl WizardCheck {
    pub fn new() -> Self {
        Self
    }

    /// Sends the request and prints the raw outcome; returns the body when
    /// there is one to interpret
    async fn request(
        &self,
        ctx: &ProbeContext,
        method: Method,
        path: &str,
        description: &str,
    ) -> Option<String> {
        let url = ctx.config.backend_endpoint(path);
        ctx.blank();
        ctx.say(format!("🔍 {}", description));
        ctx.say(format!("Request: {} {}", method, url));

        let outcome = ctx.http.fetch(method, &url).await;
        if let Some(error) = outcome.error {
            ctx.say(format!("❌ Request failed: {}", error));
            return None;
        }
        if let Some(status) = outcome.status {
            ctx.say(format!("Status: {}", status));
        }

        let body = outcome.body.unwrap_or_default();
        let body = body.trim();
        if body.is_empty() {
            ctx.say("⚠️  Empty response body");
            return None;
        }
        ctx.say(format!("Output: {}", body));
        Some(body.to_string())
    }

    fn report_init(&self, ctx: &ProbeContext, outcome: InitOutcome) -> bool {
        match outcome {
            InitOutcome::Initialized(response) => {
                self.print_response(ctx, &response);
                ctx.say("✅ Wizard initialization successful");
                true
            }
            InitOutcome::Failed { response, message } => {
                self.print_response(ctx, &response);
                ctx.say("❌ Wizard initialization failed");
                if let Some(message) = message {
                    ctx.say(format!("Error message: {}", message));
                }
                false
            }
            InitOutcome::UnexpectedShape(response) => {
                ctx.say(format!("❌ Unexpected response shape: {}", response));
                false
            }
            InitOutcome::InvalidJson(raw) => {
                ctx.say(format!("❌ Invalid JSON response: {}", raw));
                false
            }
        }
    }

    fn report_templates(&self, ctx: &ProbeContext, outcome: TemplatesOutcome) -> bool {
        match outcome {
            TemplatesOutcome::Found { count, preview } => {
                ctx.say(format!("✅ Found {} templates", count));
                for template in preview {
                    ctx.say(format!("   - {} ({})", template.name, template.category));
                }
                true
            }
            TemplatesOutcome::NoTemplates => {
                ctx.say("❌ No templates found or error occurred");
                false
            }
            TemplatesOutcome::UnexpectedShape(response) => {
                ctx.say(format!("❌ Unexpected response shape: {}", response));
                false
            }
            TemplatesOutcome::InvalidJson(raw) => {
                ctx.say(format!("❌ Invalid JSON response: {}", raw));
                false
            }
        }
    }

    fn print_response(&self, ctx: &ProbeContext, response: &Value) {
        ctx.say("📋 Wizard Response:");
        let pretty = serde_json::to_string_pretty(response).unwrap_or_else(|_| response.to_string());
        for line in pretty.lines() {
            ctx.say(line);
        }
    }
}

impl Default for WizardCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemCheck for WizardCheck {
    fn name(&self) -> &'static str {
        "Wizard"
    }

    fn banner(&self) -> &'static str {
        "🧙 WIZARD FUNCTIONALITY TESTING"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Wizard initialization and template listing responses")
    }

    async fn check(&self, ctx: &ProbeContext) -> CheckResult {
        ctx.blank();
        ctx.say("🔍 Testing wizard initialization with full response...");
        let initialized = match self
            .request(ctx, Method::POST, "/api/wizard/init", "Wizard init with full response")
            .await
        {
            Some(body) => self.report_init(ctx, interpret_init(&body)),
            None => false,
        };

        ctx.blank();
        ctx.say("🔍 Testing template fetching...");
        let templates = match self
            .request(ctx, Method::GET, "/api/wizard/templates", "Fetching wizard templates")
            .await
        {
            Some(body) => self.report_templates(ctx, interpret_templates(&body)),
            None => false,
        };

        let succeeded = usize::from(initialized) + usize::from(templates);
        let message = match (initialized, templates) {
            (true, true) => "initialization and templates working",
            (true, false) => "initialization working, templates unavailable",
            (false, true) => "initialization failed, templates working",
            (false, false) => "initialization and templates failing",
        };

        CheckResult::with_status(CheckStatus::from_counts(succeeded, 2), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_init_success() {
        assert_eq!(
            interpret_init(r#"{"success": true}"#),
            InitOutcome::Initialized(json!({"success": true}))
        );
    }

    #[test]
    fn test_init_failure_echoes_message() {
        let outcome = interpret_init(r#"{"success": false, "message": "db error"}"#);

        match outcome {
            InitOutcome::Failed { message, .. } => assert_eq!(message.as_deref(), Some("db error")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_init_failure_without_message() {
        let outcome = interpret_init(r#"{"error": "boom"}"#);
        assert!(matches!(outcome, InitOutcome::Failed { message: None, .. }));
    }

    #[test]
    fn test_init_invalid_json_keeps_raw_body() {
        assert_eq!(
            interpret_init("<html>Bad Gateway</html>"),
            InitOutcome::InvalidJson("<html>Bad Gateway</html>".to_string())
        );
    }

    #[test]
    fn test_init_non_object() {
        assert!(matches!(
            interpret_init("[1, 2]"),
            InitOutcome::UnexpectedShape(_)
        ));
    }

    #[test]
    fn test_templates_preview_first_three() {
        let body = json!({
            "success": true,
            "templates": [
                {"name": "Capital Project", "category": "capital"},
                {"name": "Maintenance"},
                {"category": "study"},
                {"name": "Fourth", "category": "other"},
            ]
        })
        .to_string();

        match interpret_templates(&body) {
            TemplatesOutcome::Found { count, preview } => {
                assert_eq!(count, 4);
                assert_eq!(preview.len(), 3);
                assert_eq!(preview[0].name, "Capital Project");
                assert_eq!(preview[1].category, "No category");
                assert_eq!(preview[2].name, "Unknown");
            }
            other => panic!("expected templates, got {:?}", other),
        }
    }

    #[test]
    fn test_templates_empty_or_unsuccessful() {
        assert_eq!(
            interpret_templates(r#"{"success": true, "templates": []}"#),
            TemplatesOutcome::NoTemplates
        );
        assert_eq!(
            interpret_templates(r#"{"success": false, "templates": [{"name": "x"}]}"#),
            TemplatesOutcome::NoTemplates
        );
        assert!(matches!(
            interpret_templates("not json"),
            TemplatesOutcome::InvalidJson(_)
        ));
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!([])));
    }
}
