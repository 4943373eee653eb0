//! Mapping from engine results to what the output pane shows.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Separator written between partial output and the error that ended a run.
pub const ERROR_SEPARATOR: &str = "\n--- Error ---\n";

/// Placeholder shown for a successful run that printed nothing.
pub const NO_OUTPUT: &str = "(no output)";

/// Decoded engine response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self { output: None, error: Some(error.into()) }
    }

    fn output_text(&self) -> &str {
        self.output.as_deref().unwrap_or("")
    }

    /// An empty `error` string counts as no error.
    fn error_text(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputClass {
    #[default]
    Plain,
    Error,
}

impl OutputClass {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Plain => "",
            Self::Error => "error",
        }
    }
}

/// The (text, class) pair shown after one run request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedOutcome {
    pub text: String,
    pub class: OutputClass,
    /// The run ended in an error. Independent of `class`: partial output
    /// followed by an error is styled Plain but still failed.
    pub failed: bool,
}

impl RenderedOutcome {
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_error(&self) -> bool {
        self.class == OutputClass::Error
    }

    pub fn internal_error(message: impl std::fmt::Display) -> Self {
        Self { text: format!("Internal error: {}", message), class: OutputClass::Error, failed: true }
    }
}

pub fn decode(raw: &str) -> Result<ExecutionResult, DecodeError> {
    Ok(serde_json::from_str(raw)?)
}

pub fn render(result: &ExecutionResult) -> RenderedOutcome {
    let output = result.output_text();
    match result.error_text() {
        None => RenderedOutcome {
            text: if output.is_empty() { NO_OUTPUT.to_string() } else { output.to_string() },
            class: OutputClass::Plain,
            failed: false,
        },
        Some(error) if output.is_empty() => RenderedOutcome {
            text: error.to_string(),
            class: OutputClass::Error,
            failed: true,
        },
        // Partial output keeps the plain style even though the run failed.
        Some(error) => RenderedOutcome {
            text: format!("{}{}{}", output, ERROR_SEPARATOR, error),
            class: OutputClass::Plain,
            failed: true,
        },
    }
}

/// Decode and render a raw entry point response.
pub fn render_response(raw: &str) -> RenderedOutcome {
    match decode(raw) {
        Ok(result) => render(&result),
        Err(err) => RenderedOutcome::internal_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_output() {
        let out = render_response(r#"{"output":"3\n"}"#);
        assert_eq!(out.text, "3\n");
        assert_eq!(out.class, OutputClass::Plain);
    }

    #[test]
    fn test_success_without_output_uses_placeholder() {
        assert_eq!(render_response(r#"{"output":""}"#).text, "(no output)");
        assert_eq!(render_response("{}").text, "(no output)");
    }

    #[test]
    fn test_pure_error() {
        let out = render_response(r#"{"error":"boom"}"#);
        assert_eq!(out.text, "boom");
        assert_eq!(out.class, OutputClass::Error);
        assert_eq!(out.class.css_class(), "error");
    }

    #[test]
    fn test_partial_output_then_error() {
        let out = render_response(r#"{"output":"2\n","error":"boom"}"#);
        assert_eq!(out.text, "2\n\n--- Error ---\nboom");
        assert_eq!(out.class, OutputClass::Plain);
        assert!(out.failed);
    }

    #[test]
    fn test_empty_error_means_success() {
        let out = render_response(r#"{"output":"ok\n","error":""}"#);
        assert_eq!(out.text, "ok\n");
        assert!(!out.is_error());
        assert!(!out.failed);
    }

    #[test]
    fn test_malformed_response_is_internal_error() {
        let out = render_response("Hiss! not json");
        assert!(out.text.starts_with("Internal error: "), "Got: {}", out.text);
        assert!(out.text.len() > "Internal error: ".len());
        assert!(out.is_error());
    }

    #[test]
    fn test_wrong_shape_is_internal_error() {
        let out = render_response(r#"{"output": 42}"#);
        assert!(out.text.starts_with("Internal error: "));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let out = render_response(r#"{"output":"hi","elapsed_ms":3}"#);
        assert_eq!(out.text, "hi");
    }

    #[test]
    fn test_serialize_omits_absent_error() {
        let json = serde_json::to_string(&ExecutionResult { output: Some("x".into()), error: None }).unwrap();
        assert_eq!(json, r#"{"output":"x"}"#);
    }
}
