use crate::prelude::WorkflowError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category shown when the classification call itself failed.
pub const CLASSIFY_FALLBACK: &str = "Sorry, we could not identify this image. Please try again.";

/// Reply of the classification endpoint, or a locally synthesized failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, rename = "stopSlideshow")]
    pub stop_slideshow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClassificationResult {
    pub fn success(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    /// Synthesizes the result shown when the request never produced a usable reply.
    pub fn failure(error: &WorkflowError) -> Self {
        Self {
            category: CLASSIFY_FALLBACK.to_string(),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    /// Parses a reply body. A body carrying neither a category nor an error is rejected.
    pub fn from_body(body: &str) -> Result<Self, WorkflowError> {
        let result: ClassificationResult = serde_json::from_str(body)
            .map_err(|e| WorkflowError::MalformedResponse(e.to_string()))?;
        if result.category.trim().is_empty() && result.error.is_none() {
            return Err(WorkflowError::MalformedResponse(
                "reply carries neither category nor error".into(),
            ));
        }
        Ok(result)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Text for the result panel: the category, or the server's error when it sent no category.
    pub fn headline(&self) -> &str {
        if !self.category.trim().is_empty() {
            &self.category
        } else {
            self.error.as_deref().unwrap_or(CLASSIFY_FALLBACK)
        }
    }

    pub fn probability_label(&self) -> Option<String> {
        self.probability.map(|p| format!("{:.1}%", p))
    }

    /// Whole reply as indented JSON.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.headline().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_reply_with_diagnostics() {
        let body = r#"{"category":"tabby cat","probability":87.26,"stopSlideshow":true,"model":"resnet101"}"#;
        let result = ClassificationResult::from_body(body).unwrap();
        assert_eq!(result.category, "tabby cat");
        assert!(result.stop_slideshow);
        assert_eq!(result.probability_label().as_deref(), Some("87.3%"));
        assert_eq!(result.extra.get("model"), Some(&Value::from("resnet101")));
        assert!(!result.is_error());
    }

    #[test]
    fn server_error_body_is_kept_as_error_result() {
        let result = ClassificationResult::from_body(r#"{"error":"File type not allowed"}"#).unwrap();
        assert!(result.is_error());
        assert_eq!(result.headline(), "File type not allowed");
        assert!(!result.stop_slideshow);
    }

    #[test]
    fn non_json_or_empty_replies_are_malformed() {
        assert!(matches!(
            ClassificationResult::from_body("<html>502</html>"),
            Err(WorkflowError::MalformedResponse(_))
        ));
        assert!(matches!(
            ClassificationResult::from_body("{}"),
            Err(WorkflowError::MalformedResponse(_))
        ));
    }

    #[test]
    fn pretty_prints_the_whole_reply() {
        let body = r#"{"category":"dog","probability":64.5,"stopSlideshow":true,"model":"resnet101"}"#;
        let pretty = ClassificationResult::from_body(body).unwrap().pretty();

        assert!(pretty.contains("\"category\": \"dog\""));
        assert!(pretty.contains("\"probability\": 64.5"));
        assert!(pretty.contains("\"stopSlideshow\": true"));
        assert!(pretty.contains("\"model\": \"resnet101\""));
        assert!(pretty.contains('\n'));
        let reparsed: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(reparsed["model"], Value::from("resnet101"));
    }

    #[test]
    fn failure_carries_fallback_and_detail() {
        let result = ClassificationResult::failure(&WorkflowError::Transport("refused".into()));
        assert_eq!(result.headline(), CLASSIFY_FALLBACK);
        assert_eq!(result.error.as_deref(), Some("transport failure: refused"));
    }
}
