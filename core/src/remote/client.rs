use crate::config::WidgetConfig;
use crate::interface::{ClassificationResult, Upload, WakeReply};
use crate::prelude::{Classifier, WorkflowError, WorkflowResult};
use reqwest::multipart::{Form, Part};
use reqwest::Url;

/// Multipart field the classification service reads the image from.
pub const UPLOAD_FIELD: &str = "image";

/// HTTP client for the remote classification service.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ClassifierClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &WidgetConfig) -> WorkflowResult<Self> {
        Ok(Self::new(config.endpoint()?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn post_image(&self, upload: Upload) -> WorkflowResult<ClassificationResult> {
        let part = Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime)
            .map_err(|e| WorkflowError::Transport(e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(self.base_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| WorkflowError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WorkflowError::Transport(e.to_string()))?;
        if !status.is_success() {
            log::warn!("classification for {} answered {}", upload.file_name, status);
        }

        ClassificationResult::from_body(&body).map_err(|err| match err {
            WorkflowError::MalformedResponse(detail) => {
                WorkflowError::MalformedResponse(format!("{}: {}", status, detail))
            }
            other => other,
        })
    }

    async fn get_status(&self) -> WorkflowResult<WakeReply> {
        let response = self
            .http
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(|e| WorkflowError::Transport(e.to_string()))?;
        response
            .json::<WakeReply>()
            .await
            .map_err(|e| WorkflowError::MalformedResponse(e.to_string()))
    }
}

impl Classifier for ClassifierClient {
    async fn classify(&self, upload: Upload) -> WorkflowResult<ClassificationResult> {
        self.post_image(upload).await
    }

    async fn wake(&self) -> WorkflowResult<WakeReply> {
        self.get_status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_uses_configured_endpoint() {
        let config = WidgetConfig {
            endpoint_base_url: "https://object-detector-resnet101.onrender.com/".into(),
            ..WidgetConfig::default()
        };
        let client = ClassifierClient::from_config(&config).unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://object-detector-resnet101.onrender.com/"
        );
    }
}
