pub mod gemini;
pub mod invoker;
pub mod prompt;

use std::future::Future;

use serde::Serialize;

/// One part of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PromptPart {
    Text {
        text: String,
    },
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    /// base64 encoded payload
    pub data: String,
}

impl PromptPart {
    pub fn text(text: impl Into<String>) -> Self {
        PromptPart::Text { text: text.into() }
    }

    pub fn inline_data(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        use base64::Engine;

        PromptPart::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl GenerationError {
    /// The model id is unknown to the endpoint, e.g. renamed or retired.
    pub fn is_model_not_found(&self) -> bool {
        matches!(self, GenerationError::Api { status: 404, .. })
    }
}

/// A generation endpoint that may or may not find text to return.
pub trait Generator {
    /// Returns `Ok(None)` when the endpoint answered successfully but the
    /// response carried no text.
    fn generate(
        &self,
        model: &str,
        parts: &[PromptPart],
    ) -> impl Future<Output = Result<Option<String>, GenerationError>> + Send;
}

impl<G: Generator + Send + Sync> Generator for &G {
    async fn generate(
        &self,
        model: &str,
        parts: &[PromptPart],
    ) -> Result<Option<String>, GenerationError> {
        (**self).generate(model, parts).await
    }
}
