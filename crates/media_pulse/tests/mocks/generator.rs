use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use media_pulse::{GenerationError, Generator, PromptPart};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Empty,
    Fail { status: u16, message: String },
}

impl Reply {
    pub fn text(text: &str) -> Self {
        Reply::Text(text.to_string())
    }

    pub fn not_found() -> Self {
        Reply::Fail {
            status: 404,
            message: "models/x is not found for API version v1beta".into(),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Reply::Fail {
            status,
            message: message.to_string(),
        }
    }
}

/// Unscripted models answer 404.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    pub replies: HashMap<String, Reply>,
    pub calls: Arc<Mutex<Vec<(String, Vec<PromptPart>)>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, model: &str, reply: Reply) -> Self {
        self.replies.insert(model.to_string(), reply);
        self
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }
}

impl Generator for MockGenerator {
    async fn generate(
        &self,
        model: &str,
        parts: &[PromptPart],
    ) -> Result<Option<String>, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), parts.to_vec()));

        match self.replies.get(model).cloned().unwrap_or_else(Reply::not_found) {
            Reply::Text(text) => Ok(Some(text)),
            Reply::Empty => Ok(None),
            Reply::Fail { status, message } => Err(GenerationError::Api { status, message }),
        }
    }
}
