use crate::{
    error::Error,
    fallback::{try_in_order, FallbackError, Outcome},
    llm::{Generator, PromptPart},
    types::GenerationResult,
};

/// Calls a [`Generator`] with each candidate model in order.
///
/// Only a "model not found" answer moves on to the next model; quota, auth,
/// timeouts and every other failure abort at once so they are not hidden
/// behind a fallback.
#[derive(Debug)]
pub struct GenerationInvoker<G> {
    generator: G,
    models: Vec<String>,
}

impl<G: Generator> GenerationInvoker<G> {
    pub fn new(generator: G, models: Vec<String>) -> Self {
        Self { generator, models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    #[tracing::instrument(skip_all, fields(models = ?self.models))]
    pub async fn invoke(&self, parts: &[PromptPart]) -> Result<GenerationResult, Error> {
        let result = try_in_order(&self.models, |model| async move {
            match self.generator.generate(model, parts).await {
                Ok(Some(text)) => Outcome::Done(text),
                Ok(None) => Outcome::Abort(Error::NoContentGenerated {
                    model: model.clone(),
                }),
                Err(e) if e.is_model_not_found() => {
                    tracing::warn!(model = %model, error = %e, "Model not found, trying next");
                    Outcome::Skip(Error::Generation(e))
                }
                Err(e) => Outcome::Abort(Error::Generation(e)),
            }
        })
        .await;

        match result {
            Ok((model, text)) => {
                tracing::info!(model = %model, chars = text.len(), "Generated content");
                Ok(GenerationResult {
                    text,
                    model: model.clone(),
                })
            }
            Err(FallbackError::Aborted(e)) => {
                tracing::error!(error = %e, "Generation failed");
                Err(e)
            }
            Err(FallbackError::Exhausted(reasons)) => {
                tracing::error!(attempted = reasons.len(), "No candidate model was available");
                Err(Error::AllModelsFailed {
                    models: self.models.clone(),
                })
            }
        }
    }
}
