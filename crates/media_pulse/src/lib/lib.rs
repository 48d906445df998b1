pub mod compress;
pub mod config;
mod error;
pub mod fallback;
pub mod llm;
pub mod parser;
mod processor;
pub mod queue;
pub mod server;
pub mod tracing;
pub mod transcript;
pub mod types;
pub mod upload;
pub mod yt;

pub use config::{Config, Language};
pub use error::Error;
pub use llm::{gemini::GeminiClient, invoker::GenerationInvoker, GenerationError, Generator, PromptPart};
pub use processor::{builder::MediaPulseBuilder, ImageUpload, MediaPulse};
