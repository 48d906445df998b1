use crate::{llm::PromptPart, types::CompressionResult};

const CAPTION_PROMPT: &str = include_str!("./prompts/caption_0.txt");
const SUMMARY_PROMPT: &str = include_str!("./prompts/summary_0.txt");

/// Caption request: instructions followed by the compressed JPEG inline.
pub fn caption_parts(image: &CompressionResult) -> Vec<PromptPart> {
    vec![
        PromptPart::text(CAPTION_PROMPT),
        PromptPart::inline_data(CompressionResult::MIME_TYPE, &image.bytes),
    ]
}

pub fn summary_parts(transcript: &str, language: &str) -> Vec<PromptPart> {
    vec![PromptPart::text(format!(
        "{SUMMARY_PROMPT}\nTranscript language: {language}\n\nTranscript:\n{transcript}"
    ))]
}
