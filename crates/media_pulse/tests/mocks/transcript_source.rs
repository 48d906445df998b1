use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use media_pulse::{types::CaptionFragment, yt::TranscriptSource};

/// What the source does when asked for one language.
#[derive(Debug, Clone)]
pub enum Script {
    Captions(Vec<CaptionFragment>),
    Empty,
    Fail(String),
    /// Sleeps before answering with the captions.
    Slow(Duration, Vec<CaptionFragment>),
}

pub fn captions(text: &str) -> Vec<CaptionFragment> {
    text.split(". ")
        .enumerate()
        .map(|(i, line)| CaptionFragment {
            text: line.to_string(),
            start: i as f64 * 2.0,
            duration: 2.0,
        })
        .collect()
}

/// Unscripted languages fail with "no captions".
#[derive(Debug, Clone, Default)]
pub struct MockTranscriptSource {
    pub scripts: HashMap<Option<String>, Script>,
    pub calls: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl MockTranscriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, language: Option<&str>, script: Script) -> Self {
        self.scripts.insert(language.map(str::to_string), script);
        self
    }

    pub fn languages_tried(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, language)| language.clone())
            .collect()
    }
}

impl TranscriptSource for MockTranscriptSource {
    type Error = anyhow::Error;

    async fn fetch(
        &self,
        video_id: &str,
        language: Option<&str>,
    ) -> Result<Vec<CaptionFragment>, Self::Error> {
        self.calls
            .lock()
            .unwrap()
            .push((video_id.to_string(), language.map(str::to_string)));

        let script = self
            .scripts
            .get(&language.map(str::to_string))
            .cloned()
            .unwrap_or_else(|| Script::Fail("no captions".into()));

        match script {
            Script::Captions(fragments) => Ok(fragments),
            Script::Empty => Ok(Vec::new()),
            Script::Fail(msg) => Err(anyhow::anyhow!("{}", msg)),
            Script::Slow(delay, fragments) => {
                tokio::time::sleep(delay).await;
                Ok(fragments)
            }
        }
    }
}
