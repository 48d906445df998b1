mod mocks;

use std::{io::Cursor, time::Duration};

use media_pulse::{
    llm::prompt::summary_parts,
    transcript::{TranscriptResolver, TRUNCATION_MARKER},
    types::TranscriptCandidate,
    Config, Error, GenerationError, GenerationInvoker, ImageUpload, MediaPulse, MediaPulseBuilder,
    PromptPart,
};
use mocks::{
    generator::{MockGenerator, Reply},
    transcript_source::{captions, MockTranscriptSource, Script},
};

const VIDEO_ID: &str = "dQw4w9WgXcQ";

fn test_config() -> Config {
    Config {
        models: vec!["model-a".into(), "model-b".into(), "model-c".into()],
        workdir: std::env::temp_dir().join("media-pulse-integration"),
        ..Config::default()
    }
}

fn build_pulse(
    source: MockTranscriptSource,
    generator: MockGenerator,
) -> MediaPulse<MockTranscriptSource, MockGenerator> {
    MediaPulseBuilder::new()
        .config(test_config())
        .transcript_source(source)
        .generator(generator)
        .build()
}

fn resolver(source: MockTranscriptSource) -> TranscriptResolver<MockTranscriptSource> {
    TranscriptResolver::new(source, Config::default().transcript_candidates())
}

fn invoker(generator: MockGenerator) -> GenerationInvoker<MockGenerator> {
    GenerationInvoker::new(
        generator,
        vec!["model-a".into(), "model-b".into(), "model-c".into()],
    )
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

// ─── Transcript fallback ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_candidate_wins() {
    let source = MockTranscriptSource::new()
        .with(Some("en"), Script::Captions(captions("hello there. general kenobi")))
        .with(Some("hi"), Script::Captions(captions("namaste")));

    let result = resolver(source.clone()).resolve(VIDEO_ID).await.unwrap();

    assert_eq!(result.text, "hello there general kenobi");
    assert_eq!(result.language, "English");
    assert!(!result.truncated);
    assert_eq!(source.languages_tried(), vec![Some("en".to_string())]);
}

#[tokio::test]
async fn test_falls_through_errors_and_empty_results() {
    let source = MockTranscriptSource::new()
        .with(Some("en"), Script::Fail("transcripts disabled".into()))
        .with(Some("hi"), Script::Empty)
        .with(None, Script::Captions(captions("bonjour")));

    let result = resolver(source.clone()).resolve(VIDEO_ID).await.unwrap();

    assert_eq!(result.text, "bonjour");
    assert_eq!(result.language, "Auto-detected");
    assert_eq!(
        source.languages_tried(),
        vec![Some("en".to_string()), Some("hi".to_string()), None]
    );
}

#[tokio::test]
async fn test_all_candidates_failing_is_no_transcript() {
    let source = MockTranscriptSource::new();

    let err = resolver(source.clone()).resolve(VIDEO_ID).await.unwrap_err();

    assert!(
        matches!(&err, Error::NoTranscriptAvailable { video_id } if video_id == VIDEO_ID),
        "unexpected error: {err:?}"
    );
    assert_eq!(
        source.calls.lock().unwrap().len(),
        3,
        "Each candidate should be tried exactly once"
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_candidate_times_out_and_next_is_tried() {
    let source = MockTranscriptSource::new()
        .with(
            Some("en"),
            Script::Slow(Duration::from_secs(30), captions("too late")),
        )
        .with(Some("hi"), Script::Captions(captions("on time")));

    let started = tokio::time::Instant::now();
    let result = resolver(source.clone())
        .with_timeout(Duration::from_secs(10))
        .resolve(VIDEO_ID)
        .await
        .unwrap();

    assert_eq!(result.text, "on time");
    assert_eq!(result.language, "Hindi");
    assert!(started.elapsed() >= Duration::from_secs(10));
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_every_candidate_timing_out_is_no_transcript() {
    let slow = Script::Slow(Duration::from_secs(60), captions("never"));
    let source = MockTranscriptSource::new()
        .with(Some("en"), slow.clone())
        .with(Some("hi"), slow.clone())
        .with(None, slow);

    let started = tokio::time::Instant::now();
    let err = resolver(source.clone()).resolve(VIDEO_ID).await.unwrap_err();

    assert!(matches!(err, Error::NoTranscriptAvailable { .. }));
    // worst case latency is the sum of the per candidate timeouts
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[tokio::test]
async fn test_long_transcript_is_truncated() {
    let long = "a".repeat(9000);
    let source = MockTranscriptSource::new().with(
        Some("en"),
        Script::Captions(vec![media_pulse::types::CaptionFragment {
            text: long,
            start: 0.0,
            duration: 1.0,
        }]),
    );

    let result = resolver(source).resolve(VIDEO_ID).await.unwrap();

    assert!(result.truncated);
    assert!(result.text.ends_with(TRUNCATION_MARKER));
    assert_eq!(
        result.text.chars().count(),
        8000 + TRUNCATION_MARKER.chars().count()
    );
}

#[tokio::test]
async fn test_custom_candidate_order() {
    let source = MockTranscriptSource::new()
        .with(Some("sw"), Script::Captions(captions("habari")))
        .with(Some("en"), Script::Captions(captions("hello")));

    let candidates = vec![
        TranscriptCandidate::new(Some("sw"), "Swahili"),
        TranscriptCandidate::new(Some("en"), "English"),
    ];
    let result = TranscriptResolver::new(source.clone(), candidates)
        .resolve(VIDEO_ID)
        .await
        .unwrap();

    assert_eq!(result.language, "Swahili");
    assert_eq!(source.languages_tried(), vec![Some("sw".to_string())]);
}

// ─── Model fallback ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_not_found_falls_through_to_next_model() {
    let generator = MockGenerator::new()
        .with("model-a", Reply::not_found())
        .with("model-b", Reply::text("a caption"))
        .with("model-c", Reply::text("never used"));

    let result = invoker(generator.clone())
        .invoke(&[PromptPart::text("hi")])
        .await
        .unwrap();

    assert_eq!(result.text, "a caption");
    assert_eq!(result.model, "model-b");
    assert_eq!(generator.models_called(), vec!["model-a", "model-b"]);
}

#[tokio::test]
async fn test_quota_error_aborts_without_trying_more_models() {
    let generator = MockGenerator::new()
        .with("model-a", Reply::not_found())
        .with("model-b", Reply::failing(429, "Resource has been exhausted"))
        .with("model-c", Reply::text("never used"));

    let err = invoker(generator.clone())
        .invoke(&[PromptPart::text("hi")])
        .await
        .unwrap_err();

    assert!(
        matches!(
            &err,
            Error::Generation(GenerationError::Api { status: 429, .. })
        ),
        "unexpected error: {err:?}"
    );
    assert_eq!(generator.models_called(), vec!["model-a", "model-b"]);
}

#[tokio::test]
async fn test_auth_error_on_first_model_aborts() {
    let generator = MockGenerator::new()
        .with("model-a", Reply::failing(403, "API key not valid"))
        .with("model-b", Reply::text("never used"));

    let err = invoker(generator.clone())
        .invoke(&[PromptPart::text("hi")])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Generation(GenerationError::Api { status: 403, .. })
    ));
    assert_eq!(generator.models_called(), vec!["model-a"]);
}

#[tokio::test]
async fn test_all_models_not_found() {
    let generator = MockGenerator::new();

    let err = invoker(generator.clone())
        .invoke(&[PromptPart::text("hi")])
        .await
        .unwrap_err();

    match err {
        Error::AllModelsFailed { models } => {
            assert_eq!(models, vec!["model-a", "model-b", "model-c"])
        }
        other => panic!("expected AllModelsFailed, got {other:?}"),
    }
    assert_eq!(generator.calls.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_empty_generation_is_a_hard_failure() {
    let generator = MockGenerator::new()
        .with("model-a", Reply::Empty)
        .with("model-b", Reply::text("never used"));

    let err = invoker(generator.clone())
        .invoke(&[PromptPart::text("hi")])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoContentGenerated { model } if model == "model-a"));
    assert_eq!(generator.models_called(), vec!["model-a"]);
}

// ─── Video summaries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_summarize_video_happy_path() {
    let source = MockTranscriptSource::new()
        .with(Some("en"), Script::Captions(captions("rust is fun. async too")));
    let generator = MockGenerator::new().with("model-a", Reply::text("## Summary\nRust."));
    let pulse = build_pulse(source.clone(), generator.clone());

    let summary = pulse.summarize_video(VIDEO_ID).await.unwrap();

    assert!(summary.success);
    assert_eq!(summary.video_id, VIDEO_ID);
    assert_eq!(summary.summary, "## Summary\nRust.");
    assert_eq!(summary.transcript_language, "English");

    let calls = generator.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, summary_parts("rust is fun async too", "English"));
}

#[tokio::test]
async fn test_summarize_video_accepts_urls() {
    let source = MockTranscriptSource::new().with(Some("en"), Script::Captions(captions("hi")));
    let generator = MockGenerator::new().with("model-a", Reply::text("summary"));
    let pulse = build_pulse(source.clone(), generator);

    let summary = pulse
        .summarize_video("https://youtu.be/dQw4w9WgXcQ?t=42")
        .await
        .unwrap();

    assert_eq!(summary.video_id, VIDEO_ID);
    assert_eq!(source.calls.lock().unwrap()[0].0, VIDEO_ID);
}

#[tokio::test]
async fn test_invalid_video_id_never_reaches_the_source() {
    let source = MockTranscriptSource::new();
    let generator = MockGenerator::new();
    let pulse = build_pulse(source.clone(), generator.clone());

    for input in ["", "short", "dQw4w9WgXcQ!", "not a video id"] {
        let err = pulse.summarize_video(input).await.unwrap_err();
        assert!(
            matches!(err, Error::InvalidInput(_)),
            "{input:?} should be rejected"
        );
    }

    assert!(source.calls.lock().unwrap().is_empty());
    assert!(generator.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_transcript_skips_generation() {
    let source = MockTranscriptSource::new();
    let generator = MockGenerator::new().with("model-a", Reply::text("summary"));
    let pulse = build_pulse(source, generator.clone());

    let err = pulse.summarize_video(VIDEO_ID).await.unwrap_err();

    assert!(matches!(err, Error::NoTranscriptAvailable { .. }));
    assert!(generator.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cached_summary_skips_source_and_model() {
    let source = MockTranscriptSource::new().with(Some("en"), Script::Captions(captions("hi")));
    let generator = MockGenerator::new().with("model-a", Reply::text("summary"));
    let pulse = build_pulse(source.clone(), generator.clone());

    let first = pulse.summarize_video(VIDEO_ID).await.unwrap();
    let second = pulse
        .summarize_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(source.calls.lock().unwrap().len(), 1);
    assert_eq!(generator.calls.lock().unwrap().len(), 1);

    let stats = pulse.cache_stats().await;
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 1);
}

#[tokio::test]
async fn test_failed_summaries_are_not_cached() {
    let source = MockTranscriptSource::new().with(Some("en"), Script::Captions(captions("hi")));
    let generator = MockGenerator::new().with("model-a", Reply::failing(500, "internal"));
    let pulse = build_pulse(source.clone(), generator);

    assert!(pulse.summarize_video(VIDEO_ID).await.is_err());
    assert!(pulse.summarize_video(VIDEO_ID).await.is_err());

    assert_eq!(source.calls.lock().unwrap().len(), 2);
    assert_eq!(pulse.cache_stats().await.entries, 0);
}

// ─── Image captions ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_caption_image_happy_path() {
    let generator = MockGenerator::new()
        .with("model-a", Reply::not_found())
        .with("model-b", Reply::text("A colourful gradient"));
    let pulse = build_pulse(MockTranscriptSource::new(), generator.clone());

    let result = pulse
        .caption_image(ImageUpload {
            bytes: png_bytes(64, 48),
            content_type: Some("image/png".into()),
        })
        .await
        .unwrap();

    assert_eq!(result.text, "A colourful gradient");
    assert_eq!(result.model, "model-b");

    let calls = generator.calls.lock().unwrap();
    let (_, parts) = calls.last().unwrap();
    match &parts[1] {
        PromptPart::InlineData { inline_data } => {
            assert_eq!(inline_data.mime_type, "image/jpeg");
            // base64 of the JPEG SOI marker
            assert!(inline_data.data.starts_with("/9j/"));
        }
        other => panic!("expected inline image data, got {other:?}"),
    }
}

#[tokio::test]
async fn test_caption_image_rejects_non_images() {
    let generator = MockGenerator::new().with("model-a", Reply::text("never"));
    let pulse = build_pulse(MockTranscriptSource::new(), generator.clone());

    let err = pulse
        .caption_image(ImageUpload {
            bytes: b"%PDF-1.7".to_vec(),
            content_type: Some("application/pdf".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = pulse
        .caption_image(ImageUpload {
            bytes: Vec::new(),
            content_type: Some("image/png".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    assert!(generator.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_caption_image_undecodable_bytes() {
    let generator = MockGenerator::new().with("model-a", Reply::text("never"));
    let pulse = build_pulse(MockTranscriptSource::new(), generator.clone());

    let err = pulse
        .caption_image(ImageUpload {
            bytes: b"definitely not an image".to_vec(),
            content_type: Some("image/png".into()),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ImageDecode(_)), "unexpected: {err:?}");
    assert!(generator.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_caption_image_leaves_no_spooled_files() {
    let workdir = std::env::temp_dir().join(format!("media-pulse-spool-{}", std::process::id()));
    let config = Config {
        workdir: workdir.clone(),
        ..test_config()
    };
    let pulse = MediaPulseBuilder::new()
        .config(config.clone())
        .transcript_source(MockTranscriptSource::new())
        .generator(MockGenerator::new().with("model-a", Reply::failing(500, "boom")))
        .build();

    let _ = pulse
        .caption_image(ImageUpload {
            bytes: png_bytes(16, 16),
            content_type: Some("image/png".into()),
        })
        .await;
    let _ = pulse
        .caption_image(ImageUpload {
            bytes: b"garbage".to_vec(),
            content_type: None,
        })
        .await;

    let leftover = std::fs::read_dir(config.uploads_dir()).unwrap().count();
    assert_eq!(leftover, 0, "Spooled uploads should be removed");

    let _ = std::fs::remove_dir_all(workdir);
}
