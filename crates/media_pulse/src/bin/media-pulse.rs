use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use media_pulse::{
    compress::CompressionStrategy,
    server::{router, serve, spawn_cache_janitor},
    tracing::init_tracing_subscriber,
    yt::scraper::Scraper,
    Config, GeminiClient, Language, MediaPulseBuilder,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "media-pulse",
    version,
    about = "Image captioning and video summarization over Gemini"
)]
struct Cli {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = GeminiClient::DEFAULT_BASE_URL)]
    gemini_base_url: String,

    /// Candidate models, tried in order
    #[arg(
        long,
        env = "GEMINI_MODELS",
        value_delimiter = ',',
        default_value = "gemini-2.0-flash,gemini-1.5-flash"
    )]
    models: Vec<String>,

    /// First transcript language, as `code` or `code:Name`
    #[arg(long, env = "PRIMARY_LANGUAGE", default_value = "en:English")]
    primary_language: Language,

    #[arg(long, env = "SECONDARY_LANGUAGE", default_value = "hi:Hindi")]
    secondary_language: Language,

    #[arg(long, env = "TRANSCRIPT_TIMEOUT_SECS", default_value = "10")]
    transcript_timeout_secs: u64,

    #[arg(long, env = "GENERATION_TIMEOUT_SECS", default_value = "30")]
    generation_timeout_secs: u64,

    #[arg(long, env = "MAX_TRANSCRIPT_CHARS", default_value = "8000")]
    max_transcript_chars: usize,

    /// Target size for compressed images, in KB
    #[arg(long, env = "TARGET_SIZE_KB", default_value = "500")]
    target_size_kb: usize,

    #[arg(long, env = "MAX_IMAGE_DIMENSION", default_value = "1920")]
    max_image_dimension: u32,

    /// `binary-search` or `linear`
    #[arg(long, env = "COMPRESSION_STRATEGY", default_value = "binary-search")]
    compression_strategy: CompressionStrategy,

    /// Working directory for spooled uploads
    #[arg(long, env = "WORKDIR", default_value = "/var/tmp/media-pulse")]
    workdir: PathBuf,

    #[arg(long, env = "CACHE_TTL_SECS", default_value = "3600")]
    cache_ttl_secs: u64,

    /// Summary cache capacity, 0 disables caching
    #[arg(long, env = "CACHE_CAPACITY", default_value = "100")]
    cache_capacity: usize,

    #[arg(long, env = "MAX_CONCURRENT_GENERATIONS", default_value = "5")]
    max_concurrent_generations: usize,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "10485760")]
    max_upload_bytes: usize,

    #[arg(long, env = "CORS_ORIGIN")]
    cors_origin: Option<String>,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            models: self.models.clone(),
            primary_language: self.primary_language.clone(),
            secondary_language: self.secondary_language.clone(),
            transcript_timeout: Duration::from_secs(self.transcript_timeout_secs),
            max_transcript_chars: self.max_transcript_chars,
            target_size_kb: self.target_size_kb,
            max_image_dimension: self.max_image_dimension,
            compression: self.compression_strategy,
            workdir: self.workdir.clone(),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            cache_capacity: self.cache_capacity,
            max_concurrent_generations: self.max_concurrent_generations,
            max_upload_bytes: self.max_upload_bytes,
            cors_origin: self.cors_origin.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    if cli.models.is_empty() {
        anyhow::bail!("GEMINI_MODELS must name at least one model");
    }

    let config = cli.config();
    tracing::info!(
        models = ?config.models,
        strategy = %config.compression,
        target_size_kb = config.target_size_kb,
        "Starting media-pulse"
    );

    let gemini = GeminiClient::new(&cli.gemini_api_key)
        .with_base_url(&cli.gemini_base_url)
        .with_timeout(Duration::from_secs(cli.generation_timeout_secs));

    let pulse = Arc::new(
        MediaPulseBuilder::new()
            .config(config.clone())
            .transcript_source(Scraper::default())
            .generator(gemini)
            .build(),
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
            shutdown.cancel();
        }
    });

    let janitor = (config.cache_capacity > 0).then(|| {
        let every = config.cache_ttl.max(Duration::from_secs(60));
        spawn_cache_janitor(pulse.clone(), every, shutdown.clone())
    });

    let listener = TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", cli.host, cli.port))?;

    serve(listener, router(pulse, &config), shutdown.clone())
        .await
        .context("Server error")?;

    shutdown.cancel();
    if let Some(janitor) = janitor {
        let _ = janitor.await;
    }

    Ok(())
}
