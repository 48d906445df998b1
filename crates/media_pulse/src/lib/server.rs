use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::Error,
    llm::Generator,
    processor::{ImageUpload, MediaPulse},
    types::{CaptionResponse, ErrorResponse, HealthResponse, SummarizeRequest, VideoSummary},
    yt::TranscriptSource,
};

pub const IMAGE_FIELD: &str = "image";
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Error returned from handlers, rendered as `{success: false, error}`.
#[derive(Debug)]
pub enum ApiError {
    Pulse(Error),
    Rejected { status: StatusCode, message: String },
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Pulse(err)
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Rejected {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidInput(_) | Error::ImageDecode(_) => StatusCode::BAD_REQUEST,
        Error::NoTranscriptAvailable { .. } => StatusCode::NOT_FOUND,
        Error::AllModelsFailed { .. } | Error::NoContentGenerated { .. } | Error::Generation(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Pulse(err) => {
                let status = status_for(&err);
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = ?err, "Request failed");
                    (status, INTERNAL_ERROR_MESSAGE.to_string())
                } else {
                    tracing::warn!(error = %err, status = status.as_u16(), "Request failed");
                    (status, err.to_string())
                }
            }
            ApiError::Rejected { status, message } => {
                tracing::warn!(%message, status = status.as_u16(), "Request rejected");
                (status, message)
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

pub fn router<T, G>(pulse: Arc<MediaPulse<T, G>>, config: &Config) -> Router
where
    T: TranscriptSource + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/generate-caption", post(generate_caption::<T, G>))
        .route("/api/summarize-video", post(summarize_video::<T, G>))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(config.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(pulse)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match origin.map(HeaderValue::from_str) {
        None => layer.allow_origin(AllowOrigin::any()),
        Some(Ok(value)) => layer.allow_origin(AllowOrigin::exact(value)),
        Some(Err(e)) => {
            tracing::warn!(error = %e, ?origin, "Invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> ApiError {
    ApiError::Rejected {
        status: StatusCode::NOT_FOUND,
        message: "Not found".into(),
    }
}

async fn generate_caption<T, G>(
    State(pulse): State<Arc<MediaPulse<T, G>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CaptionResponse>, ApiError>
where
    T: TranscriptSource + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        upload = Some(ImageUpload {
            bytes: bytes.to_vec(),
            content_type,
        });
        break;
    }

    let upload = upload.ok_or_else(|| Error::InvalidInput("No image uploaded".into()))?;
    let generation = pulse.caption_image(upload).await?;

    Ok(Json(CaptionResponse {
        success: true,
        caption: generation.text,
    }))
}

async fn summarize_video<T, G>(
    State(pulse): State<Arc<MediaPulse<T, G>>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<VideoSummary>, ApiError>
where
    T: TranscriptSource + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    let Json(request) = payload?;
    let input = request
        .video_id
        .or(request.url)
        .ok_or_else(|| Error::InvalidInput("videoId is required".into()))?;

    Ok(Json(pulse.summarize_video(&input).await?))
}

/// Serves `app` until `shutdown` is cancelled, then drains in-flight requests.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

/// Periodically drops expired summaries until `shutdown` is cancelled.
pub fn spawn_cache_janitor<T, G>(
    pulse: Arc<MediaPulse<T, G>>,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    T: TranscriptSource + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let purged = pulse.purge_cache().await;
                    if purged > 0 {
                        tracing::debug!(purged, "Purged expired summaries");
                    }
                }
            }
        }
    })
}
