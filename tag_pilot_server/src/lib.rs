//! HTTP boundary for the steering core.
//!
//! Two endpoints mirror the two sides of the last-command store:
//! `POST /process-image` takes a multipart upload in field `image`, steers on
//! it and answers with the computed direction; `GET /get-direction` answers
//! with whatever the store currently holds.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tag_pilot::{LastCommand, SteeringPipeline, SubmitError};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Largest accepted request body.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SteeringPipeline,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// An error as the HTTP client sees it.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match &err {
            SubmitError::MissingInput => {
                warn!("request carried no image");
                ApiError::new(StatusCode::BAD_REQUEST, "No image file in request")
            }
            SubmitError::DecodeFailure(source) => {
                warn!(error = %source, "uploaded image could not be decoded");
                ApiError::new(StatusCode::BAD_REQUEST, "Invalid image file")
            }
            SubmitError::Detection(source) => {
                error!(error = %source, "marker detection failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Marker detection failed")
            }
            SubmitError::StoreUnavailable(source) => {
                error!(error = %source, "last-command store unavailable");
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Direction store unavailable")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/process-image", post(process_image))
        .route("/get-direction", get(get_direction))
        .route("/healthz", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn process_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<LastCommand>, ApiError> {
    let payload = match multipart {
        Ok(multipart) => image_field(multipart).await?,
        Err(rejection) => {
            warn!(%rejection, "request is not a multipart upload");
            None
        }
    };

    let pipeline = state.pipeline.clone();
    let report = tokio::task::spawn_blocking(move || pipeline.submit(payload.as_deref()))
        .await
        .map_err(|e| {
            error!(error = %e, "steering task aborted");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Processing aborted")
        })??;

    Ok(Json(LastCommand::new(report.action)))
}

async fn get_direction(State(state): State<AppState>) -> Result<Json<LastCommand>, ApiError> {
    let pipeline = state.pipeline.clone();
    let record = tokio::task::spawn_blocking(move || pipeline.current())
        .await
        .map_err(|e| {
            error!(error = %e, "store read task aborted");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Processing aborted")
        })??;
    Ok(Json(record))
}

/// Pulls the bytes of the first `image` field out of a multipart body.
///
/// `Ok(None)` means the body holds no `image` field. An `image` field that
/// cannot be read is an error of its own, never a missing image.
async fn image_field(mut multipart: Multipart) -> Result<Option<Bytes>, ApiError> {
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("image") => {
                return field.bytes().await.map(Some).map_err(unreadable_image);
            }
            Ok(Some(_)) => continue,
            Ok(None) => return Ok(None),
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return Err(unreadable_image(e)),
            Err(e) => {
                warn!(error = %e, "malformed multipart body");
                return Ok(None);
            }
        }
    }
}

fn unreadable_image(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %err, limit = MAX_UPLOAD_BYTES, "image upload exceeds body limit");
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Image file too large")
    } else {
        warn!(error = %err, "failed to read image field");
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid image file")
    }
}

/// Binds `cfg.bind_addr` and serves until `shutdown` resolves.
pub async fn serve(
    pipeline: SteeringPipeline,
    cfg: ServerConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = router(AppState { pipeline });
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "steering server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("steering server stopped");
    Ok(())
}
