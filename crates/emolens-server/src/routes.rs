//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::{request::Parts, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use emolens_analysis::{DerivedMetrics, NormalizedMetrics, RiskBand};
use emolens_core::{Comment, Error};
use emolens_store::{AnalysisRecord, VideoRecord};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::error::{ApiError, Envelope, ResultExt};
use crate::service::{VideoCard, VideoDetails};
use crate::state::AppState;

/// Header carrying the authenticated user id
pub const USER_HEADER: &str = "x-user-id";
const ANONYMOUS: &str = "anonymous";

type ApiResult<T> = Result<Envelope<T>, ApiError>;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/youtube/get-comments", post(get_comments))
        .route("/api/youtube/video-meta-data", post(video_meta_data))
        .route("/api/youtube/analyze", post(analyze))
        .route("/api/youtube/video-metrics", post(video_metrics))
        .route("/api/groq/generate-summary", post(generate_summary))
        .route("/api/groq/generate-summary-by-id", post(generate_summary_by_id))
        .route("/api/videos/cards", get(video_cards))
        .route("/api/videos/:video_id", get(video_details))
        .fallback(fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static(USER_HEADER),
        ])
        .allow_credentials(true)
}

fn count_request(route: &'static str) {
    metrics::counter!("emolens_requests_total", "route" => route).increment(1);
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

async fn fallback() -> impl IntoResponse {
    ApiError::from(Error::validation("Route not found!!"))
}

/// Id of the user the request acts for
pub struct UserId(pub String);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(ANONYMOUS);
        Ok(Self(user.to_string()))
    }
}

/// Body of every URL-addressed request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRequest {
    #[serde(default)]
    pub youtube_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoIdRequest {
    #[serde(default)]
    pub video_id: String,
}

/// Unwrap a JSON body, turning a malformed one into a validation failure
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        debug!("Rejected request body: {}", rejection);
        ApiError::from(Error::validation("Invalid request body!!"))
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentsPayload {
    video_id: String,
    comments: Vec<Comment>,
}

async fn get_comments(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> ApiResult<CommentsPayload> {
    count_request("get_comments");
    let request = body(payload)?;

    let (video_id, comments) = state
        .service
        .fetch_comments(&request.youtube_url)
        .await
        .context("Fetch Comments Error")?;

    Ok(Envelope::ok(
        "Comments fetched successfully!!",
        CommentsPayload { video_id, comments },
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataPayload {
    video_meta_data: VideoRecord,
}

async fn video_meta_data(
    State(state): State<AppState>,
    UserId(user): UserId,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> ApiResult<MetadataPayload> {
    count_request("video_meta_data");
    let request = body(payload)?;

    let record = state
        .service
        .fetch_metadata(&user, &request.youtube_url)
        .await
        .context("Fetch Video Meta Data Error")?;

    Ok(Envelope::ok(
        "Video meta data fetched successfully!!",
        MetadataPayload {
            video_meta_data: record,
        },
    ))
}

#[derive(Serialize)]
struct AnalysisPayload {
    analysis: AnalysisRecord,
}

async fn analyze(
    State(state): State<AppState>,
    UserId(user): UserId,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> ApiResult<AnalysisPayload> {
    count_request("analyze");
    let request = body(payload)?;

    let analysis = state
        .service
        .analyze(&user, &request.youtube_url)
        .await
        .context("Analysis Error")?;

    Ok(Envelope::ok(
        "Comments analyzed successfully!!",
        AnalysisPayload { analysis },
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsPayload {
    metrics: DerivedMetrics,
    normalized: NormalizedMetrics,
    risk_band: RiskBand,
}

async fn video_metrics(
    State(state): State<AppState>,
    UserId(user): UserId,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> ApiResult<MetricsPayload> {
    count_request("video_metrics");
    let request = body(payload)?;

    let (_, metrics) = state
        .service
        .video_metrics(&user, &request.youtube_url)
        .await
        .context("Video Metrics Error")?;

    Ok(Envelope::ok(
        "Video metrics calculated successfully!!",
        MetricsPayload {
            normalized: metrics.normalized(),
            risk_band: metrics.risk_band(),
            metrics,
        },
    ))
}

#[derive(Serialize)]
struct SummaryPayload {
    summary: String,
}

async fn generate_summary(
    State(state): State<AppState>,
    UserId(user): UserId,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> ApiResult<SummaryPayload> {
    count_request("generate_summary");
    let request = body(payload)?;

    let summary = state
        .service
        .summarize_url(&user, &request.youtube_url)
        .await
        .context("Summary Generation Error")?;

    Ok(Envelope::ok(
        "Summary generated successfully!!",
        SummaryPayload { summary },
    ))
}

async fn generate_summary_by_id(
    State(state): State<AppState>,
    UserId(user): UserId,
    payload: Result<Json<VideoIdRequest>, JsonRejection>,
) -> ApiResult<SummaryPayload> {
    count_request("generate_summary_by_id");
    let request = body(payload)?;

    let summary = state
        .service
        .summarize_video(&user, &request.video_id)
        .await
        .context("Summary Generation Error")?;

    Ok(Envelope::ok(
        "Summary generated successfully!!",
        SummaryPayload { summary },
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardsPayload {
    total_videos: usize,
    videos: Vec<VideoCard>,
}

async fn video_cards(State(state): State<AppState>, UserId(user): UserId) -> ApiResult<CardsPayload> {
    count_request("video_cards");

    let videos = state
        .service
        .video_cards(&user)
        .await
        .context("Fetch Videos Error")?;

    let message = if videos.is_empty() {
        "No videos found!!"
    } else {
        "All videos fetched successfully!!"
    };

    Ok(Envelope::ok(
        message,
        CardsPayload {
            total_videos: videos.len(),
            videos,
        },
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailsPayload {
    video_data: VideoDetails,
}

async fn video_details(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(video_id): Path<String>,
) -> ApiResult<DetailsPayload> {
    count_request("video_details");

    let details = state
        .service
        .video_details(&user, &video_id)
        .await
        .context("Fetch Video Details Error")?;

    Ok(Envelope::ok(
        "Video details fetched successfully!!",
        DetailsPayload {
            video_data: details,
        },
    ))
}
