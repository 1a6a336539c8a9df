use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::state::AppState;

const PASSTHROUGH_DEFAULT_CONTENT_TYPE: &str = "image/jpeg";
const AUDIO_CONTENT_TYPE: &str = "audio/mp4";

#[derive(Deserialize, Debug)]
pub struct RelayQuery {
    url: Option<String>,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no url parameter provided")]
    MissingParameter,

    #[error("error fetching upstream resource")]
    UpstreamFetch,

    #[error("error fetching audio stream")]
    MediaExtraction,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::MissingParameter => StatusCode::BAD_REQUEST,
            RelayError::UpstreamFetch => StatusCode::BAD_GATEWAY,
            RelayError::MediaExtraction => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

/// GET /api/thumbnailUrl
///
/// Fetches an arbitrary remote resource server-side and re-serves it
/// same-origin, so a canvas can read its pixels without tainting. The body
/// is buffered whole; there is no size cap or timeout.
#[instrument(skip(state))]
pub async fn thumbnail_url(
    State(state): State<AppState>,
    Query(query): Query<RelayQuery>,
) -> Result<Response, RelayError> {
    let source_url = query.url.ok_or(RelayError::MissingParameter)?;

    let upstream = match state.http_client.get(&source_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("upstream fetch of {} failed: {}", source_url, e);
            return Err(RelayError::UpstreamFetch);
        }
    };

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(PASSTHROUGH_DEFAULT_CONTENT_TYPE)
        .to_string();

    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("reading upstream body of {} failed: {}", source_url, e);
            return Err(RelayError::UpstreamFetch);
        }
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
        ],
        bytes,
    )
        .into_response())
}

/// GET /api/ytAudio
///
/// Streams the audio-only track of a remote video as `audio/mp4`. The
/// extraction capability is invoked once; any failure is logged and mapped
/// to a 500 without retrying.
#[instrument(skip(state))]
pub async fn yt_audio(
    State(state): State<AppState>,
    Query(query): Query<RelayQuery>,
) -> Result<Response, RelayError> {
    let source_url = query.url.ok_or(RelayError::MissingParameter)?;

    let stream = match state.audio_source.extract_audio(&source_url) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!("audio extraction for {} failed: {}", source_url, e);
            return Err(RelayError::MediaExtraction);
        }
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, AUDIO_CONTENT_TYPE)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Body::from_stream(stream))
        .expect("static response parts are valid");

    Ok(response)
}
