use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header::{ALLOW, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use linkhop_core::{ShortCode, ShortenParams, Visit};
use tracing::{debug, error, info};

use crate::error::{AppError, Result};
use crate::extract::ClientInfo;
use crate::model::{ShortenRequest, ShortenResponse};
use crate::state::AppState;

pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>> {
    let Json(request) = payload.map_err(|rejection| match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::InvalidContentType,
        other => AppError::InvalidBody(other.body_text()),
    })?;

    let user_id = request.user_id;
    let mapping = state
        .shortener()
        .shorten(ShortenParams {
            original_url: request.url,
            user_id,
        })
        .await?;

    Ok(Json(ShortenResponse::new(mapping, user_id)))
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
    client: ClientInfo,
) -> Result<Response> {
    // A segment that does not decode to UTF-8 cannot name a mapping either.
    let Path(code) = path.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "rejecting undecodable path");
        AppError::UrlNotFound
    })?;

    // Anything that is not a well-formed code cannot name a mapping.
    let code = ShortCode::parse(code).map_err(|e| {
        debug!(error = %e, "rejecting malformed short code");
        AppError::UrlNotFound
    })?;

    let resolution = state
        .redirector()
        .resolve(&code)
        .await?
        .ok_or(AppError::UrlNotFound)?;

    let location = HeaderValue::try_from(resolution.original_url.as_str())
        .map_err(|e| AppError::InvalidLocation(e.to_string()))?;

    let visit = Visit {
        mapping_id: resolution.mapping_id,
        client_ip: client.ip,
        user_agent: client.user_agent,
    };
    let recorded = tokio::time::timeout(
        state.analytics_timeout(),
        state.visits().record_visit(&visit),
    )
    .await;

    match recorded {
        Ok(Ok(())) => debug!(code = %code, mapping_id = visit.mapping_id, "visit recorded"),
        Ok(Err(e)) => error!(code = %code, error = %e, "failed to record visit"),
        Err(elapsed) => error!(code = %code, error = %elapsed, "recording visit timed out"),
    }

    info!(
        code = %code,
        source = ?resolution.source,
        "redirecting"
    );
    Ok((StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response())
}

pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(ALLOW, HeaderValue::from_static("POST"))],
        "Method Not Allowed",
    )
        .into_response()
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404: Not Found").into_response()
}
