//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! The write path is where the server-side half of the rating rules
//! lives: every submitted snapshot is re-validated with the same
//! `RatingRules` engine interactive callers use, and `progress_state`
//! is always recomputed rather than trusted from the client.

use super::{
    AppState,
    types::{
        AllowedDesiredResponse, ArchiveResponse, BulkRatingResponse, BulkRatingUpdateRequest,
        EntryJson, ErrorBody, HealthResponse, ProgressResponse, RatingUpdateRequest,
        RatingWriteResponse, SessionCreateRequest, SessionCreateResponse, SessionDetailResponse,
        SessionJson, StatusResponse,
    },
};
use crate::unix_now_secs;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use resilo_core::{
    AssessmentMetrics, ResiloError, SessionId, StoredEntry, TopicId, TopicRatingSnapshot,
    archive_to_bytes, limits::MAX_BULK_UPDATES, validate_submission,
};

/// Map a core error to the HTTP status it should surface as.
fn error_status(err: &ResiloError) -> StatusCode {
    match err {
        ResiloError::SessionNotFound(_) | ResiloError::EntryNotFound(_, _) => {
            StatusCode::NOT_FOUND
        }
        ResiloError::InvalidLevel(_)
        | ResiloError::CurrentNaConflict
        | ResiloError::DesiredNaConflict
        | ResiloError::DesiredMustBeNa
        | ResiloError::DesiredBelowCurrent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ResiloError::LimitExceeded(_) => StatusCode::BAD_REQUEST,
        ResiloError::SerializationError(_)
        | ResiloError::DeserializationError(_)
        | ResiloError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get store status.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.read().await;

    let (session_count, entry_count) =
        match (store.session_count(), store.entry_count()) {
            (Ok(sessions), Ok(entries)) => (sessions, entries),
            (Err(e), _) | (_, Err(e)) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(format!("Status failed: {}", e))),
                )
                    .into_response();
            }
        };

    let response = StatusResponse {
        session_count,
        entry_count,
        treat_na_as_zero: state.rules.treat_na_as_zero(),
        scale_levels: state.rules.scale().levels().iter().map(|l| l.value()).collect(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

// =============================================================================
// SESSION HANDLERS
// =============================================================================

/// Create a new assessment session.
pub async fn create_session_handler(
    State(state): State<AppState>,
    Json(request): Json<SessionCreateRequest>,
) -> impl IntoResponse {
    let record = match request.to_record(unix_now_secs()) {
        Ok(r) => r,
        Err(e) => {
            return (
                error_status(&e),
                Json(SessionCreateResponse::error(format!("Invalid session: {}", e))),
            );
        }
    };

    let mut store = state.store.write().await;
    match store.create_session(record) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(SessionCreateResponse::success(id.0)),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SessionCreateResponse::error(format!("Create failed: {}", e))),
        ),
    }
}

/// List all sessions.
pub async fn list_sessions_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.read().await;
    match store.sessions() {
        Ok(sessions) => {
            let listing: Vec<SessionJson> = sessions
                .iter()
                .map(|(id, record)| SessionJson::from_record(id.0, record))
                .collect();
            (StatusCode::OK, Json(listing)).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(format!("List failed: {}", e))),
        )
            .into_response(),
    }
}

/// Get one session with its entry count.
pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> impl IntoResponse {
    let store = state.store.read().await;
    let id = SessionId(session_id);

    match store.session(id) {
        Ok(Some(record)) => {
            let entry_count = store.entries(id).map(|e| e.len()).unwrap_or(0);
            let response = SessionDetailResponse {
                session: SessionJson::from_record(session_id, &record),
                entry_count,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new(format!("Session {} not found", session_id))),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(format!("Lookup failed: {}", e))),
        )
            .into_response(),
    }
}

// =============================================================================
// PROGRESS HANDLER
// =============================================================================

/// Progress summary for one session.
pub async fn progress_handler(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> impl IntoResponse {
    let store = state.store.read().await;
    let id = SessionId(session_id);

    match store.session(id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorBody::new(format!("Session {} not found", session_id))),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(format!("Lookup failed: {}", e))),
            )
                .into_response();
        }
    }

    match store.entries(id) {
        Ok(entries) => {
            let metrics = AssessmentMetrics::from_entries(entries.iter().map(|(_, e)| e));
            let response = ProgressResponse {
                session_id,
                metrics,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(format!("Progress failed: {}", e))),
        )
            .into_response(),
    }
}

// =============================================================================
// RATING HANDLERS
// =============================================================================

/// Validate one submitted rating into a storable entry.
///
/// Runs the full server-side pipeline: size limits, invariant
/// re-validation against the shared rule engine, and progress
/// recomputation. The client-derived `progress_state` is only compared
/// for drift logging, never stored.
fn build_entry(
    state: &AppState,
    topic_id: u64,
    request: &RatingUpdateRequest,
    updated_at_secs: u64,
) -> Result<StoredEntry, ResiloError> {
    let snapshot = request.to_snapshot()?;
    validate_submission(&snapshot, &state.rules)?;

    let progress = state.rules.progress_state(&snapshot);
    if let Some(claimed) = request.progress_state {
        if claimed != progress {
            tracing::debug!(
                topic_id,
                claimed = %claimed,
                derived = %progress,
                "Client-derived progress_state disagrees; storing derived value"
            );
        }
    }

    Ok(StoredEntry {
        snapshot,
        progress,
        updated_at_secs,
    })
}

/// Write one topic rating.
pub async fn put_rating_handler(
    State(state): State<AppState>,
    Path((session_id, topic_id)): Path<(u64, u64)>,
    Json(request): Json<RatingUpdateRequest>,
) -> impl IntoResponse {
    let entry = match build_entry(&state, topic_id, &request, unix_now_secs()) {
        Ok(e) => e,
        Err(e) => {
            return (
                error_status(&e),
                Json(RatingWriteResponse::error(format!("Rejected: {}", e))),
            );
        }
    };
    let progress = entry.progress;
    let updated_at_secs = entry.updated_at_secs;

    let mut store = state.store.write().await;
    match store.put_entry(SessionId(session_id), TopicId(topic_id), entry) {
        Ok(()) => (
            StatusCode::OK,
            Json(RatingWriteResponse::success(topic_id, progress, updated_at_secs)),
        ),
        Err(e) => (
            error_status(&e),
            Json(RatingWriteResponse::error(format!("Write failed: {}", e))),
        ),
    }
}

/// Write a batch of topic ratings, all-or-nothing.
pub async fn bulk_ratings_handler(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
    Json(request): Json<BulkRatingUpdateRequest>,
) -> impl IntoResponse {
    if request.updates.len() > MAX_BULK_UPDATES {
        return (
            StatusCode::BAD_REQUEST,
            Json(BulkRatingResponse::error(
                None,
                format!(
                    "{} updates exceed maximum of {}",
                    request.updates.len(),
                    MAX_BULK_UPDATES
                ),
            )),
        );
    }

    // Validate everything before writing anything.
    let now = unix_now_secs();
    let mut entries = Vec::with_capacity(request.updates.len());
    for item in &request.updates {
        match build_entry(&state, item.topic_id, &item.rating, now) {
            Ok(entry) => entries.push((TopicId(item.topic_id), entry)),
            Err(e) => {
                return (
                    error_status(&e),
                    Json(BulkRatingResponse::error(
                        Some(item.topic_id),
                        format!("Rejected: {}", e),
                    )),
                );
            }
        }
    }

    let mut store = state.store.write().await;
    let written = entries.len();
    for (topic, entry) in entries {
        if let Err(e) = store.put_entry(SessionId(session_id), topic, entry) {
            return (
                error_status(&e),
                Json(BulkRatingResponse::error(
                    Some(topic.0),
                    format!("Write failed: {}", e),
                )),
            );
        }
    }

    (StatusCode::OK, Json(BulkRatingResponse::success(written)))
}

/// Read one topic rating.
pub async fn get_rating_handler(
    State(state): State<AppState>,
    Path((session_id, topic_id)): Path<(u64, u64)>,
) -> impl IntoResponse {
    let store = state.store.read().await;
    match store.entry(SessionId(session_id), TopicId(topic_id)) {
        Ok(Some(entry)) => {
            (StatusCode::OK, Json(EntryJson::from_entry(topic_id, &entry))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new(format!(
                "No rating for topic {} in session {}",
                topic_id, session_id
            ))),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(format!("Lookup failed: {}", e))),
        )
            .into_response(),
    }
}

/// Allowed desired levels for a topic, given its stored snapshot.
///
/// Topics with no stored entry yet answer for the empty snapshot, so
/// the UI can grey out options before the first selection.
pub async fn allowed_desired_handler(
    State(state): State<AppState>,
    Path((session_id, topic_id)): Path<(u64, u64)>,
) -> impl IntoResponse {
    let store = state.store.read().await;
    let id = SessionId(session_id);

    match store.session(id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorBody::new(format!("Session {} not found", session_id))),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(format!("Lookup failed: {}", e))),
            )
                .into_response();
        }
    }

    let snapshot = match store.entry(id, TopicId(topic_id)) {
        Ok(Some(entry)) => entry.snapshot,
        Ok(None) => TopicRatingSnapshot::new(),
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(format!("Lookup failed: {}", e))),
            )
                .into_response();
        }
    };

    let levels = state
        .rules
        .allowed_desired_levels(&snapshot)
        .iter()
        .map(|l| l.value())
        .collect();
    (
        StatusCode::OK,
        Json(AllowedDesiredResponse { topic_id, levels }),
    )
        .into_response()
}

// =============================================================================
// EXPORT HANDLERS
// =============================================================================

/// Export one session as JSON.
pub async fn export_handler(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> impl IntoResponse {
    let store = state.store.read().await;
    match store.export_session(SessionId(session_id)) {
        Ok(archive) => (StatusCode::OK, Json(archive)).into_response(),
        Err(e) => (
            error_status(&e),
            Json(ErrorBody::new(format!("Export failed: {}", e))),
        )
            .into_response(),
    }
}

/// Export one session as a base64-encoded binary archive, suitable for
/// `resilo import`.
pub async fn export_archive_handler(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> impl IntoResponse {
    let store = state.store.read().await;
    let archive = match store.export_session(SessionId(session_id)) {
        Ok(a) => a,
        Err(e) => {
            return (
                error_status(&e),
                Json(ArchiveResponse::error(format!("Export failed: {}", e))),
            );
        }
    };

    match archive_to_bytes(&archive) {
        Ok(bytes) => (StatusCode::OK, Json(ArchiveResponse::success(bytes))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ArchiveResponse::error(format!("Export failed: {}", e))),
        ),
    }
}
