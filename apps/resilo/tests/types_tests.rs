//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use resilo::api::{
    BulkRatingUpdateRequest, EntryJson, HealthResponse, RatingUpdateRequest, RatingWriteResponse,
    SessionCreateRequest, StatusResponse,
};
use resilo_core::{Level, ProgressState, ResiloError, StoredEntry, TopicRatingSnapshot};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: "0.4.2".to_string(),
    };

    let json = serde_json::to_string(&health).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains("\"version\":\"0.4.2\""));
}

// =============================================================================
// STATUS RESPONSE TESTS
// =============================================================================

#[test]
fn test_status_response_roundtrip() {
    let json = r#"{"session_count":3,"entry_count":120,"treat_na_as_zero":false,"scale_levels":[1,2,3,4,5]}"#;
    let status: StatusResponse = serde_json::from_str(json).unwrap();

    assert_eq!(status.session_count, 3);
    assert_eq!(status.entry_count, 120);
    assert_eq!(status.scale_levels, vec![1, 2, 3, 4, 5]);
}

// =============================================================================
// RATING REQUEST TESTS
// =============================================================================

#[test]
fn test_rating_request_minimal_payload() {
    // Every field is optional on the wire; a bare object is the empty
    // snapshot.
    let request: RatingUpdateRequest = serde_json::from_str("{}").unwrap();
    let snapshot = request.to_snapshot().unwrap();

    assert_eq!(snapshot, TopicRatingSnapshot::new());
}

#[test]
fn test_rating_request_full_payload() {
    let json = r#"{
        "current_maturity": 2,
        "current_is_na": false,
        "desired_maturity": 4,
        "desired_is_na": false,
        "comment": "tabletop exercise scheduled",
        "evidence_links": ["https://wiki.example/dr-plan"],
        "progress_state": "complete"
    }"#;
    let request: RatingUpdateRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.progress_state, Some(ProgressState::Complete));
    let snapshot = request.to_snapshot().unwrap();
    assert_eq!(snapshot.current_maturity, Some(Level(2)));
    assert_eq!(snapshot.desired_maturity, Some(Level(4)));
    assert_eq!(snapshot.comment, "tabletop exercise scheduled");
    assert_eq!(snapshot.evidence_links.len(), 1);
}

#[test]
fn test_rating_request_normalizes_evidence() {
    let request = RatingUpdateRequest {
        current_maturity: None,
        current_is_na: false,
        desired_maturity: None,
        desired_is_na: false,
        comment: None,
        evidence_links: vec!["  https://a.example ".to_string(), "  ".to_string()],
        progress_state: None,
    };

    let snapshot = request.to_snapshot().unwrap();
    assert_eq!(snapshot.evidence_links, vec!["https://a.example".to_string()]);
}

#[test]
fn test_rating_request_oversized_comment_rejected() {
    let request = RatingUpdateRequest {
        current_maturity: None,
        current_is_na: false,
        desired_maturity: None,
        desired_is_na: false,
        comment: Some("x".repeat(3000)),
        evidence_links: vec![],
        progress_state: None,
    };

    assert!(matches!(
        request.to_snapshot(),
        Err(ResiloError::LimitExceeded(_))
    ));
}

#[test]
fn test_bulk_request_flattens_rating_fields() {
    let json = r#"{
        "updates": [
            { "topic_id": 7, "current_maturity": 1, "desired_maturity": 2 }
        ]
    }"#;
    let bulk: BulkRatingUpdateRequest = serde_json::from_str(json).unwrap();

    assert_eq!(bulk.updates.len(), 1);
    assert_eq!(bulk.updates[0].topic_id, 7);
    assert_eq!(bulk.updates[0].rating.current_maturity, Some(1));
    assert_eq!(bulk.updates[0].rating.desired_maturity, Some(2));
}

// =============================================================================
// RATING RESPONSE TESTS
// =============================================================================

#[test]
fn test_rating_write_response_constructors() {
    let ok = RatingWriteResponse::success(42, ProgressState::Complete, 1_700_000_000);
    assert!(ok.success);
    assert_eq!(ok.topic_id, Some(42));
    assert_eq!(ok.progress_state, Some(ProgressState::Complete));
    assert!(ok.error.is_none());

    let err = RatingWriteResponse::error("Rejected: desired below current");
    assert!(!err.success);
    assert!(err.topic_id.is_none());
    assert!(err.error.unwrap().contains("desired below current"));
}

#[test]
fn test_entry_json_flattens_snapshot() {
    let entry = StoredEntry {
        snapshot: TopicRatingSnapshot {
            current_maturity: Some(Level(3)),
            desired_maturity: Some(Level(5)),
            ..TopicRatingSnapshot::new()
        },
        progress: ProgressState::Complete,
        updated_at_secs: 1_700_000_000,
    };

    let json = serde_json::to_value(EntryJson::from_entry(8, &entry)).unwrap();

    // Snapshot fields sit at the top level, the way clients submit them.
    assert_eq!(json["topic_id"], 8);
    assert_eq!(json["current_maturity"], 3);
    assert_eq!(json["desired_maturity"], 5);
    assert_eq!(json["progress_state"], "complete");
}

// =============================================================================
// SESSION REQUEST TESTS
// =============================================================================

#[test]
fn test_session_request_trims_name() {
    let request = SessionCreateRequest {
        name: "  annual review  ".to_string(),
        assessor: Some("  sam ".to_string()),
        notes: Some("   ".to_string()),
    };

    let record = request.to_record(1_700_000_000).unwrap();
    assert_eq!(record.name, "annual review");
    assert_eq!(record.assessor.as_deref(), Some("sam"));
    // Blank notes collapse to None.
    assert_eq!(record.notes, None);
    assert_eq!(record.created_at_secs, 1_700_000_000);
}

#[test]
fn test_session_request_empty_name_rejected() {
    let request = SessionCreateRequest {
        name: "\t ".to_string(),
        assessor: None,
        notes: None,
    };

    assert!(matches!(
        request.to_record(0),
        Err(ResiloError::LimitExceeded(_))
    ));
}

#[test]
fn test_session_request_oversized_name_rejected() {
    let request = SessionCreateRequest {
        name: "x".repeat(300),
        assessor: None,
        notes: None,
    };

    assert!(matches!(
        request.to_record(0),
        Err(ResiloError::LimitExceeded(_))
    ));
}
