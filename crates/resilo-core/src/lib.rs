//! # resilo-core
//!
//! The deterministic assessment rule engine for Resilo - THE LOGIC.
//!
//! Assessors rate topics on a configurable maturity scale twice: where
//! the topic stands today (current) and where it should land (desired).
//! This crate owns every rule the two ratings must obey, the derived
//! progress classification, and the storage of rating entries.
//!
//! ## One Rule Engine
//!
//! The constraint rules are invoked from two very different places:
//! interactive callers enforcing constraints on every selection, and the
//! HTTP write path re-validating submitted payloads before persisting.
//! Both call into this crate, so the two layers cannot drift apart.
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network dependencies
//! - Deterministic: integer arithmetic only (fixed-point hundredths for
//!   averages), `BTreeMap` for ordered state
//! - Non-throwing rules: invalid interactive transitions degrade to an
//!   unchanged snapshot, never a panic or an error

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod limits;
pub mod metrics;
pub mod rules;
pub mod scale;
pub mod shortcut;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod validate;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Level, ProgressState, ResiloError, SessionId, TopicId};

// =============================================================================
// RE-EXPORTS: Rule Engine
// =============================================================================

pub use rules::RatingRules;
pub use scale::RatingScale;
pub use shortcut::{RatingTarget, ShortcutAction, map_shortcut};
pub use snapshot::{TopicRatingSnapshot, normalize_evidence_links};
pub use validate::{validate_note_limits, validate_submission};

// =============================================================================
// RE-EXPORTS: Aggregation & Storage
// =============================================================================

pub use metrics::AssessmentMetrics;
pub use store::{AssessmentStore, SessionRecord, StoreBackend, StoredEntry};

// =============================================================================
// RE-EXPORTS: Formats (session archives)
// =============================================================================

pub use formats::{ArchiveHeader, ArchivedEntry, SessionArchive, archive_from_bytes, archive_to_bytes};
