//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Rating entry from the CLI goes through the same engine and
//! validation as the HTTP write path: keystrokes and flags are applied
//! via `RatingRules`, then the result is re-validated before storage.

use crate::api;
use crate::config::AppConfig;
use crate::unix_now_secs;
use resilo_core::{
    AssessmentMetrics, AssessmentStore, Level, RatingTarget, ResiloError, SessionId,
    SessionRecord, StoredEntry, TopicId, archive_from_bytes, archive_to_bytes,
    limits::MAX_SESSION_NAME_LENGTH, map_shortcut, normalize_evidence_links,
    validate_note_limits, validate_submission,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for archive import (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_IMPORT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ResiloError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ResiloError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ResiloError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate file path for security.
///
/// This function:
/// 1. Canonicalizes the path to resolve symlinks and ".."
/// 2. Ensures the path exists
/// 3. Ensures the path is a file (not a directory)
fn validate_file_path(path: &Path) -> Result<PathBuf, ResiloError> {
    // Canonicalize resolves "..", symlinks, and validates existence
    let canonical = path.canonicalize().map_err(|e| {
        ResiloError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    // Ensure it's a file, not a directory
    if !canonical.is_file() {
        return Err(ResiloError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate output path for security.
///
/// For output files, we validate the parent directory exists and is writable.
fn validate_output_path(path: &Path) -> Result<PathBuf, ResiloError> {
    // A bare filename has Some("") as its parent; treat both that and
    // None as the current directory.
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        ResiloError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(ResiloError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| ResiloError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// STORE LOADING
// =============================================================================

/// Open the store for the selected backend.
fn load_store(db_path: &Path, backend: &str) -> Result<AssessmentStore, ResiloError> {
    match backend {
        "memory" => {
            tracing::warn!("Memory backend selected: data will not be persisted");
            Ok(AssessmentStore::new())
        }
        _ => AssessmentStore::with_redb(db_path),
    }
}

/// Render a fixed-point hundredths value as "x.yy".
fn format_centi(centi: u64) -> String {
    format!("{}.{:02}", centi / 100, centi % 100)
}

/// Render a signed fixed-point hundredths value as "[-]x.yy".
fn format_centi_signed(centi: i64) -> String {
    let sign = if centi < 0 { "-" } else { "" };
    let magnitude = centi.unsigned_abs();
    format!("{}{}", sign, format_centi(magnitude))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    db_path: &Path,
    backend: &str,
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), ResiloError> {
    let config = AppConfig::load(config_path)?;
    let store = load_store(db_path, backend)?;
    let rules = config.rating_rules();

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    println!("Resilo Maturity Assessment Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", backend);
    println!("  Database: {:?}", db_path);
    println!("  Scale:    {:?}", config.scale.levels);
    println!("  NA-as-zero: {}", config.rules.treat_na_as_zero);
    println!();
    println!("Endpoints:");
    println!("  GET  /health   - Health check");
    println!("  GET  /status   - Store status");
    println!("  GET  /sessions - List sessions");
    println!("  POST /sessions - Create a session");
    println!("  PUT  /sessions/{{id}}/topics/{{topic}}/rating - Write a rating");
    println!("  GET  /sessions/{{id}}/progress - Progress summary");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, store, rules).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store status.
pub fn cmd_status(
    db_path: &Path,
    backend: &str,
    config_path: &Path,
    json_mode: bool,
) -> Result<(), ResiloError> {
    let config = AppConfig::load(config_path)?;
    let store = load_store(db_path, backend)?;

    let session_count = store.session_count()?;
    let entry_count = store.entry_count()?;

    if json_mode {
        let output = serde_json::json!({
            "database": db_path.to_string_lossy(),
            "backend": backend,
            "session_count": session_count,
            "entry_count": entry_count,
            "scale_levels": config.scale.levels,
            "treat_na_as_zero": config.rules.treat_na_as_zero,
        });
        println!("{}", output);
    } else {
        println!("Store Status");
        println!("  Database:   {:?}", db_path);
        println!("  Backend:    {}", backend);
        println!("  Sessions:   {}", session_count);
        println!("  Entries:    {}", entry_count);
        println!("  Scale:      {:?}", config.scale.levels);
        println!("  NA-as-zero: {}", config.rules.treat_na_as_zero);
    }
    Ok(())
}

// =============================================================================
// SESSION COMMANDS
// =============================================================================

/// List assessment sessions.
pub fn cmd_sessions(db_path: &Path, backend: &str, json_mode: bool) -> Result<(), ResiloError> {
    let store = load_store(db_path, backend)?;
    let sessions = store.sessions()?;

    if json_mode {
        let output: Vec<serde_json::Value> = sessions
            .iter()
            .map(|(id, record)| {
                serde_json::json!({
                    "id": id.0,
                    "name": record.name,
                    "assessor": record.assessor,
                    "created_at_secs": record.created_at_secs,
                })
            })
            .collect();
        println!("{}", serde_json::json!(output));
    } else if sessions.is_empty() {
        println!("No sessions yet. Create one with: resilo new-session --name <name>");
    } else {
        println!("Sessions:");
        for (id, record) in &sessions {
            let assessor = record.assessor.as_deref().unwrap_or("-");
            println!("  [{}] {} (assessor: {})", id.0, record.name, assessor);
        }
    }
    Ok(())
}

/// Create a new assessment session.
pub fn cmd_new_session(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    name: &str,
    assessor: Option<String>,
    notes: Option<String>,
) -> Result<(), ResiloError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ResiloError::LimitExceeded(
            "session name must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_SESSION_NAME_LENGTH {
        return Err(ResiloError::LimitExceeded(format!(
            "session name length {} exceeds maximum {} bytes",
            trimmed.len(),
            MAX_SESSION_NAME_LENGTH
        )));
    }

    let mut store = load_store(db_path, backend)?;
    let id = store.create_session(SessionRecord {
        name: trimmed.to_string(),
        assessor,
        notes,
        created_at_secs: unix_now_secs(),
    })?;

    if json_mode {
        println!("{}", serde_json::json!({ "id": id.0 }));
    } else {
        println!("Created session [{}] {}", id.0, trimmed);
    }
    Ok(())
}

// =============================================================================
// PROGRESS COMMAND
// =============================================================================

/// Show a session's progress summary.
pub fn cmd_progress(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    session: u64,
) -> Result<(), ResiloError> {
    let store = load_store(db_path, backend)?;
    let id = SessionId(session);

    let record = store
        .session(id)?
        .ok_or(ResiloError::SessionNotFound(id))?;
    let entries = store.entries(id)?;
    let metrics = AssessmentMetrics::from_entries(entries.iter().map(|(_, e)| e));

    if json_mode {
        let output = serde_json::json!({
            "session_id": session,
            "name": record.name,
            "metrics": metrics,
        });
        println!("{}", output);
        return Ok(());
    }

    println!("Progress for [{}] {}", session, record.name);
    println!(
        "  Topics:      {} total ({} complete, {} in progress, {} not started)",
        metrics.total, metrics.complete, metrics.in_progress, metrics.not_started
    );
    println!("  Completion:  {}%", metrics.completion_percent);
    println!("  N/A topics:  {}", metrics.current_na);
    match metrics.average_current_centi {
        Some(avg) => println!("  Avg current: {}", format_centi(avg)),
        None => println!("  Avg current: -"),
    }
    match metrics.average_desired_centi {
        Some(avg) => println!("  Avg desired: {}", format_centi(avg)),
        None => println!("  Avg desired: -"),
    }
    match metrics.average_gap_centi {
        Some(gap) => println!("  Avg gap:     {}", format_centi_signed(gap)),
        None => println!("  Avg gap:     -"),
    }
    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Render one rating side as "level (label)", "N/A", or "-".
fn render_rating(config: &AppConfig, level: Option<Level>, is_na: bool) -> String {
    if is_na {
        return "N/A".to_string();
    }
    match level {
        Some(l) => match config.level_label(l) {
            Some(label) => format!("{} ({})", l, label),
            None => l.to_string(),
        },
        None => "-".to_string(),
    }
}

/// Show one topic's rating entry.
pub fn cmd_show(
    db_path: &Path,
    backend: &str,
    config_path: &Path,
    json_mode: bool,
    session: u64,
    topic: u64,
) -> Result<(), ResiloError> {
    let config = AppConfig::load(config_path)?;
    let store = load_store(db_path, backend)?;
    let sid = SessionId(session);
    let tid = TopicId(topic);

    let entry = store
        .entry(sid, tid)?
        .ok_or(ResiloError::EntryNotFound(sid, tid))?;

    if json_mode {
        let output = serde_json::json!({
            "session_id": session,
            "topic_id": topic,
            "entry": entry,
        });
        println!("{}", output);
        return Ok(());
    }

    let snapshot = &entry.snapshot;
    println!("Topic {} in session {}", topic, session);
    println!(
        "  Current:  {}",
        render_rating(&config, snapshot.current_maturity, snapshot.current_is_na)
    );
    println!(
        "  Desired:  {}",
        render_rating(&config, snapshot.desired_maturity, snapshot.desired_is_na)
    );
    println!("  Progress: {}", entry.progress);
    if !snapshot.comment.trim().is_empty() {
        println!("  Comment:  {}", snapshot.comment);
    }
    for link in &snapshot.evidence_links {
        println!("  Evidence: {}", link);
    }
    Ok(())
}

// =============================================================================
// RATE COMMAND
// =============================================================================

/// Explicit rating flags of the `rate` command, applied after any
/// keystrokes.
#[derive(Debug, Default)]
pub struct RatingFlags {
    pub current: Option<u8>,
    pub current_na: bool,
    pub desired: Option<u8>,
    pub desired_na: bool,
    pub comment: Option<String>,
    pub evidence: Vec<String>,
}

/// Parse keystroke notation: a single key, optionally prefixed with
/// "shift+". Examples: "3", "n", "shift+5", "shift+n".
fn parse_stroke(stroke: &str) -> Option<(char, bool)> {
    let lower = stroke.to_ascii_lowercase();
    let (shift, rest) = match lower.strip_prefix("shift+") {
        Some(rest) => (true, rest),
        None => (false, lower.as_str()),
    };

    let mut chars = rest.chars();
    let key = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some((key, shift))
}

/// Rate a topic, via keystrokes and/or explicit flags.
pub fn cmd_rate(
    db_path: &Path,
    backend: &str,
    config_path: &Path,
    json_mode: bool,
    session: u64,
    topic: u64,
    strokes: &[String],
    flags: RatingFlags,
) -> Result<(), ResiloError> {
    let config = AppConfig::load(config_path)?;
    let rules = config.rating_rules();
    let mut store = load_store(db_path, backend)?;
    let sid = SessionId(session);
    let tid = TopicId(topic);

    if store.session(sid)?.is_none() {
        return Err(ResiloError::SessionNotFound(sid));
    }

    let mut snapshot = store
        .entry(sid, tid)?
        .map(|e| e.snapshot)
        .unwrap_or_default();

    // Keystrokes first, in order.
    for stroke in strokes {
        let (key, shift) = parse_stroke(stroke).ok_or_else(|| {
            ResiloError::DeserializationError(format!("Unrecognized keystroke '{}'", stroke))
        })?;
        let action = map_shortcut(key, shift).ok_or_else(|| {
            ResiloError::DeserializationError(format!("Key '{}' is not a rating shortcut", key))
        })?;

        // The shortcut table only knows the fixed digit range; the
        // configured scale is the actual bound.
        if let Some(level) = action.value {
            if !rules.scale().contains(level) {
                return Err(ResiloError::InvalidLevel(level));
            }
        }

        snapshot = match action.target {
            RatingTarget::Current => {
                rules.apply_current_selection(&snapshot, action.value, action.is_na)
            }
            RatingTarget::Desired => {
                rules.apply_desired_selection(&snapshot, action.value, action.is_na)
            }
        };
    }

    // Then the explicit flags.
    if flags.current_na {
        snapshot = rules.apply_current_selection(&snapshot, None, true);
    } else if let Some(value) = flags.current {
        let level = Level::new(value);
        if !rules.scale().contains(level) {
            return Err(ResiloError::InvalidLevel(level));
        }
        snapshot = rules.apply_current_selection(&snapshot, Some(level), false);
    }

    if flags.desired_na {
        let before = snapshot.clone();
        snapshot = rules.apply_desired_selection(&snapshot, None, true);
        if snapshot == before && !snapshot.desired_is_na && !json_mode {
            println!("Note: desired N/A ignored (current is rated and NA-as-zero is off)");
        }
    } else if let Some(value) = flags.desired {
        let level = Level::new(value);
        if !rules.scale().contains(level) {
            return Err(ResiloError::InvalidLevel(level));
        }
        snapshot = rules.apply_desired_selection(&snapshot, Some(level), false);
    }

    if let Some(comment) = flags.comment {
        snapshot.comment = comment;
    }
    if !flags.evidence.is_empty() {
        snapshot.evidence_links = normalize_evidence_links(&flags.evidence);
    }

    // Same pipeline as the HTTP write path.
    validate_note_limits(&snapshot.comment, &snapshot.evidence_links)?;
    validate_submission(&snapshot, &rules)?;
    let progress = rules.progress_state(&snapshot);

    let entry = StoredEntry {
        snapshot,
        progress,
        updated_at_secs: unix_now_secs(),
    };
    store.put_entry(sid, tid, entry.clone())?;

    if json_mode {
        let output = serde_json::json!({
            "session_id": session,
            "topic_id": topic,
            "entry": entry,
        });
        println!("{}", output);
    } else {
        let snapshot = &entry.snapshot;
        println!(
            "Topic {}: current {} / desired {} [{}]",
            topic,
            render_rating(&config, snapshot.current_maturity, snapshot.current_is_na),
            render_rating(&config, snapshot.desired_maturity, snapshot.desired_is_na),
            entry.progress
        );
    }
    Ok(())
}

// =============================================================================
// EXPORT / IMPORT COMMANDS
// =============================================================================

/// Export a session archive to file.
pub fn cmd_export(
    db_path: &Path,
    backend: &str,
    session: u64,
    output: &Path,
) -> Result<(), ResiloError> {
    let store = load_store(db_path, backend)?;
    let output = validate_output_path(output)?;

    let archive = store.export_session(SessionId(session))?;
    let entry_count = archive.entries.len();
    let bytes = archive_to_bytes(&archive)?;

    std::fs::write(&output, &bytes)
        .map_err(|e| ResiloError::IoError(format!("Cannot write {:?}: {}", output, e)))?;

    println!(
        "Exported session {} ({} entries, {} bytes) to {:?}",
        session,
        entry_count,
        bytes.len(),
        output
    );
    Ok(())
}

/// Import a session archive from file.
pub fn cmd_import(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    input: &Path,
) -> Result<(), ResiloError> {
    let input = validate_file_path(input)?;
    validate_file_size(&input, MAX_IMPORT_FILE_SIZE)?;

    let bytes = std::fs::read(&input)
        .map_err(|e| ResiloError::IoError(format!("Cannot read {:?}: {}", input, e)))?;
    let archive = archive_from_bytes(&bytes)?;
    let name = archive.record.name.clone();
    let entry_count = archive.entries.len();

    let mut store = load_store(db_path, backend)?;
    let id = store.import_session(archive)?;

    if json_mode {
        println!("{}", serde_json::json!({ "id": id.0, "entries": entry_count }));
    } else {
        println!(
            "Imported session [{}] {} ({} entries)",
            id.0, name, entry_count
        );
    }
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty database.
pub fn cmd_init(db_path: &Path, backend: &str, force: bool) -> Result<(), ResiloError> {
    if backend == "memory" {
        return Err(ResiloError::IoError(
            "Nothing to initialize for the memory backend".to_string(),
        ));
    }

    if db_path.exists() {
        if !force {
            return Err(ResiloError::IoError(format!(
                "Database {:?} already exists (use --force to overwrite)",
                db_path
            )));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| ResiloError::IoError(format!("Cannot remove {:?}: {}", db_path, e)))?;
    }

    let store = AssessmentStore::with_redb(db_path)?;
    let sessions = store.session_count()?;
    println!("Initialized database {:?} ({} sessions)", db_path, sessions);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
