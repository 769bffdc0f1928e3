//! # Fixed Runtime Limits
//!
//! Hardcoded bounds compiled into the binary. The rule engine itself is
//! non-throwing; these limits guard the boundaries around it (submitted
//! payloads, stored archives) against oversized input.

/// Magic bytes for the Resilo session archive header.
///
/// File Header = Magic Bytes ("RSLO") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"RSLO";

/// Current archive format version.
///
/// Increment this when making breaking changes to the archive format.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for a rating comment, in bytes.
///
/// Comments longer than this are rejected at the submission boundary.
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// Maximum number of evidence links on a single rating entry.
pub const MAX_EVIDENCE_LINKS: usize = 32;

/// Maximum length for a single evidence link, in bytes.
pub const MAX_EVIDENCE_LINK_LENGTH: usize = 2048;

/// Maximum number of rating updates in one bulk submission.
///
/// Bulk writes are validated all-or-nothing; this caps the work a
/// single request can queue up.
pub const MAX_BULK_UPDATES: usize = 500;

/// Maximum length for a session name, in bytes.
pub const MAX_SESSION_NAME_LENGTH: usize = 255;

/// Maximum length for a session's assessor field, in bytes.
pub const MAX_ASSESSOR_LENGTH: usize = 255;

/// Maximum length for a session's free-form notes, in bytes.
pub const MAX_NOTES_LENGTH: usize = 10_000;

/// Maximum allowed payload size for a session archive (50 MB).
///
/// Validated BEFORE attempting deserialization so oversized or corrupted
/// archives cannot trigger allocation-based memory exhaustion.
pub const MAX_ARCHIVE_PAYLOAD_SIZE: usize = 50 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"RSLO");
    }

    #[test]
    fn comment_limit_matches_storage_column() {
        // The persisted comment column is sized for 2000 bytes.
        assert_eq!(MAX_COMMENT_LENGTH, 2000);
    }
}
