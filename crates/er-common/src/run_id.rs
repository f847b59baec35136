//! Process-level run ID for tracking training and serving instances.
//!
//! Each process gets a unique ULID at startup. The trainer stamps it into
//! the model artifact as the model version; both binaries carry it in log
//! fields so every record traces back to the run that produced it.

use once_cell::sync::Lazy;
use ulid::Ulid;

/// Process-level run ID, generated once at first access.
static RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// Returns the process-level run ID (time-ordered, 26 chars, URL-safe).
#[inline]
pub fn get() -> &'static str {
    &RUN_ID
}

/// Generates a fresh ULID for sub-operations.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}
