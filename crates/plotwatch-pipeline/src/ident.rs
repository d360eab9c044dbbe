//! Result identifier generation.
//!
//! A result id is an opaque short token: 8 lowercase hex characters from
//! 4 bytes of OS entropy. Ids must be unique across results held by the
//! collaborator store; the store enforces uniqueness on insert, this
//! module only makes collisions improbable.

use std::fmt::Write as _;

use crate::types::AnalysisError;

/// Length of a result id in characters.
pub const RESULT_ID_LEN: usize = 8;

/// Generate a fresh result id.
///
/// # Errors
///
/// Returns [`AnalysisError::Internal`] if the OS entropy source fails.
pub fn generate_result_id() -> Result<String, AnalysisError> {
    let mut bytes = [0u8; RESULT_ID_LEN / 2];
    getrandom::fill(&mut bytes)
        .map_err(|e| AnalysisError::Internal(format!("entropy source failed: {e}")))?;

    let mut id = String::with_capacity(RESULT_ID_LEN);
    for b in bytes {
        // Infallible for String, but write! is the fmt API.
        let _ = write!(id, "{b:02x}");
    }
    Ok(id)
}
