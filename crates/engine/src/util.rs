//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Canonical form of an email address for lookups and storage.
///
/// Trimmed, NFC-normalized, lower-cased. Participant identity within a trip
/// is keyed on this form, so every read and write goes through here first.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect::<String>().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(EngineError::InvalidId(format!(
            "invalid email address: {value}"
        )));
    }
    Ok(normalized)
}
