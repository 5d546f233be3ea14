//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [generate] Section Defaults
// ============================================================================

pub mod generate {
    use std::path::PathBuf;

    pub fn output() -> PathBuf {
        "reference".into()
    }

    /// Zero picks one worker per available core.
    pub fn concurrency() -> usize {
        0
    }
}
