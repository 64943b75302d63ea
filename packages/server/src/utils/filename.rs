use std::path::Path;

use chrono::Utc;
use rand::Rng;

/// Extension used when the uploaded file name has none.
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Result of validating a client-supplied filename.
#[derive(Debug)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains null bytes.
    NullByte,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Reduce a client-supplied filename to its last path component.
///
/// The result is only ever stored as display text; it never names a file on disk.
pub fn sanitize_original_name(filename: &str) -> Result<String, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    // Reject ASCII control characters to prevent header injection downstream.
    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    let last = trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if last.is_empty() || last == "." || last == ".." {
        return Err(FilenameError::Empty);
    }

    Ok(last.to_string())
}

/// Extension of `filename` including the leading dot, or [`DEFAULT_EXTENSION`].
///
/// Extensions that are not short and alphanumeric are replaced by the default
/// so the generated name stays a safe path component.
pub fn extension_or_default(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Generate the on-disk name for a new upload: `{unix_millis}-{random}{ext}`.
pub fn generate_stored_filename(original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    format!("{millis}-{suffix}{}", extension_or_default(original_name))
}
