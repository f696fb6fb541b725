use std::path::Path;

use crate::constants::DEFAULT_CONTENT_TYPE;

/// Resolve a MIME type from a file extension, falling back to
/// `application/octet-stream` for unknown or missing extensions.
pub fn content_type_for(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => mime_guess::from_ext(ext)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        None => DEFAULT_CONTENT_TYPE.to_string(),
    }
}
