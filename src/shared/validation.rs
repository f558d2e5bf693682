use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::FALLBACK_PHOTO_EXTENSION;

lazy_static! {
    /// Regex for accepted photo file extensions (after lower-casing)
    /// - Valid: "jpg", "heic", "webp", "jp2"
    /// - Invalid: "", "tar.gz", "j pg", "../x", anything longer than 10 characters
    pub static ref EXTENSION_REGEX: Regex = Regex::new(r"^[a-z0-9]{1,10}$").unwrap();
}

/// Extension for a stored photo, taken from the uploaded file name.
///
/// Falls back to [`FALLBACK_PHOTO_EXTENSION`] when the name has no usable suffix.
pub fn photo_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| EXTENSION_REGEX.is_match(ext))
        .unwrap_or_else(|| FALLBACK_PHOTO_EXTENSION.to_string())
}
