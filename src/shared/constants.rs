/// Inclusive lower bound on photos per report (after dropping empty parts)
pub const MIN_PHOTOS: usize = 3;

/// Inclusive upper bound on photos per report
pub const MAX_PHOTOS: usize = 10;

/// Extension used when an upload's file name carries none
pub const FALLBACK_PHOTO_EXTENSION: &str = "jpg";

/// Content type used when an upload declares none
pub const FALLBACK_PHOTO_CONTENT_TYPE: &str = "image/jpeg";

/// Lifetime of the signed photo links in notification emails (7 days)
pub const SIGNED_URL_TTL_SECS: u32 = 60 * 60 * 24 * 7;

/// Photos uploaded concurrently within a single submission
pub const UPLOAD_CONCURRENCY: usize = 4;

/// Literal tokens accepted for boolean form fields
pub const TOKEN_TRUE: &str = "true";
pub const TOKEN_FALSE: &str = "false";
