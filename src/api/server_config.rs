//! Server limits

use std::time::Duration;

/// Concurrent in-flight requests
pub const MAX_CONCURRENCY: usize = 256;

/// JSON request bodies
pub const MAX_BODY_SIZE: usize = 1024 * 1024; // 1MB

/// Avatar uploads, the largest body any route accepts
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024; // 5MB

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const CORS_MAX_AGE: Duration = Duration::from_secs(3600);
