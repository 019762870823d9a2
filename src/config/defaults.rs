//! Service-wide default constants.
//!
//! Grouped by subsystem so every tunable has one home.

// ============================================================================
// Service
// ============================================================================

pub const SERVICE_NAME: &str = "WormDriller API";

/// Crate version reported by `/health`, `/api/info` and response metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENVIRONMENT: &str = "development";

// ============================================================================
// HTTP Server
// ============================================================================

pub const SERVER_ADDR: &str = "0.0.0.0:8000";

/// Largest accepted request body (bytes). Survey CSV uploads are the
/// biggest payloads.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Response header with request processing time in seconds.
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

// ============================================================================
// Trajectory Engine
// ============================================================================

/// Dogleg (radians) below which a course is treated as straight.
pub const TOLERANCE: f64 = 1e-10;

/// DLS above which a station counts as high dogleg (°/course length).
pub const HIGH_DLS_THRESHOLD: f64 = 3.0;

/// Stations closer than this (MD units) raise a survey warning.
pub const CLOSE_STATION_WARNING: f64 = 1.0;

/// Inclination range (degrees) above which a survey warning is raised.
pub const LARGE_INC_RANGE_WARNING: f64 = 90.0;

pub const MAX_PROJECTION_STEPS: usize = 1_000;

// ============================================================================
// Storage
// ============================================================================

pub const DATA_DIR: &str = "./data";

/// Sled database directory inside the data dir.
pub const DB_DIR_NAME: &str = "wormdriller.db";

// ============================================================================
// API Client
// ============================================================================

pub const CLIENT_BASE_URL: &str = "http://localhost:8000";

/// HTTP client timeout (seconds).
pub const CLIENT_TIMEOUT_SECS: u64 = 30;

/// Default response cache lifetime (seconds).
pub const CACHE_MAX_AGE_SECS: u64 = 300;
