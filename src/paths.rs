//! Project path functions - single source of truth for file locations.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! This allows running isolated server instances side by side:
//! ```bash
//! DATA_DIR=data/demo PORT=3001 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// Default SQLite database path
pub fn db_path() -> String {
    format!("{}/vocab.db", data_dir())
}

/// Default directory for uploaded media (flashcard audio)
pub fn media_dir() -> String {
    format!("{}/media", data_dir())
}

/// Static assets directory - not under DATA_DIR
pub const STATIC_DIR: &str = "static";

/// URL prefix under which the media directory is served
pub const MEDIA_URL: &str = "/media";

// ==================== Upload Paths ====================

/// Media-relative directory for English audio uploads
pub const AUDIO_ENGLISH_DIR: &str = "audio/english";

/// Media-relative directory for Spanish audio uploads
pub const AUDIO_SPANISH_DIR: &str = "audio/spanish";

/// Public URL of a stored media reference
pub fn media_url(reference: &str) -> String {
    format!("{}/{}", MEDIA_URL, reference.trim_start_matches('/'))
}

// ==================== Tests ====================
