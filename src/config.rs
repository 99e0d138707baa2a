//! Application configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env) > default.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths;

// ==================== Defaults ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Session expiration time in hours of inactivity
pub const SESSION_EXPIRY_HOURS: i64 = 12;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Number of questions a new test asks when none is configured
pub const DEFAULT_NUM_QUESTIONS: u32 = 3;

/// Largest accepted audio upload, in bytes
pub const MAX_AUDIO_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ==================== config.toml structure ====================

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    database: Option<DatabaseSection>,
    server: Option<ServerSection>,
    media: Option<MediaSection>,
    session: Option<SessionSection>,
    quiz: Option<QuizSection>,
    admin: Option<AdminSection>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct MediaSection {
    dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionSection {
    expiry_hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct QuizSection {
    enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct AdminSection {
    username: Option<String>,
    password: Option<String>,
}

// ==================== Resolved configuration ====================

/// Credentials for the admin account created on first start
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

/// Fully resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub media_dir: PathBuf,
    pub session_expiry_hours: i64,
    /// Whether chapters can be studied in quiz mode (`?show_test=`)
    pub quiz_enabled: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(paths::db_path()),
            host: SERVER_ADDR.to_string(),
            port: SERVER_PORT,
            media_dir: PathBuf::from(paths::media_dir()),
            session_expiry_hours: SESSION_EXPIRY_HOURS,
            quiz_enabled: true,
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `config.toml` in the working directory and the environment
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new("config.toml"), |key| std::env::var(key).ok())
    }

    /// Resolve configuration from an explicit file and environment lookup
    pub fn load_from(config_path: &Path, env: impl Fn(&str) -> Option<String>) -> Self {
        let file = match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!("Ignoring invalid {}: {}", config_path.display(), e);
                    ConfigFile::default()
                }
            },
            Err(_) => ConfigFile::default(),
        };

        let defaults = Self::default();

        let database_path = file
            .database
            .and_then(|d| d.path)
            .or_else(|| env("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let (file_host, file_port) = match file.server {
            Some(s) => (s.host, s.port),
            None => (None, None),
        };
        let host = file_host.or_else(|| env("HOST")).unwrap_or(defaults.host);
        let port = file_port
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(defaults.port);

        let media_dir = file
            .media
            .and_then(|m| m.dir)
            .or_else(|| env("MEDIA_DIR"))
            .map(PathBuf::from)
            .unwrap_or(defaults.media_dir);

        let session_expiry_hours = file
            .session
            .and_then(|s| s.expiry_hours)
            .or_else(|| env("SESSION_EXPIRY_HOURS").and_then(|h| h.parse().ok()))
            .filter(|h| *h > 0)
            .unwrap_or(defaults.session_expiry_hours);

        let quiz_enabled = file
            .quiz
            .and_then(|q| q.enabled)
            .or_else(|| env("QUIZ_ENABLED").map(|v| parse_flag(&v)))
            .unwrap_or(defaults.quiz_enabled);

        let (file_user, file_password) = match file.admin {
            Some(a) => (a.username, a.password),
            None => (None, None),
        };
        let bootstrap_admin = match (
            file_user.or_else(|| env("ADMIN_USERNAME")),
            file_password.or_else(|| env("ADMIN_PASSWORD")),
        ) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin { username, password })
            }
            _ => None,
        };

        tracing::info!("Using database: {}", database_path.display());

        Self {
            database_path,
            host,
            port,
            media_dir,
            session_expiry_hours,
            quiz_enabled,
            bootstrap_admin,
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
