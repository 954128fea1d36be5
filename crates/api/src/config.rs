use chrono::{FixedOffset, Offset, Utc};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// How long browsers may cache a CORS preflight, in seconds (default: `3600`).
    pub cors_max_age_secs: u64,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Offset of the school's local time from UTC, in minutes (default: `-180`).
    ///
    /// Event dates and times arrive in local time and are stored in UTC.
    pub local_utc_offset_minutes: i32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `CORS_MAX_AGE_SECS`        | `3600`                     |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `LOCAL_UTC_OFFSET_MINUTES` | `-180`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let cors_max_age_secs: u64 = std::env::var("CORS_MAX_AGE_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("CORS_MAX_AGE_SECS must be a valid u64");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let local_utc_offset_minutes: i32 = std::env::var("LOCAL_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| "-180".into())
            .parse()
            .expect("LOCAL_UTC_OFFSET_MINUTES must be a valid i32");
        assert!(
            offset_from_minutes(local_utc_offset_minutes).is_some(),
            "LOCAL_UTC_OFFSET_MINUTES must be within +/-1439"
        );

        Self {
            host,
            port,
            cors_origins,
            cors_max_age_secs,
            request_timeout_secs,
            local_utc_offset_minutes,
        }
    }

    /// The school's local offset. Falls back to UTC for out-of-range values.
    pub fn local_offset(&self) -> FixedOffset {
        offset_from_minutes(self.local_utc_offset_minutes).unwrap_or_else(|| Utc.fix())
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}
