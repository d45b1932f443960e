//! Store client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_STORE_URL: &str = "http://127.0.0.1:3001";
pub const DEFAULT_SHAPES_PATH: &str = "/shapes";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and authority of the store, without a trailing slash.
    pub base_url: String,
    /// Collection path, always starting with `/` and without a trailing slash.
    pub shapes_path: String,
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_URL, DEFAULT_SHAPES_PATH)
    }
}

impl ClientConfig {
    /// Config with default timeouts, normalizing slashes.
    #[must_use]
    pub fn new(base_url: &str, shapes_path: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            shapes_path: normalize_path(shapes_path),
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `TACMAP_STORE_URL`: default `http://127.0.0.1:3001`
    /// - `TACMAP_SHAPES_PATH`: default `/shapes`
    /// - `TACMAP_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TACMAP_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("TACMAP_STORE_URL").unwrap_or_else(|_| DEFAULT_STORE_URL.to_string());
        let shapes_path = std::env::var("TACMAP_SHAPES_PATH").unwrap_or_else(|_| DEFAULT_SHAPES_PATH.to_string());
        let mut cfg = Self::new(&base_url, &shapes_path);
        cfg.timeouts = Timeouts {
            request_secs: env_parse_u64("TACMAP_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("TACMAP_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        cfg
    }

    /// URL of the shape collection.
    #[must_use]
    pub fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, self.shapes_path)
    }

    /// URL of one shape.
    #[must_use]
    pub fn shape_url(&self, id: &str) -> String {
        format!("{}/{id}", self.collection_url())
    }
}

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    format!("/{trimmed}")
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
