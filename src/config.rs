//! Configuration utilities (server address, log file, reconnect policy)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Used when `WORDBUILDER_SERVER` is unset.
pub const DEFAULT_SERVER: &str = "http://localhost:5000";

/// Socket.IO mount point on the authority.
const SOCKET_PATH: &str = "/socket.io/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the authority, as a user would type it.
    pub server: String,
    /// Consecutive failed connects tolerated before giving up.
    pub reconnect_attempts: u32,
    pub reconnect_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            reconnect_attempts: 3,
            reconnect_delay: Duration::from_secs(2),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self { server: server_url(), ..Self::default() }
    }

    /// Websocket endpoint derived from [`Settings::server`].
    pub fn endpoint(&self) -> String {
        socket_endpoint(&self.server)
    }
}

/// Base URL of the authority.
///
/// Reads the `WORDBUILDER_SERVER` env var or falls back to [`DEFAULT_SERVER`].
pub fn server_url() -> String {
    server_url_from(env::var("WORDBUILDER_SERVER").ok())
}

pub fn server_url_from(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string())
}

/// Turns a base URL into the Engine.IO websocket endpoint.
///
/// `http` becomes `ws` and `https` becomes `wss`; a bare `host:port` is
/// treated as plain `ws`. Any path already ending in `/socket.io/` is kept.
pub fn socket_endpoint(base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        format!("ws://{base}")
    };
    let path = if base.ends_with(SOCKET_PATH.trim_end_matches('/')) {
        format!("{base}/")
    } else {
        format!("{base}{SOCKET_PATH}")
    };
    format!("{path}?EIO=4&transport=websocket")
}

/// Optional log file. When set, logs go there instead of stderr so they
/// do not interleave with the terminal view.
pub fn log_file() -> Option<PathBuf> {
    env::var_os("WORDBUILDER_LOG_FILE")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
