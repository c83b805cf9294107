use std::env;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// Events feed credential; absent means catalog fallback only
    pub predicthq_api_key: Option<String>,
    pub search_radius_miles: u32,
    pub task_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            predicthq_api_key: env::var("PREDICTHQ_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            search_radius_miles: env::var("SEARCH_RADIUS_MILES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("SEARCH_RADIUS_MILES must be a valid number"),
            task_timeout_secs: env::var("TASK_TIMEOUT_SECS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .expect("TASK_TIMEOUT_SECS must be a valid number"),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .expect("REQUEST_TIMEOUT_SECS must be a valid number"),
        }
    }
}

/// Locate the static data directory. Checks ./config first, then ../config
/// (for running from the workspace root or the crate directory).
pub fn resolve_data_dir() -> Option<PathBuf> {
    if Path::new("./config").exists() {
        Some(PathBuf::from("./config"))
    } else if Path::new("../config").exists() {
        Some(PathBuf::from("../config"))
    } else {
        None
    }
}
