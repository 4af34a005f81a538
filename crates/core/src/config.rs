use std::env;
use std::str::FromStr;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Active profile, read from `BREWLINE_PROFILE` (empty = default).
pub fn active_profile() -> String {
    env_or("BREWLINE_PROFILE", "").to_uppercase()
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
pub fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

/// Parse a profiled env var, ignoring values that fail to parse.
pub fn profiled_env_parse<T: FromStr>(profile: &str, key: &str) -> Option<T> {
    let raw = profiled_env_opt(profile, key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}
