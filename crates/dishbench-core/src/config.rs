use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_SEARCH_URL_TEMPLATE: &str = "https://www.swiggy.com/search?query={query}";
pub const DEFAULT_API_MARKER: &str = "v3?";
pub const DEFAULT_REPLAY_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";
pub const DEFAULT_IMAGE_CDN_BASE: &str =
    "https://media-assets.swiggy.com/swiggy/image/upload/fl_lossy,f_auto,q_auto,w_208,h_208,c_fit/";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every key has a default, so an empty lookup yields a usable config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        parse_value::<SocketAddr>(var, &or_default(var, default))
    };
    let parse_u32 =
        |var: &str, default: &str| parse_value::<u32>(var, &or_default(var, default));
    let parse_u64 =
        |var: &str, default: &str| parse_value::<u64>(var, &or_default(var, default));
    let parse_usize =
        |var: &str, default: &str| parse_value::<usize>(var, &or_default(var, default));
    let parse_flag = |var: &str, default: &str| parse_bool(var, &or_default(var, default));

    let env = parse_environment(&or_default("DISHBENCH_ENV", "development"))?;
    let bind_addr = parse("DISHBENCH_BIND_ADDR", "0.0.0.0:5600")?;
    let log_level = or_default("DISHBENCH_LOG_LEVEL", "info");

    let search_url_template =
        or_default("DISHBENCH_SEARCH_URL_TEMPLATE", DEFAULT_SEARCH_URL_TEMPLATE);
    if !search_url_template.contains("{query}") {
        return Err(ConfigError::InvalidEnvVar {
            var: "DISHBENCH_SEARCH_URL_TEMPLATE".to_string(),
            reason: "template must contain a {query} placeholder".to_string(),
        });
    }

    let api_marker = or_default("DISHBENCH_API_MARKER", DEFAULT_API_MARKER);
    if api_marker.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "DISHBENCH_API_MARKER".to_string(),
            reason: "marker must not be empty".to_string(),
        });
    }

    let browser_headless = parse_flag("DISHBENCH_BROWSER_HEADLESS", "true")?;
    let browser_no_sandbox = parse_flag("DISHBENCH_BROWSER_NO_SANDBOX", "true")?;
    let chrome_path = lookup("DISHBENCH_CHROME_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);
    let navigation_timeout_secs = parse_u64("DISHBENCH_NAVIGATION_TIMEOUT_SECS", "60")?;
    let idle_window_ms = parse_u64("DISHBENCH_IDLE_WINDOW_MS", "500")?;
    let idle_max_inflight = parse_usize("DISHBENCH_IDLE_MAX_INFLIGHT", "2")?;

    let replay_timeout_secs = parse_u64("DISHBENCH_REPLAY_TIMEOUT_SECS", "30")?;
    let replay_user_agent = or_default("DISHBENCH_REPLAY_USER_AGENT", DEFAULT_REPLAY_USER_AGENT);
    let replay_max_retries = parse_u32("DISHBENCH_REPLAY_MAX_RETRIES", "0")?;
    let replay_backoff_base_secs = parse_u64("DISHBENCH_REPLAY_BACKOFF_BASE_SECS", "2")?;

    let image_cdn_base = or_default("DISHBENCH_IMAGE_CDN_BASE", DEFAULT_IMAGE_CDN_BASE);
    let top_n = parse_usize("DISHBENCH_TOP_N", "5")?;
    let rate_limit_per_minute = parse_usize("DISHBENCH_RATE_LIMIT_PER_MINUTE", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        search_url_template,
        api_marker,
        browser_headless,
        browser_no_sandbox,
        chrome_path,
        navigation_timeout_secs,
        idle_window_ms,
        idle_max_inflight,
        replay_timeout_secs,
        replay_user_agent,
        replay_max_retries,
        replay_backoff_base_secs,
        image_cdn_base,
        top_n,
        rate_limit_per_minute,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DISHBENCH_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
