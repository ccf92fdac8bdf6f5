use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

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
/// Every setting has a default; the only failures are unparseable values.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got '{other}'"),
            }),
        }
    };

    let env = parse_environment(&or_default("LIA_ENV", "development"))?;
    let log_level = or_default("LIA_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("LIA_OUTPUT_DIR", "outputs"));
    let webdriver_url = or_default("LIA_WEBDRIVER_URL", "http://localhost:9515");
    let user_data_dir = PathBuf::from(or_default("LIA_USER_DATA_DIR", ".pw"));
    let driver_timeout_secs = parse_u64("LIA_DRIVER_TIMEOUT_SECS", "4")?;
    let container_wait_secs = parse_u64("LIA_CONTAINER_WAIT_SECS", "8")?;
    let record_empty_profiles = parse_bool("LIA_RECORD_EMPTY_PROFILES", "true")?;

    // An empty key is treated the same as an unset one.
    let deepseek_api_key = lookup("DEEPSEEK_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let deepseek_base_url = or_default("DEEPSEEK_BASE_URL", "https://api.deepseek.com");
    let deepseek_model = or_default("DEEPSEEK_MODEL", "deepseek-chat");
    let classifier_timeout_secs = parse_u64("LIA_CLASSIFIER_TIMEOUT_SECS", "30")?;

    Ok(AppConfig {
        env,
        log_level,
        output_dir,
        webdriver_url,
        user_data_dir,
        driver_timeout_secs,
        container_wait_secs,
        record_empty_profiles,
        deepseek_api_key,
        deepseek_base_url,
        deepseek_model,
        classifier_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LIA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
