use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

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

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be a non-negative finite number, got {raw}"),
            })
        }
    };

    let service_key = require("CITYPULSE_SERVICE_KEY")?;
    let kakao_key = require("CITYPULSE_KAKAO_KEY")?;

    let elastic_url = or_default("CITYPULSE_ELASTIC_URL", "http://localhost:9200");
    let log_level = or_default("CITYPULSE_LOG_LEVEL", "info");
    let areas_path = PathBuf::from(or_default("CITYPULSE_AREAS_PATH", "./config/areas.yaml"));
    let holidays_path = PathBuf::from(or_default(
        "CITYPULSE_HOLIDAYS_PATH",
        "./config/holidays.yaml",
    ));

    let batch_size = parse_usize("CITYPULSE_BATCH_SIZE", "1000")?;
    if batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CITYPULSE_BATCH_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let radius_meters = parse_f64("CITYPULSE_RADIUS_METERS", "300")?;
    let request_timeout_secs = parse_u64("CITYPULSE_REQUEST_TIMEOUT_SECS", "30")?;
    let max_concurrent_requests = parse_usize("CITYPULSE_MAX_CONCURRENT_REQUESTS", "4")?;
    let max_retries = parse_u32("CITYPULSE_MAX_RETRIES", "0")?;
    let retry_backoff_base_ms = parse_u64("CITYPULSE_RETRY_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        service_key,
        kakao_key,
        elastic_url,
        batch_size,
        radius_meters,
        log_level,
        areas_path,
        holidays_path,
        request_timeout_secs,
        max_concurrent_requests,
        max_retries,
        retry_backoff_base_ms,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated with valid values.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("CITYPULSE_SERVICE_KEY", "test-service-key");
        m.insert("CITYPULSE_KAKAO_KEY", "test-kakao-key");
        m
    }

    #[test]
    fn build_app_config_fails_without_service_key() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CITYPULSE_SERVICE_KEY"),
            "expected MissingEnvVar(CITYPULSE_SERVICE_KEY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_without_kakao_key() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CITYPULSE_SERVICE_KEY", "test-service-key");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CITYPULSE_KAKAO_KEY"),
            "expected MissingEnvVar(CITYPULSE_KAKAO_KEY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_applies_defaults() {
        let map = full_env();
        let config = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(config.elastic_url, "http://localhost:9200");
        assert_eq!(config.batch_size, 1000);
        assert!((config.radius_meters - 300.0).abs() < f64::EPSILON);
        assert_eq!(config.max_concurrent_requests, 4);
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn build_app_config_rejects_non_numeric_batch_size() {
        let mut map = full_env();
        map.insert("CITYPULSE_BATCH_SIZE", "lots");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CITYPULSE_BATCH_SIZE"),
            "expected InvalidEnvVar(CITYPULSE_BATCH_SIZE), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_zero_batch_size() {
        let mut map = full_env();
        map.insert("CITYPULSE_BATCH_SIZE", "0");
        assert!(build_app_config(lookup_from_map(&map)).is_err());
    }

    #[test]
    fn build_app_config_rejects_negative_radius() {
        let mut map = full_env();
        map.insert("CITYPULSE_RADIUS_METERS", "-50");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CITYPULSE_RADIUS_METERS"),
            "expected InvalidEnvVar(CITYPULSE_RADIUS_METERS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_overrides_from_env() {
        let mut map = full_env();
        map.insert("CITYPULSE_RADIUS_METERS", "500");
        map.insert("CITYPULSE_BATCH_SIZE", "250");
        let config = build_app_config(lookup_from_map(&map)).unwrap();
        assert!((config.radius_meters - 500.0).abs() < f64::EPSILON);
        assert_eq!(config.batch_size, 250);
    }
}
