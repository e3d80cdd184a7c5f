use reqwest::Url;
use tracing::warn;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Worker pool sizes and the request gate are non-zero
/// - Catalog and index base URLs parse
/// - Warns (without failing) when no seeds are configured
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.http.max_concurrent_requests == 0 {
        return Err(ConfigError::ValidationError(
            "http.max_concurrent_requests cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.enumeration_workers == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.enumeration_workers cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.resolution_workers == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.resolution_workers cannot be 0".to_string(),
        ));
    }

    for (field, url) in [
        ("catalog.base_url", &config.catalog.base_url),
        ("index.base_url", &config.index.base_url),
    ] {
        Url::parse(url)
            .map_err(|e| ConfigError::ValidationError(format!("{} is invalid: {}", field, e)))?;
    }

    if config.seeds.is_empty() {
        warn!("No seeds configured; the run will not discover anything");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_gate_fails() {
        let mut config = Config::default();
        config.http.max_concurrent_requests = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let mut config = Config::default();
        config.orchestrator.resolution_workers = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.orchestrator.enumeration_workers = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_url_fails() {
        let mut config = Config::default();
        config.index.base_url = "not a url".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("index.base_url"));
    }
}
