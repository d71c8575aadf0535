use crate::config::types::{
    Config, CrawlerConfig, FetcherConfig, RegistrationConfig, SourceConfig, UserAgentConfig,
};
use crate::ConfigError;
use chrono::Datelike;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_crawler_config(&config.crawler)?;
    validate_registration_config(&config.registration)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates the source site and crawl window
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let base = validate_http_url("base-url", &config.base_url)?;

    // Relative detail links only resolve under the base when it is a directory
    if !base.path().ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "base-url must end with '/', got '{}'",
            config.base_url
        )));
    }

    // The window starts at the first of the start month
    let start_month = config.start_date.with_day(1).unwrap_or(config.start_date);
    if start_month > config.end_date {
        return Err(ConfigError::Validation(format!(
            "start-date {} is after end-date {}",
            config.start_date, config.end_date
        )));
    }

    Ok(())
}

/// Validates fetch retry settings
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates crawler fan-out
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_events < 1 || config.max_concurrent_events > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-events must be between 1 and 100, got {}",
            config.max_concurrent_events
        )));
    }

    Ok(())
}

/// Validates the registration endpoint
fn validate_registration_config(config: &RegistrationConfig) -> Result<(), ConfigError> {
    validate_http_url("registration endpoint", &config.endpoint)?;
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Parses a URL and requires an HTTP(S) scheme
fn validate_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(url)
}
