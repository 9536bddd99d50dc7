use crate::config::types::{Config, CrawlerConfig, OutputConfig, SelectorConfig, UserAgentConfig};
use crate::crawler::compile_selector;
use crate::url::{is_allowed_domain, page_url};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(
            "request_timeout must be at least 1 second".to_string(),
        ));
    }

    let first_page = page_url(&config.start_url_template, 1).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid start_url_template '{}': {}",
            config.start_url_template, e
        ))
    })?;

    if let Some(allowed) = &config.allowed_domain {
        if allowed.trim().is_empty() {
            return Err(ConfigError::Validation(
                "allowed_domain cannot be empty when set".to_string(),
            ));
        }

        if !is_allowed_domain(&first_page, Some(allowed)) {
            return Err(ConfigError::Validation(format!(
                "start_url_template host is outside allowed_domain '{}'",
                allowed
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    if config.agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user agent cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.export_path.is_empty() {
        return Err(ConfigError::Validation(
            "export_path cannot be empty".to_string(),
        ));
    }

    if config.database_path == config.export_path {
        return Err(ConfigError::Validation(format!(
            "database_path and export_path must differ, both are '{}'",
            config.database_path
        )));
    }

    Ok(())
}

/// Validates that every selector compiles
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.item,
        &config.title,
        &config.price,
        &config.availability,
        &config.rating,
    ] {
        compile_selector(selector)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = Config::default();
        config.crawler.concurrency = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.crawler.concurrency = 101;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.crawler.concurrency = 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_template_without_placeholder() {
        let mut config = Config::default();
        config.crawler.start_url_template =
            "http://books.toscrape.com/catalogue/page-1.html".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_template_outside_allowed_domain() {
        let mut config = Config::default();
        config.crawler.start_url_template = "https://other.org/page-{page}".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.crawler.allowed_domain = None;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_user_agent() {
        let mut config = Config::default();
        config.user_agent.agent = "   ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_output_paths() {
        let mut config = Config::default();
        config.output.export_path = String::new();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.output.export_path = config.output.database_path.clone();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_bad_selector() {
        let mut config = Config::default();
        config.selectors.price = "p..price[".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidSelector { .. })
        ));
    }
}
