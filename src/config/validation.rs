use crate::config::types::{
    BrowserConfig, Config, CrawlerConfig, OutputConfig, SearchConfig, SelectorConfig,
};
use crate::url::build_search_url;
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound on listings harvested in one run
const MAX_RESULTS_CEILING: usize = 500;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_selectors(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the search query and URL template
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.query.trim().is_empty() {
        return Err(ConfigError::Validation("query cannot be empty".to_string()));
    }

    if !config.url_template.contains("{query}") {
        return Err(ConfigError::Validation(format!(
            "url-template must contain a {{query}} placeholder, got '{}'",
            config.url_template
        )));
    }

    let url = build_search_url(&config.url_template, &config.query)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid url-template: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "url-template must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_results < 1 || config.max_results > MAX_RESULTS_CEILING {
        return Err(ConfigError::Validation(format!(
            "max-results must be between 1 and {}, got {}",
            MAX_RESULTS_CEILING, config.max_results
        )));
    }

    if config.stall_limit < 1 {
        return Err(ConfigError::Validation(
            "stall-limit must be >= 1".to_string(),
        ));
    }

    if config.settle_interval < 100 {
        return Err(ConfigError::Validation(format!(
            "settle-interval must be >= 100ms, got {}ms",
            config.settle_interval
        )));
    }

    if config.page_load_timeout == 0 {
        return Err(ConfigError::Validation(
            "page-load-timeout must be > 0".to_string(),
        ));
    }

    if config.poll_interval == 0 || config.poll_interval > config.page_load_timeout {
        return Err(ConfigError::Validation(format!(
            "poll-interval must be between 1 and page-load-timeout ({}ms), got {}ms",
            config.page_load_timeout, config.poll_interval
        )));
    }

    if config.scroll_step == 0 {
        return Err(ConfigError::Validation(
            "scroll-step must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates the WebDriver endpoint and window geometry
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.webdriver_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "webdriver-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.browser_name.is_empty() {
        return Err(ConfigError::Validation(
            "browser-name cannot be empty".to_string(),
        ));
    }

    validate_window_size(&config.window_size)?;

    Ok(())
}

/// Window size must look like `1400,900`
fn validate_window_size(size: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = size.split(',').collect();
    let valid = parts.len() == 2
        && parts
            .iter()
            .all(|p| p.trim().parse::<u32>().map(|v| v > 0).unwrap_or(false));

    if !valid {
        return Err(ConfigError::Validation(format!(
            "window-size must be 'width,height', got '{}'",
            size
        )));
    }

    Ok(())
}

/// Every selector must compile before a browser is ever launched
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    let selectors = [
        ("feed", &config.feed),
        ("listing-anchor", &config.listing_anchor),
        ("name", &config.name),
        ("rating", &config.rating),
        ("review-count", &config.review_count),
        ("cuisine", &config.cuisine),
        ("address", &config.address),
        ("phone", &config.phone),
        ("website", &config.website),
    ];

    for (field, selector) in selectors {
        validate_selector(field, selector)?;
    }

    if let Some(attribute) = &config.review_count_attribute {
        if attribute.trim().is_empty() {
            return Err(ConfigError::Validation(
                "review-count-attribute cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_selector(field: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector {
            field: field.to_string(),
            message: "selector cannot be empty".to_string(),
        });
    }

    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        field: field.to_string(),
        message: format!("{:?}", e),
    })?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report-path cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.debug_dump_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "debug-dump-path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
