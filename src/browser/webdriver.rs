//! Browser session over a WebDriver server
//!
//! Wraps a [`fantoccini::Client`]. Before a session is requested the driver's
//! `/status` endpoint is checked so a driver that is still starting fails with
//! a readable error instead of a connection reset.

use crate::browser::{BrowserSession, Document, Locator, SessionError, SessionResult};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::{Capabilities, TimeoutConfiguration};
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Value};
use std::time::Duration;

/// Upper bound on the driver status request
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Scrolls the first element matching `arguments[0]` by `arguments[1]` pixels,
/// falling back to the window when nothing matches
const SCROLL_SCRIPT: &str = r#"
const el = document.querySelector(arguments[0]);
if (el) {
    el.scrollTop += arguments[1];
    return true;
}
window.scrollBy(0, arguments[1]);
return false;
"#;

/// A browser session driven through a WebDriver server
pub struct WebDriverSession {
    client: Option<Client>,
    page_load_timeout: Duration,
    poll_interval: Duration,
}

impl WebDriverSession {
    /// Opens a new browser session
    ///
    /// # Arguments
    ///
    /// * `config` - WebDriver endpoint and browser launch options
    /// * `page_load_timeout` - Upper bound on a single navigation
    /// * `poll_interval` - Interval between element-presence polls
    ///
    /// If the session opens but cannot be configured, it is closed again
    /// before the error is returned.
    pub async fn connect(
        config: &BrowserConfig,
        page_load_timeout: Duration,
        poll_interval: Duration,
    ) -> SessionResult<Self> {
        let status = check_status(&config.webdriver_url).await?;
        tracing::debug!("WebDriver ready: {}", status);

        let mut builder = ClientBuilder::rustls();
        builder.capabilities(build_capabilities(config));
        let client = builder.connect(&config.webdriver_url).await?;
        tracing::info!("WebDriver session started at {}", config.webdriver_url);

        let timeouts = TimeoutConfiguration::new(None, Some(page_load_timeout), None);
        if let Err(e) = client.update_timeouts(timeouts).await {
            tracing::warn!("Failed to configure session timeouts: {}", e);
            if let Err(close_err) = client.close().await {
                tracing::warn!("Failed to release WebDriver session: {}", close_err);
            }
            return Err(e.into());
        }

        Ok(Self {
            client: Some(client),
            page_load_timeout,
            poll_interval,
        })
    }

    /// True until [`BrowserSession::close`] has run
    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> SessionResult<&Client> {
        self.client.as_ref().ok_or(SessionError::Closed)
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        match self.client()?.goto(url).await {
            Ok(()) => Ok(()),
            Err(CmdError::Standard(e)) if e.error() == "timeout" => {
                Err(SessionError::Timeout {
                    what: format!("page load of {}", url),
                    waited: self.page_load_timeout,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn current_document(&mut self) -> SessionResult<Document> {
        let client = self.client()?;
        let url = client.current_url().await?;
        let source = client.source().await?;
        Ok(Document::new(url.as_str(), source))
    }

    async fn invoke_scroll_step(&mut self, container: &Locator, pixels: u32) -> SessionResult<()> {
        let scrolled_container = self
            .client()?
            .execute(SCROLL_SCRIPT, vec![json!(container.css()), json!(pixels)])
            .await?;

        if scrolled_container != Value::Bool(true) {
            tracing::debug!("No element matched {}; scrolled the window instead", container);
        }

        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> SessionResult<()> {
        let found = self
            .client()?
            .wait()
            .at_most(timeout)
            .every(self.poll_interval)
            .for_element(fantoccini::Locator::Css(locator.css()))
            .await;

        match found {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(SessionError::Timeout {
                what: locator.css().to_string(),
                waited: timeout,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn close(&mut self) -> SessionResult<()> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };

        client.close().await?;
        tracing::info!("WebDriver session closed");
        Ok(())
    }
}

/// Asks the driver whether it can open a new session
///
/// # Returns
///
/// * `Ok(message)` - The driver reported itself ready
/// * `Err(SessionError::NotReady)` - The driver answered but is not ready
/// * `Err(SessionError)` - The driver could not be reached
pub async fn check_status(webdriver_url: &str) -> SessionResult<String> {
    let url = format!("{}/status", webdriver_url.trim_end_matches('/'));
    let client = reqwest::Client::builder().timeout(STATUS_TIMEOUT).build()?;

    let body: Value = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let status = &body["value"];
    let message = status["message"].as_str().unwrap_or_default().to_string();

    match status["ready"].as_bool() {
        Some(true) => Ok(message),
        Some(false) => Err(SessionError::NotReady(message)),
        None => Err(SessionError::Protocol(
            "status response has no ready flag".to_string(),
        )),
    }
}

/// Builds the `alwaysMatch` capabilities for the configured browser
///
/// Chrome and Firefox receive their vendor option blocks; any other browser
/// name is passed through with no vendor options.
pub fn build_capabilities(config: &BrowserConfig) -> Capabilities {
    let (width, height) = config
        .window_size
        .split_once(',')
        .map(|(w, h)| (w.trim(), h.trim()))
        .unwrap_or(("1400", "900"));

    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!(config.browser_name));

    match config.browser_name.as_str() {
        "chrome" | "chromium" => {
            let mut args = vec![
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-blink-features=AutomationControlled".to_string(),
                format!("--window-size={},{}", width, height),
                format!("--lang={}", config.language),
            ];
            if config.headless {
                args.push("--headless=new".to_string());
            }
            if let Some(user_agent) = &config.user_agent {
                args.push(format!("--user-agent={}", user_agent));
            }

            caps.insert(
                "goog:chromeOptions".to_string(),
                json!({
                    "args": args,
                    "excludeSwitches": ["enable-automation"],
                }),
            );
        }
        "firefox" => {
            let mut args = vec![format!("--width={}", width), format!("--height={}", height)];
            if config.headless {
                args.push("-headless".to_string());
            }

            let mut prefs = json!({ "intl.accept_languages": config.language });
            if let Some(user_agent) = &config.user_agent {
                prefs["general.useragent.override"] = json!(user_agent);
            }

            caps.insert(
                "moz:firefoxOptions".to_string(),
                json!({ "args": args, "prefs": prefs }),
            );
        }
        _ => {}
    }

    caps
}
