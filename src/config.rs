//! Process configuration, read once from the environment at startup

use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::errors::RefreshError;
use crate::locator::SectionPattern;

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const DEFAULT_COOKIE_FILE: &str = "naukri.cookies.json";
const VISIBLE_SLOW_MO: Duration = Duration::from_millis(40);

/// Immutable run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Account used by the update flow
    pub credentials: Option<Credentials>,
    /// Replacement headline; `None` means "append the terminator"
    pub headline_override: Option<String>,
    /// Where the capture flow writes the cookie jar
    pub cookie_file: PathBuf,
    /// Where failure screenshots go
    pub screenshot_dir: PathBuf,
    pub browser: BrowserSettings,
    pub site: SiteConfig,
    pub timings: Timings,
}

/// Account credential pair
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How the WebDriver session is opened
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    /// Pause before each browser interaction; zero when headless
    pub slow_mo: Duration,
    pub window_width: u32,
    pub window_height: u32,
}

/// Everything known about the target site's pages and controls
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub login_url: Url,
    pub profile_url: Url,
    pub username_field: String,
    pub password_field: String,
    pub login_submit: String,
    /// Phrase whose presence in the page text means the section rendered
    pub anchor: Regex,
    pub section: SectionPattern,
    pub editor: String,
    pub save_button: String,
    /// Label of the fallback save button
    pub save_label: Regex,
}

impl SiteConfig {
    pub fn naukri() -> Result<Self> {
        let base = Url::parse("https://www.naukri.com/")?;
        let headline = Regex::new(r"(?i)resume\s*headline")?;

        Ok(SiteConfig {
            login_url: base.join("nlogin/login")?,
            profile_url: base.join("mnjuser/profile")?,
            username_field: "#usernameField".to_string(),
            password_field: "#passwordField".to_string(),
            login_submit: r#"#loginForm button[type="submit"]"#.to_string(),
            anchor: headline.clone(),
            section: SectionPattern {
                container: ".widgetHead".to_string(),
                title: ".widgetTitle".to_string(),
                phrase: headline,
                marker: "span.edit.icon".to_string(),
            },
            editor: "#resumeHeadlineTxt".to_string(),
            save_button: r#"form[name="resumeHeadlineForm"] button[type="submit"]"#.to_string(),
            save_label: Regex::new(r"(?i)save")?,
        })
    }
}

/// Bounds and settle delays for every suspension point
#[derive(Debug, Clone)]
pub struct Timings {
    pub login_page_load: Duration,
    pub login_form: Duration,
    pub login_navigation: Duration,
    pub post_login_settle: Duration,
    pub profile_load: Duration,
    pub profile_settle: Duration,
    pub anchor: Duration,
    pub locate_settle: Duration,
    pub editor: Duration,
    pub post_commit: Duration,
    pub post_save: Duration,
    pub capture_settle: Duration,
    pub poll_interval: Duration,
    pub keystroke_delay: Duration,
    pub click_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            login_page_load: Duration::from_secs(60),
            login_form: Duration::from_secs(20),
            login_navigation: Duration::from_secs(30),
            post_login_settle: Duration::from_millis(600),
            profile_load: Duration::from_secs(60),
            profile_settle: Duration::from_millis(800),
            anchor: Duration::from_secs(15),
            locate_settle: Duration::from_millis(600),
            editor: Duration::from_secs(15),
            post_commit: Duration::from_millis(400),
            post_save: Duration::from_millis(1200),
            capture_settle: Duration::from_millis(1500),
            poll_interval: Duration::from_millis(100),
            keystroke_delay: Duration::from_millis(40),
            click_delay: Duration::from_millis(40),
        }
    }
}

impl Config {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let credentials = match (non_empty("NAUKRI_EMAIL"), lookup("NAUKRI_PASSWORD")) {
            (Some(email), Some(password)) if !password.is_empty() => {
                Some(Credentials { email, password })
            }
            _ => None,
        };

        let headless = lookup("HEADLESS").is_some_and(|v| v.trim() == "true");

        let webdriver_url =
            non_empty("WEBDRIVER_URL").unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string());
        Url::parse(&webdriver_url)
            .with_context(|| format!("WEBDRIVER_URL is not a valid URL: {}", webdriver_url))?;

        Ok(Config {
            credentials,
            headline_override: non_empty("FORCE_HEADLINE"),
            cookie_file: non_empty("NAUKRI_COOKIES_FILE")
                .unwrap_or_else(|| DEFAULT_COOKIE_FILE.to_string())
                .into(),
            screenshot_dir: non_empty("DEBUG_SCREENSHOT_DIR")
                .unwrap_or_else(|| ".".to_string())
                .into(),
            browser: BrowserSettings {
                webdriver_url,
                headless,
                slow_mo: if headless {
                    Duration::ZERO
                } else {
                    VISIBLE_SLOW_MO
                },
                window_width: 1366,
                window_height: 900,
            },
            site: SiteConfig::naukri()?,
            timings: Timings::default(),
        })
    }

    /// Credentials, or the configuration error the update flow reports
    pub fn credentials(&self) -> Result<&Credentials, RefreshError> {
        self.credentials.as_ref().ok_or_else(|| {
            RefreshError::Config("Missing NAUKRI_EMAIL or NAUKRI_PASSWORD".to_string())
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
