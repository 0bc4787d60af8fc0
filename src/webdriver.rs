use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::actions::{
    InputSource, KeyAction, KeyActions, MOUSE_BUTTON_LEFT, MouseActions, PointerAction,
};
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::key::Key;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Value, json};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::BrowserSettings;
use crate::page::Page;
use crate::types::{BoundingBox, CookieJar, CookieRecord};

/// Chrome session driven over WebDriver
pub struct Browser {
    client: Client,
    slow_mo: Duration,
    // Kept alive for the session; removed on drop
    _profile_dir: TempDir,
}

impl Browser {
    /// Connect to the WebDriver endpoint and open a fresh Chrome session
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        info!("Connecting to WebDriver at {}", settings.webdriver_url);

        if !Self::is_webdriver_running(&settings.webdriver_url).await {
            anyhow::bail!(
                "Cannot connect to chromedriver at {}.\n\
                Please ensure it is running, e.g.: chromedriver --port 9515\n\
                or point WEBDRIVER_URL at a running WebDriver server",
                settings.webdriver_url
            );
        }

        // Chrome refuses to share a profile directory between sessions
        let profile_dir = tempfile::Builder::new()
            .prefix("naukri-headline-chrome-")
            .tempdir()?;

        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!(
                "--window-size={},{}",
                settings.window_width, settings.window_height
            ),
            format!("--user-data-dir={}", profile_dir.path().display()),
        ];

        if settings.headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
            args.push("--disable-dev-shm-usage".to_string());
        }

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&settings.webdriver_url)
            .await
            .context("Failed to connect to WebDriver")?;

        Ok(Browser {
            client,
            slow_mo: settings.slow_mo,
            _profile_dir: profile_dir,
        })
    }

    async fn is_webdriver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url.trim_end_matches('/'));

        match reqwest::get(&status_url).await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn call(&self, script: &str, element: &Element, extra: Vec<Value>) -> Result<Value> {
        let mut args = vec![serde_json::to_value(element)?];
        args.extend(extra);
        self.client
            .execute(script, args)
            .await
            .context("Failed to execute script")
    }

    /// Slow visible runs down so the session can be followed by eye
    async fn pace(&self) {
        if !self.slow_mo.is_zero() {
            tokio::time::sleep(self.slow_mo).await;
        }
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

/// `NoSuchElement` is absence; anything else is a real failure
fn optional(result: Result<Element, CmdError>, css: &str) -> Result<Option<Element>> {
    match result {
        Ok(element) => Ok(Some(element)),
        Err(e) if e.is_no_such_element() => Ok(None),
        Err(e) => {
            Err(anyhow::Error::new(e).context(format!("Lookup failed for selector: {}", css)))
        }
    }
}

#[async_trait]
impl Page for Browser {
    type Element = Element;

    async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.pace().await;
        self.client.goto(url).await?;

        // The caller bounds the overall wait
        let ready = "return document.readyState === 'complete';";
        loop {
            match self.client.execute(ready, vec![]).await {
                Ok(val) if val.as_bool().unwrap_or(false) => break,
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn body_text(&self) -> Result<String> {
        let text = self
            .client
            .execute("return (document.body && document.body.innerText) || '';", vec![])
            .await?;
        Ok(text.as_str().unwrap_or_default().to_string())
    }

    async fn find(&self, css: &str) -> Result<Option<Element>> {
        optional(self.client.find(Locator::Css(css)).await, css)
    }

    async fn find_all(&self, css: &str) -> Result<Vec<Element>> {
        self.client
            .find_all(Locator::Css(css))
            .await
            .context(format!("Lookup failed for selector: {}", css))
    }

    async fn find_within(&self, parent: &Element, css: &str) -> Result<Option<Element>> {
        optional(parent.find(Locator::Css(css)).await, css)
    }

    async fn text_content(&self, element: &Element) -> Result<String> {
        Ok(element.prop("textContent").await?.unwrap_or_default())
    }

    async fn is_disabled(&self, element: &Element) -> Result<bool> {
        let disabled = self.call("return !!arguments[0].disabled;", element, vec![]).await?;
        Ok(disabled.as_bool().unwrap_or(false))
    }

    async fn type_text(&self, element: &Element, text: &str, delay: Duration) -> Result<()> {
        debug!("Typing {} characters", text.chars().count());
        self.pace().await;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            element.send_keys(ch.encode_utf8(&mut buf)).await?;
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<()> {
        self.pace().await;
        self.call(
            "arguments[0].scrollIntoView({ behavior: 'instant', block: 'center' });",
            element,
            vec![],
        )
        .await?;
        Ok(())
    }

    async fn click(&self, element: &Element, delay: Duration) -> Result<()> {
        self.pace().await;
        tokio::time::sleep(delay).await;
        element.click().await?;
        Ok(())
    }

    async fn bounding_box(&self, element: &Element) -> Result<Option<BoundingBox>> {
        let rect = self
            .call(
                r#"
                const r = arguments[0].getBoundingClientRect();
                if (!r || r.width === 0 || r.height === 0) return null;
                return { x: r.x, y: r.y, width: r.width, height: r.height };
                "#,
                element,
                vec![],
            )
            .await?;

        if rect.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(rect)?))
    }

    async fn pointer_click(&self, x: f64, y: f64) -> Result<()> {
        self.pace().await;
        let mouse = MouseActions::new("mouse".to_string())
            .then(PointerAction::MoveTo {
                duration: None,
                x: x.round() as i64,
                y: y.round() as i64,
            })
            .then(PointerAction::Down {
                button: MOUSE_BUTTON_LEFT,
            })
            .then(PointerAction::Up {
                button: MOUSE_BUTTON_LEFT,
            });

        self.client.perform_actions(mouse).await?;
        self.client.release_actions().await?;
        Ok(())
    }

    async fn focus(&self, element: &Element) -> Result<()> {
        self.pace().await;
        self.call("arguments[0].focus();", element, vec![]).await?;
        Ok(())
    }

    async fn press_enter(&self) -> Result<()> {
        self.pace().await;
        let keys = KeyActions::new("keyboard".to_string())
            .then(KeyAction::Down {
                value: Key::Enter.into(),
            })
            .then(KeyAction::Up {
                value: Key::Enter.into(),
            });

        self.client.perform_actions(keys).await?;
        self.client.release_actions().await?;
        Ok(())
    }

    async fn read_value(&self, element: &Element) -> Result<String> {
        let value = self
            .call("return arguments[0].value || '';", element, vec![])
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn commit_value(&self, element: &Element, value: &str) -> Result<()> {
        self.pace().await;
        // Assigning `el.value` directly is undone by React-style controlled inputs
        let script = r#"
            const el = arguments[0];
            const proto = el instanceof HTMLTextAreaElement
                ? HTMLTextAreaElement.prototype
                : HTMLInputElement.prototype;
            el.focus();
            Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, arguments[1]);
            el.dispatchEvent(new Event('input', { bubbles: true }));
            el.dispatchEvent(new Event('change', { bubbles: true }));
        "#;
        self.call(script, element, vec![json!(value)]).await?;
        Ok(())
    }

    async fn dispatch_click(&self, element: &Element) -> Result<()> {
        self.pace().await;
        self.call(
            "arguments[0].dispatchEvent(new MouseEvent('click', { bubbles: true, cancelable: true, view: window }));",
            element,
            vec![],
        )
        .await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.client
            .screenshot()
            .await
            .context("Failed to capture screenshot")
    }

    async fn cookies(&self) -> Result<CookieJar> {
        let cookies = self.client.get_all_cookies().await?;

        let records = cookies
            .iter()
            .map(|c| CookieRecord {
                name: c.name().to_string(),
                value: c.value().to_string(),
                domain: c.domain().map(str::to_string),
                path: c.path().map(str::to_string),
                expires: c.expires_datetime().map(|t| t.unix_timestamp()),
                http_only: c.http_only(),
                secure: c.secure(),
                same_site: c.same_site().map(|s| s.to_string()),
            })
            .collect();

        Ok(CookieJar(records))
    }
}
