//! The seam between the interaction engine and a live browser page

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::types::{BoundingBox, CookieJar};

/// A single browser page driven by one sequential flow.
///
/// Element handles are only valid until the page navigates or re-renders;
/// callers must not keep them past the stage that looked them up.
#[async_trait]
pub trait Page: Send + Sync {
    type Element: Clone + Send + Sync;

    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Rendered text of the whole document body
    async fn body_text(&self) -> Result<String>;

    /// First element matching `css`, `None` when nothing matches
    async fn find(&self, css: &str) -> Result<Option<Self::Element>>;

    /// All elements matching `css`, in document order
    async fn find_all(&self, css: &str) -> Result<Vec<Self::Element>>;

    async fn find_within(
        &self,
        parent: &Self::Element,
        css: &str,
    ) -> Result<Option<Self::Element>>;

    async fn text_content(&self, element: &Self::Element) -> Result<String>;

    async fn is_disabled(&self, element: &Self::Element) -> Result<bool>;

    /// Type text one keystroke at a time
    async fn type_text(&self, element: &Self::Element, text: &str, delay: Duration) -> Result<()>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()>;

    /// Element-level click after `delay`
    async fn click(&self, element: &Self::Element, delay: Duration) -> Result<()>;

    /// Viewport-relative box, `None` when the element is not rendered
    async fn bounding_box(&self, element: &Self::Element) -> Result<Option<BoundingBox>>;

    /// Move, press and release the primary pointer at viewport coordinates
    async fn pointer_click(&self, x: f64, y: f64) -> Result<()>;

    async fn focus(&self, element: &Self::Element) -> Result<()>;

    /// Press and release Enter on whatever holds focus
    async fn press_enter(&self) -> Result<()>;

    /// Current `value` property of an input or textarea
    async fn read_value(&self, element: &Self::Element) -> Result<String>;

    /// Set `value` through the prototype's native setter, then fire `input`
    /// and `change` so framework listeners pick it up
    async fn commit_value(&self, element: &Self::Element, value: &str) -> Result<()>;

    /// Dispatch a synthetic bubbling `click` MouseEvent on the element
    async fn dispatch_click(&self, element: &Self::Element) -> Result<()>;

    /// PNG snapshot of the page
    async fn screenshot(&self) -> Result<Vec<u8>>;

    async fn cookies(&self) -> Result<CookieJar>;
}

/// Outcome of a bounded wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wait<T> {
    Ready(T),
    TimedOut,
}

impl<T> Wait<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Wait::Ready(value) => Some(value),
            Wait::TimedOut => None,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, Wait::TimedOut)
    }
}

/// Run `fut` for at most `limit`
pub async fn within<T, F>(limit: Duration, fut: F) -> Result<Wait<T>>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map(Wait::Ready),
        Err(_) => Ok(Wait::TimedOut),
    }
}

/// Re-run `probe` every `interval` until it yields a value or `limit` passes.
///
/// A probe error ends the wait immediately.
pub async fn poll_until<T, F, Fut>(limit: Duration, interval: Duration, mut probe: F) -> Result<Wait<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let polling = async move {
        loop {
            if let Some(value) = probe().await? {
                return Ok::<T, anyhow::Error>(value);
            }
            tokio::time::sleep(interval).await;
        }
    };

    within(limit, polling).await
}

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;
