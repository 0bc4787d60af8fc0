//! Gets a click through to an element that may be covered, not yet
//! interactive, or not laid out yet

use anyhow::{Result, anyhow};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::page::Page;

/// Ways of delivering a click, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Element-level click
    ElementClick,
    /// Pointer move/press/release at the element's center
    PointerSequence,
    /// Focus the element and press Enter
    FocusAndEnter,
}

impl Tier {
    pub const CHAIN: [Tier; 3] = [Tier::ElementClick, Tier::PointerSequence, Tier::FocusAndEnter];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::ElementClick => write!(f, "element click"),
            Tier::PointerSequence => write!(f, "pointer sequence"),
            Tier::FocusAndEnter => write!(f, "focus + Enter"),
        }
    }
}

/// Try each tier until one completes without error.
///
/// A tier counts as delivered when it does not fail; whether the page reacted
/// is not observable here. Scroll position and focus are left wherever the
/// successful tier put them.
pub async fn deliver<P: Page>(page: &P, element: &P::Element, click_delay: Duration) -> bool {
    // Best-effort: an element that cannot be scrolled may still take a click
    if let Err(e) = page.scroll_into_view(element).await {
        debug!("scrollIntoView failed, continuing: {}", e);
    }

    for tier in Tier::CHAIN {
        match attempt(page, element, tier, click_delay).await {
            Ok(()) => {
                debug!("Click delivered via {}", tier);
                return true;
            }
            Err(e) => debug!("{} failed: {}", tier, e),
        }
    }

    false
}

async fn attempt<P: Page>(
    page: &P,
    element: &P::Element,
    tier: Tier,
    click_delay: Duration,
) -> Result<()> {
    match tier {
        Tier::ElementClick => page.click(element, click_delay).await,
        Tier::PointerSequence => {
            let bbox = page
                .bounding_box(element)
                .await?
                .filter(|b| !b.is_empty())
                .ok_or_else(|| anyhow!("element has no bounding box"))?;
            let (x, y) = bbox.center();
            page.pointer_click(x, y).await
        }
        Tier::FocusAndEnter => {
            page.focus(element).await?;
            page.press_enter().await
        }
    }
}

#[cfg(test)]
#[path = "delivery_test.rs"]
mod delivery_test;
