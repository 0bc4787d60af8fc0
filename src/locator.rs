//! Finds a control by the section it lives in rather than by its own selector

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::page::Page;

/// "A container whose title matches `phrase`, and the `marker` inside it"
#[derive(Debug, Clone)]
pub struct SectionPattern {
    /// Selector for every candidate section container
    pub container: String,
    /// Selector for the title node inside a container
    pub title: String,
    pub phrase: Regex,
    /// Selector for the wanted control inside the same container
    pub marker: String,
}

/// Scan containers in document order and return the marker of the first
/// container whose title matches and that actually has one.
///
/// Absence is `Ok(None)`; driver failures are errors. Stateless: no waiting
/// or retrying happens here.
pub async fn locate<P: Page>(page: &P, pattern: &SectionPattern) -> Result<Option<P::Element>> {
    let containers = page.find_all(&pattern.container).await?;
    debug!(
        "Scanning {} '{}' containers for '{}'",
        containers.len(),
        pattern.container,
        pattern.phrase
    );

    for (index, container) in containers.iter().enumerate() {
        let Some(title) = page.find_within(container, &pattern.title).await? else {
            continue;
        };
        let text = page.text_content(&title).await?;
        if !pattern.phrase.is_match(&text) {
            continue;
        }

        // A duplicate-titled section further down may still carry the marker
        match page.find_within(container, &pattern.marker).await? {
            Some(marker) => {
                debug!("Matched container #{} titled '{}'", index, text.trim());
                return Ok(Some(marker));
            }
            None => debug!("Container #{} matched but has no '{}'", index, pattern.marker),
        }
    }

    Ok(None)
}

#[cfg(test)]
#[path = "locator_test.rs"]
mod locator_test;
