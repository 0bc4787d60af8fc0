//! Failure screenshots

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::page::Page;

/// File name for a screenshot taken at `millis` since the epoch
pub fn screenshot_name(millis: i64) -> String {
    format!("debug_error_{}.png", millis)
}

/// Save a screenshot of the page into `dir`.
///
/// Best-effort: this runs while a failure is already being reported, so its
/// own errors are logged at debug level and otherwise dropped.
pub async fn capture_failure_screenshot<P: Page>(page: &P, dir: &Path) -> Option<PathBuf> {
    match try_capture(page, dir).await {
        Ok(path) => {
            info!("Saved failure screenshot to {}", path.display());
            Some(path)
        }
        Err(e) => {
            debug!("Could not save failure screenshot: {}", e);
            None
        }
    }
}

async fn try_capture<P: Page>(page: &P, dir: &Path) -> Result<PathBuf> {
    let png = page.screenshot().await?;
    let path = dir.join(screenshot_name(chrono::Utc::now().timestamp_millis()));
    tokio::fs::write(&path, png).await?;
    Ok(path)
}
