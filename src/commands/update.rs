use anyhow::Result;
use tracing::{error, info, warn};

use naukri_headline::{Browser, Config, SessionFlow, diagnostics};

pub async fn handle_update(config: &Config) -> Result<()> {
    // Missing credentials fail before any browser is started
    config.credentials()?;

    info!("Refreshing resume headline");
    let browser = Browser::launch(&config.browser).await?;

    let result = SessionFlow::new(&browser, config).run().await;

    if let Err(failure) = &result {
        error!("{}", failure);
        diagnostics::capture_failure_screenshot(&browser, &config.screenshot_dir).await;
    }

    // Always release the browser, whatever state the flow ended in
    if let Err(e) = browser.close().await {
        warn!("Failed to close browser: {}", e);
    }

    let report = result?;
    println!("{}", serde_json::to_string(&report.outcome)?);
    Ok(())
}
