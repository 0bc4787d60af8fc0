use anyhow::Result;
use serde_json::json;
use tracing::{info, warn};

use naukri_headline::capture::{SessionCapture, TerminalCheckpoint};
use naukri_headline::{Browser, Config};

pub async fn handle_capture(config: &Config) -> Result<()> {
    info!("Capturing a manually authenticated session");
    let browser = Browser::launch(&config.browser).await?;

    let result = SessionCapture::new(&browser, config)
        .run(&TerminalCheckpoint)
        .await;

    if let Err(e) = browser.close().await {
        warn!("Failed to close browser: {}", e);
    }

    let jar = result?;
    jar.save(&config.cookie_file)?;
    info!("Cookies saved to {}", config.cookie_file.display());

    println!(
        "{}",
        json!({
            "saved_to": config.cookie_file.display().to_string(),
            "cookies": jar.len(),
        })
    );
    Ok(())
}
