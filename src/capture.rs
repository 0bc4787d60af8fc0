//! Manual login through the external identity provider, then cookie capture

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::{self, BufRead, Write};
use tokio::time::sleep;
use tracing::info;

use crate::config::Config;
use crate::page::{Page, Wait, within};
use crate::types::CookieJar;

/// A point where the run waits for a human to finish something out of band
#[async_trait]
pub trait Checkpoint: Send + Sync {
    async fn wait_for_human(&self, message: &str) -> Result<()>;
}

/// Prompts on stderr and blocks until ENTER is pressed on stdin
pub struct TerminalCheckpoint;

#[async_trait]
impl Checkpoint for TerminalCheckpoint {
    async fn wait_for_human(&self, message: &str) -> Result<()> {
        let message = message.to_string();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut stderr = io::stderr();
            write!(stderr, "{} ", message)?;
            stderr.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(())
        })
        .await
        .context("Terminal prompt task failed")?
    }
}

/// Open login → human checkpoint → confirm on the profile page → collect cookies
pub struct SessionCapture<'a, P: Page> {
    page: &'a P,
    config: &'a Config,
}

impl<'a, P: Page> SessionCapture<'a, P> {
    pub fn new(page: &'a P, config: &'a Config) -> Self {
        SessionCapture { page, config }
    }

    pub async fn run(&self, checkpoint: &dyn Checkpoint) -> Result<CookieJar> {
        let site = &self.config.site;
        let timings = &self.config.timings;

        info!("Opening login page");
        self.open(site.login_url.as_str(), timings.login_page_load)
            .await?;

        checkpoint
            .wait_for_human(
                "In the opened browser, finish the external (Google) login, then press ENTER here...",
            )
            .await?;

        info!("Opening profile to confirm the session");
        self.open(site.profile_url.as_str(), timings.profile_load)
            .await?;
        sleep(timings.capture_settle).await;

        let jar = self.page.cookies().await?;
        info!("Captured {} cookies", jar.len());
        Ok(jar)
    }

    async fn open(&self, url: &str, limit: std::time::Duration) -> Result<()> {
        match within(limit, self.page.goto(url)).await? {
            Wait::Ready(()) => Ok(()),
            Wait::TimedOut => anyhow::bail!("Timed out after {:?} loading {}", limit, url),
        }
    }
}

#[cfg(test)]
#[path = "capture_test.rs"]
mod capture_test;
