//! # naukri-headline
#![allow(clippy::uninlined_format_args)]
//!
//! Keeps a job-portal profile looking recently updated by re-saving its
//! resume headline through a real browser session.
//!
//! ## CLI Usage
//!
//! ```bash
//! # chromedriver must be reachable (default http://localhost:9515)
//! chromedriver --port 9515 &
//!
//! # Log in, append "." to the headline if missing, save
//! NAUKRI_EMAIL=me@example.com NAUKRI_PASSWORD=... naukri-headline
//!
//! # Replace the headline instead
//! FORCE_HEADLINE="Looking for new opportunities" naukri-headline
//!
//! # Headless
//! HEADLESS=true naukri-headline
//!
//! # Log in by hand through the external identity provider and keep the cookies
//! naukri-headline capture-session
//! ```
//!
//! Results are printed as JSON on stdout; logs go to stderr. Exit code 0 means
//! the headline was saved or already up to date, 1 means the run failed.
//!
//! ## Engine
//!
//! The interaction engine is independent of the specific workflow:
//!
//! - [`locator::locate`] finds a control by the titled section that contains it
//! - [`delivery::deliver`] gets a click through via element click, pointer
//!   sequence, or focus + Enter
//! - [`flow::SessionFlow`] sequences login, navigation, locate, edit and save
//!   with a bounded wait between each step
//!
//! All of them work against the [`page::Page`] trait; [`webdriver::Browser`]
//! is the WebDriver implementation.

/// Configuration read from the environment
pub mod config;

/// Error taxonomy and flow failures
pub mod errors;

/// Headline new-value rule
pub mod headline;

/// Page abstraction and bounded waits
pub mod page;

/// Section-relative element lookup
pub mod locator;

/// Multi-tier click delivery
pub mod delivery;

/// The update state machine
pub mod flow;

/// Manual login and cookie capture
pub mod capture;

/// Failure screenshots
pub mod diagnostics;

/// Shared value types
pub mod types;

/// WebDriver browser control
pub mod webdriver;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use errors::{FlowFailure, RefreshError};
pub use flow::{FlowReport, FlowState, Outcome, SessionFlow};
pub use page::{Page, Wait};
pub use types::{BoundingBox, CookieJar, CookieRecord};
pub use webdriver::Browser;
