//! Login → profile → open the headline editor → commit → save

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{Config, Credentials};
use crate::delivery::deliver;
use crate::errors::{FlowFailure, RefreshError};
use crate::headline::{HeadlineChange, next_headline};
use crate::locator::locate;
use crate::page::{Page, Wait, poll_until, within};

/// States of the update flow. Transitions only move forward; `Failed` can
/// follow any state before `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlowState {
    Init,
    Authenticating,
    Authenticated,
    Navigated,
    AnchorVisible,
    ControlLocated,
    EditorOpen,
    ValueComputed,
    Committed,
    Verified,
    Done,
    Failed,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowState::Init => "init",
            FlowState::Authenticating => "authenticating",
            FlowState::Authenticated => "authenticated",
            FlowState::Navigated => "navigated",
            FlowState::AnchorVisible => "anchor visible",
            FlowState::ControlLocated => "control located",
            FlowState::EditorOpen => "editor open",
            FlowState::ValueComputed => "value computed",
            FlowState::Committed => "committed",
            FlowState::Verified => "verified",
            FlowState::Done => "done",
            FlowState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What a successful run did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Updated { previous: String, headline: String },
    Unchanged { headline: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowReport {
    pub outcome: Outcome,
    /// Every state visited, ending in `Done`
    pub trace: Vec<FlowState>,
}

/// The update flow over one page. Owns nothing but its position in the
/// state machine; the page and configuration are borrowed for the run.
pub struct SessionFlow<'a, P: Page> {
    page: &'a P,
    config: &'a Config,
    state: FlowState,
    trace: Vec<FlowState>,
}

impl<'a, P: Page> SessionFlow<'a, P> {
    pub fn new(page: &'a P, config: &'a Config) -> Self {
        SessionFlow {
            page,
            config,
            state: FlowState::Init,
            trace: vec![FlowState::Init],
        }
    }

    pub async fn run(mut self) -> Result<FlowReport, FlowFailure> {
        match self.drive().await {
            Ok(outcome) => {
                self.advance(FlowState::Done);
                Ok(FlowReport {
                    outcome,
                    trace: self.trace,
                })
            }
            Err(error) => {
                let last_state = self.state;
                warn!("Flow failed after '{}': {}", last_state, error);
                self.trace.push(FlowState::Failed);
                Err(FlowFailure {
                    last_state,
                    error,
                    trace: self.trace,
                })
            }
        }
    }

    fn advance(&mut self, next: FlowState) {
        debug_assert!(next > self.state, "flow moved backwards: {} -> {}", self.state, next);
        info!("State: {} -> {}", self.state, next);
        self.state = next;
        self.trace.push(next);
    }

    async fn drive(&mut self) -> Result<Outcome, RefreshError> {
        let config = self.config;
        let credentials = config.credentials()?;

        self.advance(FlowState::Authenticating);
        self.authenticate(credentials).await?;
        self.advance(FlowState::Authenticated);

        self.open_profile().await?;
        self.advance(FlowState::Navigated);

        self.wait_for_anchor().await?;
        self.advance(FlowState::AnchorVisible);

        let control = self.locate_control().await?;
        self.advance(FlowState::ControlLocated);

        self.open_editor(control).await?;
        self.advance(FlowState::EditorOpen);

        let current = self.read_current().await?;
        let change = next_headline(&current, config.headline_override.as_deref());
        self.advance(FlowState::ValueComputed);

        let HeadlineChange::Replace(headline) = change else {
            info!("Headline already up to date, nothing to save");
            return Ok(Outcome::Unchanged { headline: current });
        };

        info!("Updating headline to: {}", headline);
        self.commit(&headline).await?;
        self.advance(FlowState::Committed);

        self.save().await?;
        self.advance(FlowState::Verified);

        Ok(Outcome::Updated {
            previous: current,
            headline,
        })
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<(), RefreshError> {
        let site = &self.config.site;
        let timings = &self.config.timings;

        info!("Opening login page");
        self.navigate(site.login_url.as_str(), timings.login_page_load, "login page")
            .await?;

        let username = self
            .wait_for_selector(&site.username_field, timings.login_form, "login form")
            .await?;
        self.page
            .type_text(&username, &credentials.email, timings.keystroke_delay)
            .await?;

        let password = self
            .page
            .find(&site.password_field)
            .await?
            .ok_or(RefreshError::NotFound {
                what: "password field",
            })?;
        self.page
            .type_text(&password, &credentials.password, timings.keystroke_delay)
            .await?;

        let submit = self
            .page
            .find(&site.login_submit)
            .await?
            .ok_or(RefreshError::NotFound {
                what: "login submit button",
            })?;
        // The login page may land on a redirect URL with a query string
        let before = self.page.current_url().await?;
        self.page.click(&submit, timings.click_delay).await?;

        // Some logins finish without a full navigation; not seeing one is fine
        let before = before.as_str();
        let navigated = poll_until(timings.login_navigation, timings.poll_interval, move || async move {
            let url = self.page.current_url().await?;
            Ok((url != before).then_some(url))
        })
        .await;
        match navigated {
            Ok(Wait::Ready(url)) => debug!("Left login page for {}", url),
            Ok(Wait::TimedOut) => warn!(
                "No navigation within {}s of login submit, continuing",
                timings.login_navigation.as_secs()
            ),
            Err(e) => warn!("Could not observe post-login navigation: {}", e),
        }

        sleep(timings.post_login_settle).await;
        Ok(())
    }

    async fn open_profile(&self) -> Result<(), RefreshError> {
        info!("Opening profile");
        self.navigate(
            self.config.site.profile_url.as_str(),
            self.config.timings.profile_load,
            "profile page",
        )
        .await?;
        sleep(self.config.timings.profile_settle).await;
        Ok(())
    }

    async fn wait_for_anchor(&self) -> Result<(), RefreshError> {
        let anchor = &self.config.site.anchor;
        let limit = self.config.timings.anchor;

        let seen = poll_until(limit, self.config.timings.poll_interval, move || async move {
            let text = self.page.body_text().await?;
            Ok(anchor.is_match(&text).then_some(()))
        })
        .await?;

        if seen.timed_out() {
            return Err(RefreshError::Timeout {
                what: "resume headline section",
                after: limit,
            });
        }
        Ok(())
    }

    async fn locate_control(&self) -> Result<P::Element, RefreshError> {
        let pattern = &self.config.site.section;
        info!("Locating the resume headline edit control");

        if let Some(control) = locate(self.page, pattern).await? {
            return Ok(control);
        }

        // Hydration can lag behind the anchor text
        debug!("Edit control absent, retrying once after settle");
        sleep(self.config.timings.locate_settle).await;

        locate(self.page, pattern)
            .await?
            .ok_or(RefreshError::NotFound {
                what: "resume headline edit control",
            })
    }

    async fn open_editor(&self, control: P::Element) -> Result<(), RefreshError> {
        info!("Opening headline editor");
        if !deliver(self.page, &control, self.config.timings.click_delay).await {
            return Err(RefreshError::Delivery {
                what: "resume headline edit control",
            });
        }

        let editor = self
            .wait_for_selector(
                &self.config.site.editor,
                self.config.timings.editor,
                "headline editor",
            )
            .await?;

        if let Err(e) = self.page.scroll_into_view(&editor).await {
            debug!("Could not scroll editor into view: {}", e);
        }
        Ok(())
    }

    async fn read_current(&self) -> Result<String, RefreshError> {
        let editor = self.editor().await?;
        let current = self.page.read_value(&editor).await?.trim().to_string();
        info!("Current headline: {}", current);
        Ok(current)
    }

    async fn commit(&self, headline: &str) -> Result<(), RefreshError> {
        let editor = self.editor().await?;
        self.page.commit_value(&editor, headline).await?;
        sleep(self.config.timings.post_commit).await;
        Ok(())
    }

    async fn save(&self) -> Result<(), RefreshError> {
        let button = self.save_button().await?.ok_or(RefreshError::NotFound {
            what: "save button",
        })?;

        if let Err(e) = self.page.scroll_into_view(&button).await {
            debug!("Could not scroll save button into view: {}", e);
        }
        self.page.dispatch_click(&button).await?;

        // The site gives no reliable confirmation; success is assumed after the settle
        sleep(self.config.timings.post_save).await;
        info!("Resume headline saved");
        Ok(())
    }

    /// The form's submit button, else the first enabled button labelled "save"
    async fn save_button(&self) -> Result<Option<P::Element>, RefreshError> {
        let site = &self.config.site;
        if let Some(button) = self.page.find(&site.save_button).await? {
            return Ok(Some(button));
        }

        for button in self.page.find_all("button").await? {
            let label = self.page.text_content(&button).await?;
            if site.save_label.is_match(&label) && !self.page.is_disabled(&button).await? {
                return Ok(Some(button));
            }
        }
        Ok(None)
    }

    async fn editor(&self) -> Result<P::Element, RefreshError> {
        self.page
            .find(&self.config.site.editor)
            .await?
            .ok_or(RefreshError::NotFound {
                what: "headline editor",
            })
    }

    async fn navigate(
        &self,
        url: &str,
        limit: Duration,
        what: &'static str,
    ) -> Result<(), RefreshError> {
        match within(limit, self.page.goto(url)).await? {
            Wait::Ready(()) => Ok(()),
            Wait::TimedOut => Err(RefreshError::Timeout { what, after: limit }),
        }
    }

    async fn wait_for_selector(
        &self,
        css: &str,
        limit: Duration,
        what: &'static str,
    ) -> Result<P::Element, RefreshError> {
        poll_until(limit, self.config.timings.poll_interval, move || self.page.find(css))
            .await?
            .ready()
            .ok_or(RefreshError::Timeout { what, after: limit })
    }
}

#[cfg(test)]
#[path = "flow_test.rs"]
mod flow_test;
