// Scripted in-memory page for unit tests

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::config::{Config, SiteConfig};
use crate::page::Page;
use crate::types::{BoundingBox, CookieJar, CookieRecord};

pub const POST_LOGIN_URL: &str = "https://www.naukri.com/mnjuser/homepage";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Field(String),
    SaveSubmit,
    Section(usize),
    Title(usize),
    Marker(usize),
    Editor,
    Button(usize),
}

#[derive(Debug, Clone)]
pub struct FakeSection {
    pub title: String,
    pub has_marker: bool,
}

impl FakeSection {
    pub fn new(title: &str, has_marker: bool) -> Self {
        FakeSection {
            title: title.to_string(),
            has_marker,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeButton {
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug)]
pub struct FakeState {
    pub sections: Vec<FakeSection>,
    /// Container scans that come back empty before sections render
    pub sections_hidden_for: usize,
    pub buttons: Vec<FakeButton>,
    pub explicit_save: bool,
    pub login_form: bool,
    pub anchor_visible: bool,
    pub headline: String,
    pub editor_open: bool,
    pub editor_never_opens: bool,
    pub navigate_after_login: bool,
    pub hang_on: Option<String>,
    /// Requested URL -> URL the page actually lands on
    pub redirects: HashMap<String, String>,
    pub fail_scroll: bool,
    pub fail_click: bool,
    pub fail_pointer: bool,
    pub no_bounding_box: bool,
    pub fail_focus: bool,
    pub fail_screenshot: bool,
    pub cookies: CookieJar,
    pub url: String,
    pub focused: Option<Node>,
    pub typed: HashMap<String, String>,
    pub saved: bool,
    pub calls: Vec<String>,
    container_scans: usize,
}

/// Profile page with one "Resume headline" section by default
pub struct FakePage {
    site: SiteConfig,
    state: Mutex<FakeState>,
}

impl FakePage {
    pub const SCREENSHOT: &'static [u8] = b"\x89PNG fake";

    pub fn new() -> Self {
        FakePage {
            site: SiteConfig::naukri().unwrap(),
            state: Mutex::new(FakeState {
                sections: vec![
                    FakeSection::new("Key skills", true),
                    FakeSection::new("Resume headline", true),
                ],
                sections_hidden_for: 0,
                buttons: vec![],
                explicit_save: true,
                login_form: true,
                anchor_visible: true,
                headline: "Backend Engineer".to_string(),
                editor_open: false,
                editor_never_opens: false,
                navigate_after_login: true,
                hang_on: None,
                redirects: HashMap::new(),
                fail_scroll: false,
                fail_click: false,
                fail_pointer: false,
                no_bounding_box: false,
                fail_focus: false,
                fail_screenshot: false,
                cookies: CookieJar(vec![CookieRecord {
                    name: "nauk_at".to_string(),
                    value: "token".to_string(),
                    domain: Some(".naukri.com".to_string()),
                    path: Some("/".to_string()),
                    expires: None,
                    http_only: Some(true),
                    secure: Some(true),
                    same_site: None,
                }]),
                url: "about:blank".to_string(),
                focused: None,
                typed: HashMap::new(),
                saved: false,
                calls: vec![],
                container_scans: 0,
            }),
        }
    }

    pub fn with(self, configure: impl FnOnce(&mut FakeState)) -> Self {
        configure(&mut self.state());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn called(&self, name: &str) -> bool {
        self.state().calls.iter().any(|c| c == name)
    }

    fn record(&self, call: impl Into<String>) {
        self.state().calls.push(call.into());
    }

    fn open_editor(state: &mut FakeState) {
        if !state.editor_never_opens {
            state.editor_open = true;
        }
    }
}

/// Configuration with credentials set and the given override
pub fn test_config(headline_override: Option<&str>) -> Config {
    let headline_override = headline_override.map(str::to_string);
    Config::from_lookup(|key| match key {
        "NAUKRI_EMAIL" => Some("me@example.com".to_string()),
        "NAUKRI_PASSWORD" => Some("secret".to_string()),
        "FORCE_HEADLINE" => headline_override.clone(),
        _ => None,
    })
    .unwrap()
}

#[async_trait]
impl Page for FakePage {
    type Element = Node;

    async fn goto(&self, url: &str) -> Result<()> {
        self.record(format!("goto {}", url));
        let hangs = self.state().hang_on.as_deref() == Some(url);
        if hangs {
            std::future::pending::<()>().await;
        }
        let mut state = self.state();
        let landed = state
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        state.url = landed;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state().url.clone())
    }

    async fn body_text(&self) -> Result<String> {
        Ok(if self.state().anchor_visible {
            "My profile\nResume headline\nKey skills".to_string()
        } else {
            "Loading...".to_string()
        })
    }

    async fn find(&self, css: &str) -> Result<Option<Node>> {
        let site = &self.site;
        let state = self.state();
        let node = if css == site.username_field
            || css == site.password_field
            || css == site.login_submit
        {
            state.login_form.then(|| Node::Field(css.to_string()))
        } else if css == site.editor {
            state.editor_open.then_some(Node::Editor)
        } else if css == site.save_button {
            state.explicit_save.then_some(Node::SaveSubmit)
        } else {
            None
        };
        Ok(node)
    }

    async fn find_all(&self, css: &str) -> Result<Vec<Node>> {
        let mut state = self.state();
        if css == self.site.section.container {
            state.container_scans += 1;
            if state.container_scans <= state.sections_hidden_for {
                return Ok(vec![]);
            }
            return Ok((0..state.sections.len()).map(Node::Section).collect());
        }
        if css == "button" {
            return Ok((0..state.buttons.len()).map(Node::Button).collect());
        }
        Ok(vec![])
    }

    async fn find_within(&self, parent: &Node, css: &str) -> Result<Option<Node>> {
        let state = self.state();
        let Node::Section(i) = parent else {
            return Ok(None);
        };
        if css == self.site.section.title {
            Ok(Some(Node::Title(*i)))
        } else if css == self.site.section.marker {
            Ok(state.sections[*i].has_marker.then_some(Node::Marker(*i)))
        } else {
            Ok(None)
        }
    }

    async fn text_content(&self, element: &Node) -> Result<String> {
        let state = self.state();
        Ok(match element {
            Node::Title(i) => state.sections[*i].title.clone(),
            Node::Button(i) => state.buttons[*i].label.clone(),
            _ => String::new(),
        })
    }

    async fn is_disabled(&self, element: &Node) -> Result<bool> {
        Ok(match element {
            Node::Button(i) => self.state().buttons[*i].disabled,
            _ => false,
        })
    }

    async fn type_text(&self, element: &Node, text: &str, _delay: Duration) -> Result<()> {
        self.record("type");
        if let Node::Field(css) = element {
            self.state().typed.insert(css.clone(), text.to_string());
        }
        Ok(())
    }

    async fn scroll_into_view(&self, _element: &Node) -> Result<()> {
        self.record("scroll");
        if self.state().fail_scroll {
            bail!("element detached");
        }
        Ok(())
    }

    async fn click(&self, element: &Node, _delay: Duration) -> Result<()> {
        self.record("click");
        let mut state = self.state();
        // Login controls stay clickable so failures only hit the page under test
        if state.fail_click && !matches!(element, Node::Field(_)) {
            bail!("element click intercepted");
        }
        match element {
            Node::Marker(_) => Self::open_editor(&mut state),
            Node::Field(css) if *css == self.site.login_submit && state.navigate_after_login => {
                state.url = POST_LOGIN_URL.to_string();
            }
            _ => {}
        }
        Ok(())
    }

    async fn bounding_box(&self, _element: &Node) -> Result<Option<BoundingBox>> {
        Ok((!self.state().no_bounding_box).then_some(BoundingBox {
            x: 10.0,
            y: 20.0,
            width: 16.0,
            height: 16.0,
        }))
    }

    async fn pointer_click(&self, x: f64, y: f64) -> Result<()> {
        self.record(format!("pointer {},{}", x, y));
        let mut state = self.state();
        if state.fail_pointer {
            bail!("pointer actions unsupported");
        }
        Self::open_editor(&mut state);
        Ok(())
    }

    async fn focus(&self, element: &Node) -> Result<()> {
        self.record("focus");
        let mut state = self.state();
        if state.fail_focus {
            bail!("element not focusable");
        }
        state.focused = Some(element.clone());
        Ok(())
    }

    async fn press_enter(&self) -> Result<()> {
        self.record("enter");
        let mut state = self.state();
        if matches!(state.focused, Some(Node::Marker(_))) {
            Self::open_editor(&mut state);
        }
        Ok(())
    }

    async fn read_value(&self, element: &Node) -> Result<String> {
        if *element != Node::Editor {
            bail!("not an input");
        }
        Ok(self.state().headline.clone())
    }

    async fn commit_value(&self, element: &Node, value: &str) -> Result<()> {
        if *element != Node::Editor {
            bail!("not an input");
        }
        self.record(format!("commit {}", value));
        self.state().headline = value.to_string();
        Ok(())
    }

    async fn dispatch_click(&self, element: &Node) -> Result<()> {
        match element {
            Node::SaveSubmit => self.record("save"),
            Node::Button(i) => self.record(format!("save button {}", i)),
            _ => bail!("not a button"),
        }
        self.state().saved = true;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        if self.state().fail_screenshot {
            bail!("no browsing context");
        }
        Ok(Self::SCREENSHOT.to_vec())
    }

    async fn cookies(&self) -> Result<CookieJar> {
        Ok(self.state().cookies.clone())
    }
}
