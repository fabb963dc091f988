//! Capability traits the workflow layer programs against, plus the small
//! value types shared between the real driver and the scripted test host.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// How an element is addressed on the page.
///
/// Fallback lists are plain slices of these, tried in order until one
/// matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(Cow<'static, str>),
    XPath(Cow<'static, str>),
}

impl Selector {
    /// Builds a CSS selector from a static string, usable in `static` tables.
    pub const fn css_static(selector: &'static str) -> Self {
        Selector::Css(Cow::Borrowed(selector))
    }

    /// Builds an XPath selector from a static string, usable in `static` tables.
    pub const fn xpath_static(selector: &'static str) -> Self {
        Selector::XPath(Cow::Borrowed(selector))
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Selector::Css(Cow::Owned(selector.into()))
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Selector::XPath(Cow::Owned(selector.into()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selector::Css(selector) | Selector::XPath(selector) => selector,
        }
    }

    pub fn is_xpath(&self) -> bool {
        matches!(self, Selector::XPath(_))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Readiness level a wait should require of the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitState {
    /// Present in the DOM and laid out (has a rendering box).
    #[default]
    Visible,
    /// Present in the DOM, visible or not.
    Attached,
}

/// Knobs for the browser process and the identity it presents.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub headless: bool,
    pub viewport: Option<(u32, u32)>,
    pub user_agent: Option<String>,
    pub accept_language: Option<String>,
    pub timezone: Option<String>,
    pub args: Vec<String>,
    /// Explicit Chromium binary; auto-detected when unset.
    pub executable: Option<PathBuf>,
    /// Download a managed Chromium build when no executable can be found,
    /// then retry the launch once.
    pub install_missing: bool,
    /// Where managed Chromium builds are cached.
    pub install_dir: Option<PathBuf>,
    /// Per-CDP-command budget; bounds navigations and long evaluations.
    pub request_timeout: Option<Duration>,
}

impl LaunchOptions {
    pub fn headless(mut self, value: bool) -> Self {
        self.headless = value;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some((width, height));
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = Some(value.into());
        self
    }

    pub fn accept_language(mut self, value: impl Into<String>) -> Self {
        self.accept_language = Some(value.into());
        self
    }

    pub fn timezone(mut self, value: impl Into<String>) -> Self {
        self.timezone = Some(value.into());
        self
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn install_missing(mut self, value: bool) -> Self {
        self.install_missing = value;
        self
    }

    pub fn install_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(path.into());
        self
    }

    pub fn request_timeout(mut self, value: Duration) -> Self {
        self.request_timeout = Some(value);
        self
    }
}

/// Handle to one matched element.
///
/// Handles re-resolve their selector on every operation, so a handle stays
/// usable across DOM updates as long as the page still has a match.
#[async_trait]
pub trait ElementLike: Send + Sync {
    /// Rendered text, as the browser lays it out.
    async fn inner_text(&self) -> Result<String>;

    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    async fn click(&self) -> Result<()>;

    /// Replaces the element's value and fires input/change events.
    async fn fill(&self, value: &str) -> Result<()>;

    /// `href` values of descendant anchors, in document order.
    async fn link_urls(&self) -> Result<Vec<String>>;
}

/// One browser tab.
#[async_trait]
pub trait PageLike: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// First match for the selector, or `Error::ElementNotFound`.
    async fn find(&self, selector: &Selector) -> Result<Box<dyn ElementLike>>;

    /// All matches for the selector; empty when nothing matches.
    async fn find_all(&self, selector: &Selector) -> Result<Vec<Box<dyn ElementLike>>>;

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()>;

    async fn click(&self, selector: &Selector) -> Result<()>;

    /// Types into the focused element, one character per key event, pausing
    /// `per_char_delay` between characters.
    async fn type_text(&self, text: &str, per_char_delay: Duration) -> Result<()>;

    /// Presses a named key ("Enter", "Tab", "ArrowDown").
    async fn press_key(&self, key: &str) -> Result<()>;

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Polls for the selector until it reaches `state`, or `Error::Timeout`.
    async fn wait_for(&self, selector: &Selector, state: WaitState, timeout: Duration)
    -> Result<()>;

    /// Unconditional pause. The scripted test host advances a fake clock
    /// instead of sleeping.
    async fn wait_ms(&self, ms: u64);
}

/// One live browser session: a page plus the process behind it.
#[async_trait]
pub trait SessionLike: Send + Sync {
    fn page(&self) -> &dyn PageLike;

    /// Tears down the page, the browser process, and the event handler, in
    /// that order. Steps that never initialized are skipped.
    async fn close(self: Box<Self>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_display_shows_raw_string() {
        let css = Selector::css_static("input.search");
        let xpath = Selector::xpath("//button[1]".to_string());
        assert_eq!(css.to_string(), "input.search");
        assert_eq!(xpath.to_string(), "//button[1]");
        assert!(!css.is_xpath());
        assert!(xpath.is_xpath());
    }

    #[test]
    fn launch_options_builder_accumulates() {
        let options = LaunchOptions::default()
            .headless(true)
            .viewport(1366, 768)
            .user_agent("UA")
            .arg("--one")
            .arg("--two")
            .install_missing(true);

        assert!(options.headless);
        assert_eq!(options.viewport, Some((1366, 768)));
        assert_eq!(options.user_agent.as_deref(), Some("UA"));
        assert_eq!(options.args, vec!["--one", "--two"]);
        assert!(options.install_missing);
        assert!(options.executable.is_none());
    }
}
