//! Scripted in-memory host for exercising workflows without a browser.
//!
//! [`MockPage`] serves a sequence of [`FakeDom`] snapshots. Clicking a dom's
//! `advance_on` selector moves to the next snapshot, which models a
//! navigation; every sleep and wait is charged to a counter instead of the
//! wall clock, so timing behavior stays assertable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::session::{ElementLike, PageLike, Selector, SessionLike, WaitState};

/// One operation observed by the mock host, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Goto(String),
    Fill { selector: String, value: String },
    Click { selector: String },
    Type(String),
    Press(String),
    Evaluate(String),
}

/// Element scripted into a [`FakeDom`].
#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    text: String,
    links: Vec<String>,
    attributes: HashMap<String, String>,
}

impl FakeElement {
    pub fn new(text: impl Into<String>) -> Self {
        FakeElement {
            text: text.into(),
            ..FakeElement::default()
        }
    }

    pub fn link(mut self, url: impl Into<String>) -> Self {
        self.links.push(url.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// One page snapshot: the elements present and, optionally, the selector
/// whose click advances to the next snapshot.
#[derive(Debug, Clone, Default)]
pub struct FakeDom {
    url: Option<String>,
    elements: HashMap<String, Vec<FakeElement>>,
    advance_on: Option<String>,
}

impl FakeDom {
    pub fn new() -> Self {
        FakeDom::default()
    }

    /// URL the page reports while this snapshot is current.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn element(mut self, selector: impl Into<String>, element: FakeElement) -> Self {
        self.elements.entry(selector.into()).or_default().push(element);
        self
    }

    pub fn elements(mut self, selector: impl Into<String>, elements: Vec<FakeElement>) -> Self {
        self.elements.entry(selector.into()).or_default().extend(elements);
        self
    }

    /// Clicking this selector advances to the next snapshot.
    pub fn advance_on(mut self, selector: impl Into<String>) -> Self {
        self.advance_on = Some(selector.into());
        self
    }
}

#[derive(Debug, Default)]
struct PageState {
    url: Mutex<String>,
    doms: Mutex<Vec<FakeDom>>,
    current: Mutex<usize>,
    actions: Mutex<Vec<Action>>,
    waited_ms: Mutex<u64>,
    eval_results: Mutex<HashMap<String, serde_json::Value>>,
}

/// Scripted [`PageLike`] implementation.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    state: Arc<PageState>,
}

impl MockPage {
    /// Page with a single empty snapshot.
    pub fn new() -> Self {
        MockPage::with_doms(vec![FakeDom::new()])
    }

    pub fn with_doms(doms: Vec<FakeDom>) -> Self {
        let page = MockPage {
            state: Arc::new(PageState::default()),
        };
        *page.state.doms.lock().unwrap() = doms;
        page
    }

    /// Everything the workflow did, in order.
    pub fn actions(&self) -> Vec<Action> {
        self.state.actions.lock().unwrap().clone()
    }

    /// Total virtual milliseconds charged by sleeps, typing delays and
    /// failed waits. Nothing in the mock touches the wall clock.
    pub fn waited_ms(&self) -> u64 {
        *self.state.waited_ms.lock().unwrap()
    }

    /// Index of the snapshot currently being served.
    pub fn current_dom(&self) -> usize {
        *self.state.current.lock().unwrap()
    }

    /// Scripts the value returned for an exact `evaluate` call.
    pub fn set_eval_result(&self, script: impl Into<String>, value: serde_json::Value) {
        self.state.eval_results.lock().unwrap().insert(script.into(), value);
    }

    fn record(&self, action: Action) {
        self.state.actions.lock().unwrap().push(action);
    }

    fn charge(&self, ms: u64) {
        *self.state.waited_ms.lock().unwrap() += ms;
    }

    fn element_count(&self, selector: &str) -> usize {
        let doms = self.state.doms.lock().unwrap();
        let current = *self.state.current.lock().unwrap();
        doms.get(current)
            .and_then(|dom| dom.elements.get(selector))
            .map_or(0, Vec::len)
    }

    fn with_element<T>(
        &self,
        selector: &str,
        index: usize,
        f: impl FnOnce(&FakeElement) -> T,
    ) -> Result<T> {
        let doms = self.state.doms.lock().unwrap();
        let current = *self.state.current.lock().unwrap();
        doms.get(current)
            .and_then(|dom| dom.elements.get(selector))
            .and_then(|elements| elements.get(index))
            .map(f)
            .ok_or_else(|| Error::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    /// Shared click path for page- and element-level clicks.
    fn click_selector(&self, selector: &str) -> Result<()> {
        self.record(Action::Click {
            selector: selector.to_string(),
        });
        if self.element_count(selector) == 0 {
            return Err(Error::ElementNotFound {
                selector: selector.to_string(),
            });
        }

        let doms = self.state.doms.lock().unwrap();
        let mut current = self.state.current.lock().unwrap();
        let advances = doms
            .get(*current)
            .is_some_and(|dom| dom.advance_on.as_deref() == Some(selector));
        if advances && *current + 1 < doms.len() {
            *current += 1;
            if let Some(url) = doms[*current].url.clone() {
                *self.state.url.lock().unwrap() = url;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PageLike for MockPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.record(Action::Goto(url.to_string()));
        *self.state.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.url.lock().unwrap().clone())
    }

    async fn find(&self, selector: &Selector) -> Result<Box<dyn ElementLike>> {
        if self.element_count(selector.as_str()) == 0 {
            return Err(Error::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(Box::new(MockElement {
            selector: selector.as_str().to_string(),
            index: 0,
            page: self.clone(),
        }))
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Box<dyn ElementLike>>> {
        Ok((0..self.element_count(selector.as_str()))
            .map(|index| {
                Box::new(MockElement {
                    selector: selector.as_str().to_string(),
                    index,
                    page: self.clone(),
                }) as Box<dyn ElementLike>
            })
            .collect())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()> {
        self.record(Action::Fill {
            selector: selector.as_str().to_string(),
            value: value.to_string(),
        });
        if self.element_count(selector.as_str()) == 0 {
            return Err(Error::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        self.click_selector(selector.as_str())
    }

    async fn type_text(&self, text: &str, per_char_delay: Duration) -> Result<()> {
        self.record(Action::Type(text.to_string()));
        self.charge(per_char_delay.as_millis() as u64 * text.chars().count() as u64);
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.record(Action::Press(key.to_string()));
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.record(Action::Evaluate(script.to_string()));
        let results = self.state.eval_results.lock().unwrap();
        Ok(results.get(script).cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn wait_for(
        &self,
        selector: &Selector,
        _state: WaitState,
        timeout: Duration,
    ) -> Result<()> {
        if self.element_count(selector.as_str()) > 0 {
            return Ok(());
        }
        let ms = timeout.as_millis() as u64;
        self.charge(ms);
        Err(Error::Timeout {
            ms,
            condition: selector.to_string(),
        })
    }

    async fn wait_ms(&self, ms: u64) {
        self.charge(ms);
    }
}

/// Selector-addressed element handle into the current snapshot. Goes stale
/// the same way a real handle would once the page advances.
struct MockElement {
    selector: String,
    index: usize,
    page: MockPage,
}

#[async_trait]
impl ElementLike for MockElement {
    async fn inner_text(&self) -> Result<String> {
        self.page
            .with_element(&self.selector, self.index, |element| element.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.page.with_element(&self.selector, self.index, |element| {
            element.attributes.get(name).cloned()
        })
    }

    async fn click(&self) -> Result<()> {
        self.page.click_selector(&self.selector)
    }

    async fn fill(&self, value: &str) -> Result<()> {
        self.page.record(Action::Fill {
            selector: self.selector.clone(),
            value: value.to_string(),
        });
        self.page.with_element(&self.selector, self.index, |_| ())
    }

    async fn link_urls(&self) -> Result<Vec<String>> {
        self.page
            .with_element(&self.selector, self.index, |element| element.links.clone())
    }
}

/// Scripted [`SessionLike`] wrapper counting how often it was closed.
pub struct MockSession {
    page: MockPage,
    close_calls: Arc<Mutex<usize>>,
}

impl MockSession {
    pub fn new(page: MockPage) -> Self {
        MockSession {
            page,
            close_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Counter handle that stays valid after the session is consumed.
    pub fn close_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.close_calls)
    }
}

#[async_trait]
impl SessionLike for MockSession {
    fn page(&self) -> &dyn PageLike {
        &self.page
    }

    async fn close(self: Box<Self>) -> Result<()> {
        *self.close_calls.lock().unwrap() += 1;
        Ok(())
    }
}
