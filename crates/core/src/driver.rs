//! Chromium-backed implementation of the session capability.
//!
//! The browser is driven over CDP through `chromiumoxide`. Element handles
//! stay selector-addressed (see [`crate::js`]) so a handle never goes stale
//! between navigations; each operation re-resolves against the live DOM.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetTimezoneOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::js;
use crate::keys;
use crate::session::{ElementLike, LaunchOptions, PageLike, Selector, SessionLike, WaitState};

const WAIT_POLL_INTERVAL_MS: u64 = 100;

/// Launches Chromium and returns a live session.
///
/// When no usable executable can be found and `install_missing` is set, a
/// managed Chromium build is downloaded and the launch retried once.
pub async fn launch(options: LaunchOptions) -> Result<Box<dyn SessionLike>> {
    match launch_once(&options).await {
        Ok(session) => Ok(session),
        Err(err) if options.install_missing && is_missing_executable(&err) => {
            warn!("no usable chromium executable ({err}), downloading a managed build");
            let executable = install_chromium(options.install_dir.clone()).await?;
            info!("installed chromium at {}", executable.display());
            let retry = LaunchOptions {
                executable: Some(executable),
                ..options
            };
            launch_once(&retry).await
        }
        Err(err) => Err(err),
    }
}

async fn launch_once(options: &LaunchOptions) -> Result<Box<dyn SessionLike>> {
    let config = build_config(options)?;
    let (mut browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| Error::Launch(e.to_string()))?;

    // The handler must be pumped for the whole session; it ends when the
    // browser disconnects.
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(err) => {
            let _ = browser.kill().await;
            handler_task.abort();
            return Err(err.into());
        }
    };
    if let Err(err) = apply_identity(&page, options).await {
        let _ = browser.kill().await;
        handler_task.abort();
        return Err(err);
    }

    info!("chromium session ready");
    Ok(Box::new(ChromeSession {
        page: ChromePage { page },
        browser,
        handler: handler_task,
    }))
}

fn build_config(options: &LaunchOptions) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder();
    if !options.headless {
        builder = builder.with_head();
    }
    if let Some((width, height)) = options.viewport {
        builder = builder.window_size(width, height);
    }
    if let Some(ref executable) = options.executable {
        builder = builder.chrome_executable(executable);
    }
    for arg in &options.args {
        builder = builder.arg(arg);
    }
    if let Some(timeout) = options.request_timeout {
        builder = builder.request_timeout(timeout);
    }
    builder.build().map_err(Error::Launch)
}

/// Overrides the identity the page reports: user agent, language, timezone
/// and device metrics.
async fn apply_identity(page: &Page, options: &LaunchOptions) -> Result<()> {
    if let Some(ref user_agent) = options.user_agent {
        let mut builder = SetUserAgentOverrideParams::builder().user_agent(user_agent);
        if let Some(ref accept_language) = options.accept_language {
            builder = builder.accept_language(accept_language);
        }
        let params = builder.build().map_err(Error::Launch)?;
        page.execute(params).await?;
    }
    if let Some(ref timezone) = options.timezone {
        page.execute(SetTimezoneOverrideParams::new(timezone.clone()))
            .await?;
    }
    if let Some((width, height)) = options.viewport {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(width))
            .height(i64::from(height))
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(Error::Launch)?;
        page.execute(params).await?;
    }
    Ok(())
}

fn is_missing_executable(err: &Error) -> bool {
    match err {
        Error::Launch(message) => {
            message.contains("auto detect") || message.contains("No such file")
        }
        _ => false,
    }
}

/// Downloads a managed Chromium build into the cache directory and returns
/// the executable path.
async fn install_chromium(install_dir: Option<PathBuf>) -> Result<PathBuf> {
    let dir = install_dir.unwrap_or_else(|| std::env::temp_dir().join("linkscout-chromium"));
    tokio::fs::create_dir_all(&dir).await?;
    let fetcher_options = BrowserFetcherOptions::builder()
        .with_path(&dir)
        .build()
        .map_err(|e| Error::Install(e.to_string()))?;
    let fetcher = BrowserFetcher::new(fetcher_options);
    let info = fetcher
        .fetch()
        .await
        .map_err(|e| Error::Install(e.to_string()))?;
    Ok(info.executable_path)
}

async fn eval(page: &Page, script: &str) -> Result<serde_json::Value> {
    let result = page
        .evaluate(script)
        .await
        .map_err(|e| Error::JsEval(e.to_string()))?;
    Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
}

struct ChromePage {
    page: Page,
}

#[async_trait]
impl PageLike for ChromePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(|e| Error::Navigation {
            url: url.to_string(),
            source: anyhow::Error::new(e),
        })?;
        // Settle is best effort; some navigations complete before the
        // listener attaches.
        if let Err(err) = self.page.wait_for_navigation().await {
            debug!(%url, "navigation settle returned: {err}");
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn find(&self, selector: &Selector) -> Result<Box<dyn ElementLike>> {
        let exists = eval(&self.page, &js::exists_script(selector))
            .await?
            .as_bool()
            .unwrap_or(false);
        if !exists {
            return Err(Error::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(Box::new(ChromeElement {
            page: self.page.clone(),
            selector: selector.clone(),
            index: None,
        }))
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Box<dyn ElementLike>>> {
        let count = eval(&self.page, &js::count_script(selector))
            .await?
            .as_u64()
            .unwrap_or(0) as usize;
        Ok((0..count)
            .map(|index| {
                Box::new(ChromeElement {
                    page: self.page.clone(),
                    selector: selector.clone(),
                    index: Some(index),
                }) as Box<dyn ElementLike>
            })
            .collect())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()> {
        let filled = eval(&self.page, &js::fill_script(selector, None, value))
            .await?
            .as_bool()
            .unwrap_or(false);
        if filled {
            Ok(())
        } else {
            Err(Error::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        let clicked = eval(&self.page, &js::click_script(selector, None))
            .await?
            .as_bool()
            .unwrap_or(false);
        if clicked {
            Ok(())
        } else {
            Err(Error::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn type_text(&self, text: &str, per_char_delay: Duration) -> Result<()> {
        for c in text.chars() {
            let event = keys::char_event(c)?;
            self.page
                .execute(event)
                .await
                .map_err(|e| Error::Input(e.to_string()))?;
            if !per_char_delay.is_zero() {
                tokio::time::sleep(per_char_delay).await;
            }
        }
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        for event in keys::key_events(key)? {
            self.page
                .execute(event)
                .await
                .map_err(|e| Error::Input(e.to_string()))?;
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        eval(&self.page, script).await
    }

    async fn wait_for(
        &self,
        selector: &Selector,
        state: WaitState,
        timeout: Duration,
    ) -> Result<()> {
        let ms = timeout.as_millis() as u64;
        let script = js::wait_for_selector_script(selector, state, ms, WAIT_POLL_INTERVAL_MS);
        let found = eval(&self.page, &script).await?.as_bool().unwrap_or(false);
        if found {
            Ok(())
        } else {
            Err(Error::Timeout {
                ms,
                condition: selector.to_string(),
            })
        }
    }

    async fn wait_ms(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

struct ChromeElement {
    page: Page,
    selector: Selector,
    index: Option<usize>,
}

impl ChromeElement {
    fn not_found(&self) -> Error {
        Error::ElementNotFound {
            selector: self.selector.to_string(),
        }
    }
}

#[async_trait]
impl ElementLike for ChromeElement {
    async fn inner_text(&self) -> Result<String> {
        let value = eval(
            &self.page,
            &js::inner_text_script(&self.selector, self.index),
        )
        .await?;
        match value.get("text").and_then(|text| text.as_str()) {
            Some(text) => Ok(text.to_string()),
            None => Err(self.not_found()),
        }
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        let value = eval(
            &self.page,
            &js::attribute_script(&self.selector, self.index, name),
        )
        .await?;
        if value.is_null() {
            return Err(self.not_found());
        }
        Ok(value
            .get("value")
            .and_then(|attr| attr.as_str())
            .map(str::to_string))
    }

    async fn click(&self) -> Result<()> {
        let clicked = eval(&self.page, &js::click_script(&self.selector, self.index))
            .await?
            .as_bool()
            .unwrap_or(false);
        if clicked { Ok(()) } else { Err(self.not_found()) }
    }

    async fn fill(&self, value: &str) -> Result<()> {
        let filled = eval(
            &self.page,
            &js::fill_script(&self.selector, self.index, value),
        )
        .await?
        .as_bool()
        .unwrap_or(false);
        if filled { Ok(()) } else { Err(self.not_found()) }
    }

    async fn link_urls(&self) -> Result<Vec<String>> {
        let value = eval(
            &self.page,
            &js::link_urls_script(&self.selector, self.index),
        )
        .await?;
        if value.is_null() {
            return Err(self.not_found());
        }
        let urls = value
            .get("urls")
            .and_then(|urls| urls.as_array())
            .map(|urls| {
                urls.iter()
                    .filter_map(|url| url.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(urls)
    }
}

struct ChromeSession {
    page: ChromePage,
    browser: Browser,
    handler: JoinHandle<()>,
}

#[async_trait]
impl SessionLike for ChromeSession {
    fn page(&self) -> &dyn PageLike {
        &self.page
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromeSession {
            page,
            mut browser,
            handler,
        } = *self;
        drop(page);
        if let Err(err) = browser.close().await {
            debug!("browser close returned: {err}");
        }
        let _ = browser.kill().await;
        handler.abort();
        info!("chromium session closed");
        Ok(())
    }
}
