//! The session runner: one strictly sequential workflow from login to CSV.
//!
//! Launch, login, and the search input are load-bearing. Everything
//! downstream degrades: a missing filter pill or pagination button costs
//! results, not the run. Cleanup happens on both the success and failure
//! paths, exactly once.

use std::time::Duration;

use linkscout::{ElementLike, PageLike, SessionLike, WaitState, driver};
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::error::{Result, ScoutError};
use crate::extract::{self, ProfileRecord};
use crate::persist;
use crate::scroll;
use crate::selectors;

const LOGIN_SETTLE_MS: u64 = 2_000;
const LOGIN_FIELD_TIMEOUT: Duration = Duration::from_secs(10);
const FILL_SETTLE_MS: u64 = 1_000;
const POST_SUBMIT_MS: u64 = 5_000;
const FEED_SETTLE_MS: u64 = 3_000;
const KEYWORD_TYPE_DELAY: Duration = Duration::from_millis(200);
const PRE_ENTER_MS: u64 = 1_000;
const POST_SEARCH_MS: u64 = 5_000;
const POST_PEOPLE_CLICK_MS: u64 = 5_000;
const FILTER_PANE_SETTLE_MS: u64 = 3_000;
const KEY_GAP_MS: u64 = 500;
const POST_LOCATION_TYPE_MS: u64 = 1_000;
const POST_LOCATION_ENTER_MS: u64 = 1_000;
const SHOW_RESULTS_TIMEOUT: Duration = Duration::from_secs(10);
const POST_SHOW_RESULTS_MS: u64 = 5_000;
const RESULTS_SETTLE_MS: u64 = 5_000;
const CONTAINER_TIMEOUT: Duration = Duration::from_secs(5);
const PRE_SCROLL_MS: u64 = 2_000;
const SCROLL_STEP: u32 = 300;
const SCROLL_DOWN_DELAY_MS: u64 = 500;
const SCROLL_UP_DELAY_MS: u64 = 300;
const POST_SCROLL_MS: u64 = 1_000;
const POST_NEXT_CLICK_MS: u64 = 2_000;

/// Where the workflow currently stands. Any step failure falls through to
/// cleanup and lands in `CleanedUp` regardless of progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Uninitialized,
    BrowserReady,
    LoggedIn,
    Searching,
    Filtering,
    Scraping(usize),
    Persisted,
    CleanedUp,
}

/// Owns one browser session and drives it through the whole workflow.
pub struct SessionRunner {
    config: RunConfig,
    session: Option<Box<dyn SessionLike>>,
    state: RunState,
    records: Vec<ProfileRecord>,
}

impl SessionRunner {
    /// Runner over an already-launched session.
    pub fn new(config: RunConfig, session: Box<dyn SessionLike>) -> Self {
        SessionRunner {
            config,
            session: Some(session),
            state: RunState::BrowserReady,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn records(&self) -> &[ProfileRecord] {
        &self.records
    }

    /// Runs login through persist, then cleans up on both paths.
    pub async fn run(&mut self) -> Result<()> {
        let outcome = self.run_steps().await;
        if let Err(ref err) = outcome {
            warn!(target = "scout", error = %err, "run aborted, cleaning up");
        }
        self.cleanup().await;
        outcome
    }

    async fn run_steps(&mut self) -> Result<()> {
        self.login().await?;
        self.search().await?;
        self.filter_people().await?;
        self.filter_location().await?;
        self.scrape().await?;
        self.persist()
    }

    fn page(&self) -> Result<&dyn PageLike> {
        match self.session {
            Some(ref session) => Ok(session.page()),
            None => Err(ScoutError::Browser(linkscout::Error::Closed)),
        }
    }

    async fn login(&mut self) -> Result<()> {
        let page = self.page()?;
        info!(target = "scout", url = selectors::LOGIN_URL, "logging in");
        page.goto(selectors::LOGIN_URL).await?;
        page.wait_ms(LOGIN_SETTLE_MS).await;

        page.wait_for(
            &selectors::USERNAME_FIELD,
            WaitState::Visible,
            LOGIN_FIELD_TIMEOUT,
        )
        .await?;
        page.fill(
            &selectors::USERNAME_FIELD,
            &self.config.credentials.username,
        )
        .await?;
        page.wait_ms(FILL_SETTLE_MS).await;
        page.fill(
            &selectors::PASSWORD_FIELD,
            &self.config.credentials.password,
        )
        .await?;
        page.wait_ms(FILL_SETTLE_MS).await;
        page.click(&selectors::SUBMIT_BUTTON).await?;
        page.wait_ms(POST_SUBMIT_MS).await;

        let url = page.current_url().await?;
        if selectors::LOGIN_MARKERS
            .iter()
            .any(|marker| url.contains(marker))
        {
            info!(target = "scout", %url, "login succeeded");
            self.state = RunState::LoggedIn;
            Ok(())
        } else {
            Err(ScoutError::LoginFailed { url })
        }
    }

    async fn search(&mut self) -> Result<()> {
        self.state = RunState::Searching;
        let page = self.page()?;
        info!(target = "scout", keyword = %self.config.keyword, "running search");
        page.goto(selectors::FEED_URL).await?;
        page.wait_ms(FEED_SETTLE_MS).await;

        let Some(input) = selectors::first_match(page, &selectors::SEARCH_INPUTS).await else {
            return Err(ScoutError::SearchUnavailable);
        };
        page.click(input).await?;
        page.fill(input, "").await?;
        page.type_text(&self.config.keyword, KEYWORD_TYPE_DELAY)
            .await?;
        page.wait_ms(PRE_ENTER_MS).await;
        page.press_key("Enter").await?;
        page.wait_ms(POST_SEARCH_MS).await;

        let url = page.current_url().await?;
        info!(target = "scout", %url, "search submitted");
        Ok(())
    }

    async fn filter_people(&mut self) -> Result<()> {
        self.state = RunState::Filtering;
        let page = self.page()?;
        match selectors::first_match(page, &selectors::PEOPLE_FILTERS).await {
            Some(filter) => {
                if let Err(err) = page.click(filter).await {
                    warn!(target = "scout", selector = %filter, error = %err, "people filter click failed");
                } else {
                    page.wait_ms(POST_PEOPLE_CLICK_MS).await;
                    info!(target = "scout", "people filter applied");
                }
            }
            None => {
                warn!(
                    target = "scout",
                    "people filter not found, results may span categories"
                );
            }
        }
        Ok(())
    }

    async fn filter_location(&mut self) -> Result<()> {
        let page = self.page()?;
        if let Err(err) = apply_location_filter(page, &self.config.location).await {
            warn!(target = "scout", error = %err, "location filter not applied");
        }
        Ok(())
    }

    async fn scrape(&mut self) -> Result<()> {
        let total_pages = self.config.pages;
        self.page()?.wait_ms(RESULTS_SETTLE_MS).await;

        for page_no in 1..=total_pages {
            self.state = RunState::Scraping(page_no);
            let collected = {
                let page = self.page()?;
                collect_page(page, page_no).await
            };
            let Some(mut collected) = collected else {
                break;
            };
            self.records.append(&mut collected);

            if page_no == total_pages {
                break;
            }
            let page = self.page()?;
            if !advance_page(page).await {
                break;
            }
        }

        info!(
            target = "scout",
            profiles = self.records.len(),
            "scraping finished"
        );
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        persist::write_profiles(&self.config.output, &self.records)?;
        self.state = RunState::Persisted;
        Ok(())
    }

    /// Tears the session down. Safe at any stage of initialization; a
    /// second call is a no-op.
    async fn cleanup(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(err) = session.close().await {
                warn!(target = "scout", error = %err, "session close reported an error");
            }
        }
        self.state = RunState::CleanedUp;
    }
}

/// Best-effort location filtering: open the locations pill, drive the pane
/// by keyboard, confirm with "Show results". Callers downgrade any error.
async fn apply_location_filter(page: &dyn PageLike, location: &str) -> Result<()> {
    match page.find(&selectors::LOCATION_FILTER_BUTTON).await {
        Ok(_) => {}
        Err(err) if err.is_not_found() => {
            warn!(target = "scout", "location filter button not found, skipping");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }
    info!(target = "scout", %location, "applying location filter");
    page.click(&selectors::LOCATION_FILTER_BUTTON).await?;
    page.wait_ms(FILTER_PANE_SETTLE_MS).await;

    // Two tabs walk focus from the pill into the pane's text input.
    page.press_key("Tab").await?;
    page.wait_ms(KEY_GAP_MS).await;
    page.press_key("Tab").await?;
    page.wait_ms(KEY_GAP_MS).await;
    page.type_text(location, Duration::ZERO).await?;
    page.wait_ms(POST_LOCATION_TYPE_MS).await;
    page.press_key("ArrowDown").await?;
    page.wait_ms(KEY_GAP_MS).await;
    page.press_key("Enter").await?;
    page.wait_ms(POST_LOCATION_ENTER_MS).await;

    match page
        .wait_for(
            &selectors::SHOW_RESULTS_BUTTON,
            WaitState::Visible,
            SHOW_RESULTS_TIMEOUT,
        )
        .await
    {
        Ok(()) => {
            page.click(&selectors::SHOW_RESULTS_BUTTON).await?;
            page.wait_ms(POST_SHOW_RESULTS_MS).await;
            info!(target = "scout", "location filter applied");
        }
        Err(err) => {
            warn!(target = "scout", error = %err, "show-results control did not appear");
        }
    }
    Ok(())
}

/// Scrapes one results page. `None` means the page rendered no result
/// containers and pagination should stop, whichever page this is.
async fn collect_page(page: &dyn PageLike, page_no: usize) -> Option<Vec<ProfileRecord>> {
    if let Err(err) = page
        .wait_for(
            &selectors::RESULT_CONTAINERS,
            WaitState::Visible,
            CONTAINER_TIMEOUT,
        )
        .await
    {
        warn!(target = "scout", page = page_no, error = %err, "no result containers appeared");
        return None;
    }
    let containers = match page.find_all(&selectors::RESULT_CONTAINERS).await {
        Ok(containers) => containers,
        Err(err) => {
            warn!(target = "scout", page = page_no, error = %err, "container query failed");
            return None;
        }
    };
    if containers.is_empty() {
        warn!(target = "scout", page = page_no, "zero result containers");
        return None;
    }

    info!(
        target = "scout",
        page = page_no,
        containers = containers.len(),
        "extracting profiles"
    );
    let mut records = Vec::new();
    for container in &containers {
        match container_record(container.as_ref()).await {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {
                debug!(
                    target = "scout",
                    page = page_no,
                    "container with no usable text, skipped"
                );
            }
            Err(err) => {
                debug!(target = "scout", page = page_no, error = %err, "container read failed, skipped");
            }
        }
    }
    Some(records)
}

async fn container_record(container: &dyn ElementLike) -> Result<Option<ProfileRecord>> {
    let text = container.inner_text().await?;
    let links = container.link_urls().await?;
    Ok(extract::parse_container(&text, &links))
}

/// Scrolls through the page to pull lazy content in, then clicks "Next"
/// when present. `false` means pagination is done.
async fn advance_page(page: &dyn PageLike) -> bool {
    page.wait_ms(PRE_SCROLL_MS).await;
    let script =
        scroll::smooth_scroll_script(SCROLL_STEP, SCROLL_DOWN_DELAY_MS, SCROLL_UP_DELAY_MS);
    if let Err(err) = page.evaluate(&script).await {
        debug!(target = "scout", error = %err, "smooth scroll failed");
    }
    page.wait_ms(POST_SCROLL_MS).await;

    let Some(next) = selectors::first_match(page, &selectors::NEXT_BUTTONS).await else {
        info!(target = "scout", "no next button, pagination done");
        return false;
    };
    if let Err(err) = page.click(next).await {
        warn!(target = "scout", selector = %next, error = %err, "next click failed, stopping pagination");
        return false;
    }
    page.wait_ms(POST_NEXT_CLICK_MS).await;
    true
}

/// Launches a browser session and drives the whole workflow through it.
pub async fn execute(config: RunConfig) -> Result<()> {
    let started = chrono::Local::now();
    info!(
        target = "scout",
        keyword = %config.keyword,
        location = %config.location,
        pages = config.pages,
        run = %started.format("%Y%m%d_%H%M%S"),
        "session starting"
    );

    let session = driver::launch(config.launch_options()).await?;
    let mut runner = SessionRunner::new(config, session);
    runner.run().await?;
    info!(
        target = "scout",
        profiles = runner.records().len(),
        "session finished"
    );
    Ok(())
}
