//! linkscout-core: Chromium automation capability for session-driven scraping
//!
//! This crate wraps a CDP-driven Chromium behind a small set of traits so the
//! workflow layer can run against a real browser in production and a scripted
//! fake host in tests.
//!
//! # Example
//!
//! ```ignore
//! use linkscout::{LaunchOptions, Selector, SessionLike, driver};
//!
//! #[tokio::main]
//! async fn main() -> linkscout::Result<()> {
//!     let options = LaunchOptions::default()
//!         .headless(true)
//!         .viewport(1366, 768);
//!     let session = driver::launch(options).await?;
//!
//!     let page = session.page();
//!     page.goto("https://example.com").await?;
//!     let heading = page.find(&Selector::css("h1")).await?;
//!     println!("{}", heading.inner_text().await?);
//!
//!     session.close().await
//! }
//! ```

pub mod driver;
pub mod error;
mod js;
mod keys;
pub mod session;
pub mod testing;

pub use error::{Error, Result};
pub use session::{ElementLike, LaunchOptions, PageLike, Selector, SessionLike, WaitState};
