//! LinkedIn people-search session runner.
//!
//! Logs into LinkedIn with credentials from `LINKEDIN_USERNAME` /
//! `LINKEDIN_PASSWORD`, runs a keyword search, narrows it to the People
//! category and a location, scrapes the visible result cards across a few
//! pages, and writes them to a CSV file.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod persist;
pub mod runner;
pub mod scroll;
pub mod selectors;
