use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

#[derive(Debug, Error)]
pub enum ScoutError {
    /// Login submitted but the site did not land on an authenticated page.
    #[error("login failed, landed on: {url}")]
    LoginFailed { url: String },

    /// The global search input never matched any known selector.
    #[error("search input not found on the feed page")]
    SearchUnavailable,

    #[error(transparent)]
    Browser(#[from] linkscout::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
