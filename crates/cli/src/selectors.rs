//! Locator strategy tables and the fixed URLs the workflow drives.
//!
//! The site churns its markup, so anything beyond the login form is
//! addressed through an ordered fallback list tried front to back. A new
//! markup generation means a new row in the table, not a new branch.

use linkscout::{PageLike, Selector};
use tracing::debug;

pub const LOGIN_URL: &str = "https://www.linkedin.com/login";
pub const FEED_URL: &str = "https://www.linkedin.com/feed/";

/// URL fragments that prove login landed on an authenticated surface.
pub const LOGIN_MARKERS: [&str; 2] = ["feed", "mynetwork"];

pub const USERNAME_FIELD: Selector = Selector::css_static("#username");
pub const PASSWORD_FIELD: Selector = Selector::css_static("#password");
pub const SUBMIT_BUTTON: Selector = Selector::css_static(r#"button[type="submit"]"#);

/// Global search input, newest markup first.
pub static SEARCH_INPUTS: [Selector; 2] = [
    Selector::css_static("input.search-global-typeahead__input"),
    Selector::css_static(r#"input[placeholder*="Search"]"#),
];

/// "People" category pill across markup generations.
pub static PEOPLE_FILTERS: [Selector; 3] = [
    Selector::xpath_static(
        r#"//button[contains(@class, "search-reusables__filter-pill-button")][contains(., "People")]"#,
    ),
    Selector::xpath_static(r#"//button[@type="button"][contains(., "People")]"#),
    Selector::xpath_static(r#"//button[contains(text(), "People")]"#),
];

pub const LOCATION_FILTER_BUTTON: Selector =
    Selector::xpath_static(r#"//button[contains(@id, "searchFilter_geoUrn")]"#);

/// "Show results" confirm button inside the locations dropdown.
pub const SHOW_RESULTS_BUTTON: Selector = Selector::xpath_static(
    r#"//div[contains(@id, "hoverable-outlet-locations-filter-value")]/div/div/div/form/fieldset/div[2]/button[2]"#,
);

/// Result card containers on a search results page.
pub const RESULT_CONTAINERS: Selector =
    Selector::xpath_static(r#"//div[contains(@class, "mb1")]"#);

/// Pagination "Next": explicit label first, class fallback second.
pub static NEXT_BUTTONS: [Selector; 2] = [
    Selector::xpath_static(r#"//button[.//span[text()="Next"]]"#),
    Selector::xpath_static(r#"//button[contains(@class, "artdeco-pagination__button--next")]"#),
];

/// Tries each selector with an immediate query and returns the first that
/// matches, or `None` when the whole list misses.
pub async fn first_match<'a>(
    page: &dyn PageLike,
    candidates: &'a [Selector],
) -> Option<&'a Selector> {
    for selector in candidates {
        match page.find(selector).await {
            Ok(_) => return Some(selector),
            Err(err) if err.is_not_found() => {
                debug!(target = "scout", %selector, "no match, trying next candidate");
            }
            Err(err) => {
                debug!(target = "scout", %selector, error = %err, "lookup failed, trying next candidate");
            }
        }
    }
    None
}
