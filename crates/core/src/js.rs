//! Script builders for the evaluate-based element operations.
//!
//! Element handles are selector-addressed: every operation re-resolves its
//! selector inside the page, so CSS and XPath go through the same path and
//! nothing depends on remote object handles staying alive.

use crate::session::{Selector, WaitState};

/// Escapes a string for embedding inside a single-quoted JS literal.
pub(crate) fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Expression that resolves the selector to an element or `null`.
fn resolve_expr(selector: &Selector, index: Option<usize>) -> String {
    match (selector, index) {
        (Selector::Css(s), None) => format!("document.querySelector('{}')", escape(s)),
        (Selector::Css(s), Some(i)) => {
            format!("(document.querySelectorAll('{}')[{}] ?? null)", escape(s), i)
        }
        (Selector::XPath(s), None) => format!(
            "document.evaluate('{}', document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            escape(s)
        ),
        (Selector::XPath(s), Some(i)) => format!(
            "(() => {{ const r = document.evaluate('{}', document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); return {} < r.snapshotLength ? r.snapshotItem({}) : null; }})()",
            escape(s),
            i,
            i
        ),
    }
}

pub(crate) fn exists_script(selector: &Selector) -> String {
    format!("({}) !== null", resolve_expr(selector, None))
}

pub(crate) fn count_script(selector: &Selector) -> String {
    match selector {
        Selector::Css(s) => format!("document.querySelectorAll('{}').length", escape(s)),
        Selector::XPath(s) => format!(
            "document.evaluate('{}', document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
            escape(s)
        ),
    }
}

pub(crate) fn click_script(selector: &Selector, index: Option<usize>) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return false; el.click(); return true; }})()",
        resolve_expr(selector, index)
    )
}

pub(crate) fn fill_script(selector: &Selector, index: Option<usize>, value: &str) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return false; el.focus(); el.value = '{}'; el.dispatchEvent(new Event('input', {{ bubbles: true }})); el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
        resolve_expr(selector, index),
        escape(value)
    )
}

pub(crate) fn inner_text_script(selector: &Selector, index: Option<usize>) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return null; return {{ text: el.innerText }}; }})()",
        resolve_expr(selector, index)
    )
}

pub(crate) fn attribute_script(selector: &Selector, index: Option<usize>, name: &str) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return null; return {{ value: el.getAttribute('{}') }}; }})()",
        resolve_expr(selector, index),
        escape(name)
    )
}

pub(crate) fn link_urls_script(selector: &Selector, index: Option<usize>) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return null; return {{ urls: Array.from(el.querySelectorAll('a')).map((a) => a.getAttribute('href')).filter((href) => !!href) }}; }})()",
        resolve_expr(selector, index)
    )
}

/// Bounded polling loop; resolves to `true` once the selector reaches the
/// requested state, `false` on deadline.
pub(crate) fn wait_for_selector_script(
    selector: &Selector,
    state: WaitState,
    timeout_ms: u64,
    interval_ms: u64,
) -> String {
    let resolve = resolve_expr(selector, None);
    let state_check = match state {
        WaitState::Visible => " && el.offsetParent !== null",
        WaitState::Attached => "",
    };
    format!(
        "(async () => {{ const deadline = Date.now() + {timeout_ms}; while (Date.now() < deadline) {{ const el = {resolve}; if (el{state_check}) return true; await new Promise((resolve) => setTimeout(resolve, {interval_ms})); }} return false; }})()"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_quotes_and_backslashes() {
        assert_eq!(escape(r"a\b"), r"a\\b");
        assert_eq!(escape("it's"), r"it\'s");
        assert_eq!(escape("line\nbreak"), r"line\nbreak");
        assert_eq!(escape("pasted\r\nvalue"), r"pasted\r\nvalue");
    }

    #[test]
    fn css_scripts_use_query_selector() {
        let selector = Selector::css("input[placeholder*=\"Search\"]");
        let script = exists_script(&selector);
        assert!(script.contains("document.querySelector('input[placeholder*=\"Search\"]')"));
        assert!(count_script(&selector).contains("querySelectorAll"));
    }

    #[test]
    fn xpath_scripts_use_document_evaluate() {
        let selector = Selector::xpath(r#"//div[contains(@class, "mb1")]"#);
        let script = count_script(&selector);
        assert!(script.contains("document.evaluate"));
        assert!(script.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
    }

    #[test]
    fn indexed_resolution_snapshots_xpath() {
        let selector = Selector::xpath("//a");
        let script = inner_text_script(&selector, Some(2));
        assert!(script.contains("snapshotItem(2)"));
        assert!(script.contains("innerText"));
    }

    #[test]
    fn attribute_script_reads_through_get_attribute() {
        let selector = Selector::css("a.app-aware-link");
        let script = attribute_script(&selector, Some(1), "href");
        assert!(script.contains("getAttribute('href')"));
        assert!(script.contains("querySelectorAll('a.app-aware-link')[1]"));
    }

    #[test]
    fn fill_script_escapes_value() {
        let selector = Selector::css("#username");
        let script = fill_script(&selector, None, "o'brien");
        assert!(script.contains(r"el.value = 'o\'brien'"));
        assert!(script.contains("new Event('input'"));
    }

    #[test]
    fn wait_script_honors_state() {
        let selector = Selector::css("#username");
        let visible = wait_for_selector_script(&selector, WaitState::Visible, 10_000, 100);
        let attached = wait_for_selector_script(&selector, WaitState::Attached, 10_000, 100);
        assert!(visible.contains("offsetParent"));
        assert!(!attached.contains("offsetParent"));
        assert!(visible.contains("10000"));
    }
}
