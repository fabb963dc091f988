//! Smooth-scroll script used between result pages to pull lazy content in.

/// Builds an async script that steps to the bottom of the page and back.
///
/// The document height is re-read on every downward step; lazy content
/// keeps growing the page while the walk is in progress, and the walk ends
/// at the settled height rather than the starting one.
pub fn smooth_scroll_script(step: u32, down_delay_ms: u64, up_delay_ms: u64) -> String {
    format!(
        "(async () => {{ const pause = (ms) => new Promise((resolve) => setTimeout(resolve, ms)); let y = 0; while (y < document.body.scrollHeight) {{ y += {step}; window.scrollTo(0, y); await pause({down_delay_ms}); }} while (y > 0) {{ y -= {step}; window.scrollTo(0, y); await pause({up_delay_ms}); }} window.scrollTo(0, 0); return true; }})()"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_walks_down_and_back_up() {
        let script = smooth_scroll_script(300, 500, 300);
        assert!(script.contains("y += 300"));
        assert!(script.contains("y -= 300"));
        assert!(script.contains("pause(500)"));
        assert!(script.contains("pause(300)"));
        assert!(script.contains("document.body.scrollHeight"));
        assert!(script.ends_with("})()"));
    }
}
