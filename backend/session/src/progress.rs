//! Load progress parsing.

use std::sync::LazyLock;

use ragchat_core::LoadProgress;
use regex::Regex;

static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,3})%").unwrap());

/// Percentage for the progress indicator.
///
/// Loader messages look like `Fetching param cache[12/24]: 421MB fetched. 37% completed`;
/// the first percentage in the text wins, otherwise `fraction` is used.
pub fn progress_percent(progress: &LoadProgress) -> u8 {
    let from_text = PERCENT_RE
        .captures(&progress.text)
        .and_then(|caps| caps[1].parse::<u16>().ok());

    match from_text {
        Some(pct) => pct.min(100) as u8,
        None => (progress.fraction.clamp(0.0, 1.0) * 100.0).round() as u8,
    }
}
