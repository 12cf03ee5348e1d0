//! Ready Marker
//!
//! The assistant wraps its final summary in a start/end tag pair once it
//! has enough information to generate. The tags are display noise: readiness
//! itself is decided by the backend's `ready_to_generate` flag, never by
//! scanning text.

use regex::Regex;
use std::sync::OnceLock;

const START_TAG: &str = "<READY_TO_GENERATE>";
const END_TAG: &str = "</READY_TO_GENERATE>";

fn paired() -> Option<&'static Regex> {
    static PAIRED: OnceLock<Option<Regex>> = OnceLock::new();
    PAIRED
        .get_or_init(|| {
            let pattern = format!("(?s){}(.*?){}", regex::escape(START_TAG), regex::escape(END_TAG));
            Regex::new(&pattern).ok()
        })
        .as_ref()
}

/// Remove every paired marker, keeping the enclosed text.
///
/// Text without a complete pair is returned untouched; a lone tag is
/// treated as literal content.
pub fn strip(text: &str) -> String {
    match paired() {
        Some(re) if re.is_match(text) => re.replace_all(text, "$1").trim().to_string(),
        _ => text.to_string(),
    }
}
