//! Parser for spell-checker report fragments.
//!
//! A fragment line normally reads `path:line: (word) suggestion context`.
//! The location prefix and the `(word)` group are matched independently so a
//! line missing either still yields the fields that are present.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use docpub_shared::SpellingError;

use crate::ansi::strip_ansi;
use crate::resolve_reported_path;

/// Matches `path:line: rest`, where `line` may be empty or `None`.
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<path>[^:]+):(?P<line>[^:\s]*):\s?(?P<rest>.*)$").expect("location regex")
});

/// Matches `(word) suggestion context`.
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\((?P<word>[^)]*)\)\s?(?P<suggestion>[\w'-]*)\s?(?P<context>.*)$")
        .expect("word regex")
});

/// Parse concatenated spelling report text into spelling errors, in order.
pub fn parse_spelling_warnings(text: &str, source_dir: &Path) -> Vec<SpellingError> {
    strip_ansi(text)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_spelling_line(line.trim_end(), source_dir))
        .collect()
}

fn parse_spelling_line(line: &str, source_dir: &Path) -> SpellingError {
    let mut error = SpellingError {
        message: Some(line.to_string()),
        ..SpellingError::default()
    };

    let rest = match LOCATION_RE.captures(line) {
        Some(caps) => {
            error.file_path = Some(resolve_reported_path(source_dir, &caps["path"]));
            error.line = caps["line"].parse().ok();
            caps.name("rest").map_or("", |m| m.as_str())
        }
        None => line,
    };

    match WORD_RE.captures(rest) {
        Some(caps) => {
            error.misspelled_word = non_empty(&caps["word"]);
            error.suggestion = non_empty(&caps["suggestion"]);
            error.context = non_empty(&caps["context"]);
        }
        None => trace!(line, "spelling fragment without a (word) group"),
    }

    error
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
