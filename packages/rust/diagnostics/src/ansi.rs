//! Terminal escape sequence removal.

use std::sync::LazyLock;

use regex::Regex;

/// 7-bit C1 ANSI escape sequences (`ESC` followed by a Fe byte, params, final byte).
static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B[@-_][0-?]*[ -/]*[@-~]").expect("ansi regex"));

/// Remove ANSI/C1 escape sequences (colors, cursor movement) from tool output.
pub fn strip_ansi(text: &str) -> String {
    ANSI_RE.replace_all(text, "").into_owned()
}
