//! Parser for the compiler's warning log.
//!
//! Warnings follow `path:line: message`. Indented lines continue the
//! preceding warning (tracebacks, docutils detail). Anything else becomes a
//! record carrying only the raw line.

use std::path::Path;

use tracing::trace;

use docpub_shared::BuildError;

use crate::ansi::strip_ansi;
use crate::resolve_reported_path;

/// Parse a warning log into build errors, in order of appearance.
pub fn parse_build_warnings(text: &str, source_dir: &Path) -> Vec<BuildError> {
    let text = strip_ansi(text);
    let mut errors: Vec<BuildError> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            if let Some(last) = errors.last_mut() {
                last.message.push('\n');
                last.message.push_str(line.trim_end());
                continue;
            }
        }

        errors.push(parse_warning_line(line.trim_end(), source_dir));
    }

    errors
}

fn parse_warning_line(line: &str, source_dir: &Path) -> BuildError {
    let mut parts = line.splitn(3, ':');
    if let (Some(path), Some(line_no), Some(message)) = (parts.next(), parts.next(), parts.next()) {
        if let Ok(line_no) = line_no.trim().parse::<u32>() {
            if !path.trim().is_empty() {
                return BuildError {
                    file_path: Some(resolve_reported_path(source_dir, path)),
                    line: Some(line_no),
                    message: message.to_string(),
                };
            }
        }
    }

    trace!(line, "warning without a location");
    BuildError::message_only(line)
}
