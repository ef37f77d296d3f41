//! Human-readable rendering of a package's diagnostics.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use docpub_shared::BuildDiagnostic;

/// Lines of source shown on each side of a reported line.
const SNIPPET_CONTEXT_LINES: usize = 2;

/// Render diagnostics grouped by file, records without a file first.
///
/// Order within a file follows the input order. When a reported file is
/// readable, a numbered excerpt around the reported line is included.
pub fn render_summary(package: &str, diagnostics: &[BuildDiagnostic]) -> String {
    let mut out = String::new();
    if diagnostics.is_empty() {
        let _ = writeln!(out, "{package}: no errors");
        return out;
    }

    let mut by_file: BTreeMap<Option<&PathBuf>, Vec<&BuildDiagnostic>> = BTreeMap::new();
    for diag in diagnostics {
        by_file.entry(diag.file_path()).or_default().push(diag);
    }

    let _ = writeln!(
        out,
        "=== {package}: {} error(s) in {} file(s) ===",
        diagnostics.len(),
        by_file.keys().flatten().count()
    );

    for (file, diags) in &by_file {
        match file {
            Some(path) => {
                let _ = writeln!(out, "--- {} ---", path.display());
            }
            None => {
                let _ = writeln!(out, "--- (no file) ---");
            }
        }
        for diag in diags {
            render_one(&mut out, diag);
        }
    }

    out
}

fn render_one(out: &mut String, diag: &BuildDiagnostic) {
    let location = diag
        .line()
        .map(|line| format!("line {line}: "))
        .unwrap_or_default();

    match diag {
        BuildDiagnostic::Build(e) => {
            let _ = writeln!(out, "  {location}{}", e.message.trim());
        }
        BuildDiagnostic::Spelling(e) => {
            match &e.misspelled_word {
                Some(word) => {
                    let _ = write!(out, "  {location}misspelled word '{word}'");
                    if let Some(suggestion) = &e.suggestion {
                        let _ = write!(out, ", suggestion '{suggestion}'");
                    }
                    out.push('\n');
                }
                None => {
                    let _ = writeln!(out, "  {location}{}", e.message.as_deref().unwrap_or("").trim());
                }
            }
            if let Some(context) = &e.context {
                let _ = writeln!(out, "      context: {context}");
            }
        }
    }

    if let (Some(path), Some(line)) = (diag.file_path(), diag.line()) {
        if let Some(snippet) = code_snippet(path, line, SNIPPET_CONTEXT_LINES) {
            out.push_str(&snippet);
        }
    }
}

/// Numbered excerpt of `path` around 1-based `line`. `None` if unreadable or out of range.
pub fn code_snippet(path: &Path, line: u32, context: usize) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let lines: Vec<&str> = content.lines().collect();
    let target = usize::try_from(line).ok()?.checked_sub(1)?;
    if target >= lines.len() {
        return None;
    }

    let start = target.saturating_sub(context);
    let end = (target + context + 1).min(lines.len());
    let mut out = String::new();
    for (idx, text) in lines[start..end].iter().enumerate() {
        let number = start + idx + 1;
        let marker = if start + idx == target { '>' } else { ' ' };
        let _ = writeln!(out, "    {marker}{number:>5} | {text}");
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docpub_shared::{BuildError, SpellingError};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "docpub-summary-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn empty_summary() {
        assert_eq!(render_summary("docker-stack", &[]), "docker-stack: no errors\n");
    }

    #[test]
    fn unlocated_records_come_first() {
        let diags = vec![
            BuildDiagnostic::Build(BuildError {
                file_path: Some(PathBuf::from("/nonexistent/index.rst")),
                line: Some(4),
                message: " WARNING: bad".into(),
            }),
            BuildDiagnostic::Build(BuildError::message_only(
                "Sphinx returned non-zero exit status: 2.",
            )),
        ];
        let summary = render_summary("apache-airflow", &diags);
        let no_file = summary.find("(no file)").unwrap();
        let index = summary.find("/nonexistent/index.rst").unwrap();
        assert!(no_file < index);
        assert!(summary.contains("2 error(s) in 1 file(s)"));
        assert!(summary.contains("line 4: WARNING: bad"));
    }

    #[test]
    fn spelling_records_show_word_and_context() {
        let diags = vec![BuildDiagnostic::Spelling(SpellingError {
            misspelled_word: Some("teh".into()),
            suggestion: Some("the".into()),
            context: Some("read teh docs".into()),
            ..SpellingError::default()
        })];
        let summary = render_summary("helm-chart", &diags);
        assert!(summary.contains("misspelled word 'teh', suggestion 'the'"));
        assert!(summary.contains("context: read teh docs"));
    }

    #[test]
    fn snippet_marks_reported_line() {
        let dir = temp_dir();
        let file = dir.join("index.rst");
        std::fs::write(&file, "one\ntwo\nthree\nfour\nfive\nsix\n").unwrap();

        let snippet = code_snippet(&file, 4, 1).unwrap();
        let lines: Vec<_> = snippet.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("3 | three"));
        assert!(lines[1].starts_with("    >"));
        assert!(lines[1].contains("4 | four"));

        assert!(code_snippet(&file, 0, 1).is_none());
        assert!(code_snippet(&file, 99, 1).is_none());
        assert!(code_snippet(&dir.join("missing.rst"), 1, 1).is_none());
    }
}
