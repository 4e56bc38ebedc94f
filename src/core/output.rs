//! Compact text rendering for the terminal.
//!
//! Colors are applied by the caller; these helpers only decide wording and
//! length.

use crate::core::validator::{IssueSeverity, ValidationIssue, ValidationResult};

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

pub fn severity_marker(severity: IssueSeverity) -> &'static str {
    match severity {
        IssueSeverity::Error => "✗",
        IssueSeverity::Warning => "⚠",
        IssueSeverity::Info => "ℹ",
    }
}

/// `✗ C1-VIOLATION: Spec content uses ...` bounded to `max_chars` of message.
pub fn issue_line(issue: &ValidationIssue, max_chars: usize) -> String {
    format!(
        "{} {}: {}",
        severity_marker(issue.severity),
        issue.code,
        compact_line(&issue.message, max_chars)
    )
}

/// One-line tally, e.g. `score 70/100 · 2 error(s), 0 warning(s), 1 info`.
pub fn summary_line(result: &ValidationResult) -> String {
    format!(
        "score {}/100 · {} error(s), {} warning(s), {} info · {} rule(s) checked",
        result.score,
        result.count(IssueSeverity::Error),
        result.count(IssueSeverity::Warning),
        result.count(IssueSeverity::Info),
        result.checked_constraints
    )
}
