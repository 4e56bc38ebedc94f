//! Markdown rendering for validation reports.
//!
//! Output is a pure function of the report: same report, same bytes.

use crate::core::validator::{IssueSeverity, ValidationIssue, ValidationReport};

const SEVERITY_SECTIONS: [(IssueSeverity, &str); 3] = [
    (IssueSeverity::Error, "### ❌ Errors"),
    (IssueSeverity::Warning, "### ⚠️ Warnings"),
    (IssueSeverity::Info, "### ℹ️ Infos"),
];

fn push_issue(out: &mut Vec<String>, issue: &ValidationIssue) {
    out.push(format!("- **{}**: {}", issue.code, issue.message));
    if let Some(rule) = &issue.constraint {
        let entry = rule.entry();
        out.push(format!("  - Constraint: {} ({})", entry.id, entry.rule_type));
    }
    if let Some(suggestion) = &issue.suggestion {
        out.push(format!("  - Suggestion: {}", suggestion));
    }
}

pub fn format_report_as_markdown(report: &ValidationReport) -> String {
    let mut out: Vec<String> = Vec::new();

    out.push("# Validation Report".to_string());
    out.push(String::new());
    out.push(format!("*Generated: {}*", report.timestamp));
    out.push(String::new());
    let status = if report.valid {
        "✅ Valid"
    } else {
        "❌ Invalid"
    };
    out.push(format!("**Status**: {}", status));
    out.push(format!("**Score**: {}/100", report.score));
    out.push(String::new());

    out.push("## Summary".to_string());
    out.push(String::new());
    out.push("| Metric | Count |".to_string());
    out.push("|--------|-------|".to_string());
    let m = &report.metrics;
    for (label, count) in [
        ("Total Checks", m.total),
        ("Passed", m.passed),
        ("Errors", m.failed),
        ("Warnings", m.warnings),
        ("Info", m.info),
    ] {
        out.push(format!("| {} | {} |", label, count));
    }
    out.push(String::new());

    if !report.issues.is_empty() {
        out.push("## Issues".to_string());
        out.push(String::new());
        for (severity, heading) in SEVERITY_SECTIONS {
            let issues: Vec<&ValidationIssue> = report
                .issues
                .iter()
                .filter(|i| i.severity == severity)
                .collect();
            if issues.is_empty() {
                continue;
            }
            out.push(heading.to_string());
            out.push(String::new());
            for issue in issues {
                push_issue(&mut out, issue);
            }
            out.push(String::new());
        }
    }

    if let Some(recs) = report.recommendations.as_ref().filter(|r| !r.is_empty()) {
        out.push("## Recommendations".to_string());
        out.push(String::new());
        for rec in recs {
            out.push(format!("- {}", rec));
        }
        out.push(String::new());
    }

    out.join("\n")
}
