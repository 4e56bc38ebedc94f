//! Constitution document parser.
//!
//! Turns governance markdown into a [`Constitution`]. Rules are recognised
//! purely by level-3 heading convention:
//!
//! | Category          | Heading                 | Id       |
//! |-------------------|-------------------------|----------|
//! | principle         | `### 1. Title`          | `1`      |
//! | constraint        | `### C1: Title`         | `C1`     |
//! | architecture rule | `### AR1: Title`        | `AR1`    |
//! | design principle  | `### DP1: Title`        | `DP1`    |
//!
//! A rule's description runs from the line after its heading to the next
//! `#`/`##` heading or the next rule heading, so the last rule of one section
//! never absorbs the following section. Parsing is total: any input,
//! including the empty string, yields a (possibly empty) constitution.

use crate::core::constitution::{
    Constitution, ConstitutionMetadata, Constraint, RuleEntry, RuleType, Severity,
};
use crate::core::markdown::{self, HeadingMarker, ScannedDoc};
use regex::Regex;
use std::sync::LazyLock;

static PRINCIPLE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").expect("valid principle regex"));
static CONSTRAINT_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^C(\d+):\s*(.+)$").expect("valid constraint regex"));
static ARCHITECTURE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^AR(\d+):\s*(.+)$").expect("valid architecture regex"));
static DESIGN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^DP(\d+):\s*(.+)$").expect("valid design regex"));

static SEVERITY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*+]\s+)?\**severity\**\s*:\s*\**\s*(must|should|may)\b")
        .expect("valid severity regex")
});
static APPLIES_TO_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*+]\s+)?\**applies[ _-]?to\**\s*:\s*\**\s*(.+?)\s*$")
        .expect("valid appliesTo regex")
});
static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*+]\s+)?\**version\**\s*:\s*\**\s*(.+?)\s*$")
        .expect("valid version regex")
});

/// Rule headings live at exactly this level.
const RULE_HEADING_LEVEL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    /// Severity given to constraints whose body carries no `Severity:` line.
    pub default_severity: Severity,
}

/// A heading recognised as a rule opener.
#[derive(Debug, Clone)]
struct RuleMarker {
    rule_type: RuleType,
    id: String,
    title: String,
    line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConstitutionDocumentParser {
    options: ParserOptions,
}

impl ConstitutionDocumentParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn parse(&self, text: &str) -> Constitution {
        let doc = markdown::scan(text);
        let markers: Vec<RuleMarker> = doc.headings.iter().filter_map(classify).collect();

        // Lines of `#`/`##` headings, ascending.
        let major: Vec<usize> = doc
            .headings
            .iter()
            .filter(|h| h.level <= 2)
            .map(|h| h.line)
            .collect();

        let mut constitution = Constitution::default();
        for (idx, marker) in markers.iter().enumerate() {
            let next_rule = markers.get(idx + 1).map(|m| m.line);
            let end = section_end(&major, next_rule, marker.line, doc.lines.len());
            let description = doc.body_between(marker.line, end);
            let entry = RuleEntry::new(
                marker.id.clone(),
                marker.title.clone(),
                description,
                marker.rule_type,
            );
            match marker.rule_type {
                RuleType::Principle => constitution.principles.push(entry),
                RuleType::Constraint => {
                    let severity = declared_severity(&entry.description)
                        .unwrap_or(self.options.default_severity);
                    constitution.constraints.push(Constraint::new(entry, severity));
                }
                RuleType::ArchitectureRule => constitution.architecture_rules.push(entry),
                RuleType::DesignPrinciple => constitution.design_principles.push(entry),
            }
        }

        constitution.metadata = extract_metadata(&doc, markers.first().map(|m| m.line));
        constitution
    }
}

/// Parse with default options (unspecified constraint severity is `must`).
pub fn parse(text: &str) -> Constitution {
    ConstitutionDocumentParser::default().parse(text)
}

fn classify(heading: &HeadingMarker) -> Option<RuleMarker> {
    if heading.level != RULE_HEADING_LEVEL {
        return None;
    }
    let patterns: [(&LazyLock<Regex>, RuleType, &str); 4] = [
        (&ARCHITECTURE_HEADING, RuleType::ArchitectureRule, "AR"),
        (&DESIGN_HEADING, RuleType::DesignPrinciple, "DP"),
        (&CONSTRAINT_HEADING, RuleType::Constraint, "C"),
        (&PRINCIPLE_HEADING, RuleType::Principle, ""),
    ];
    for (re, rule_type, prefix) in patterns {
        if let Some(caps) = re.captures(&heading.title) {
            return Some(RuleMarker {
                rule_type,
                id: format!("{}{}", prefix, &caps[1]),
                title: caps[2].trim().to_string(),
                line: heading.line,
            });
        }
    }
    None
}

/// Line index where a rule opened at `line` stops: the next `#`/`##`
/// heading or the next rule heading, whichever comes first.
fn section_end(major: &[usize], next_rule: Option<usize>, line: usize, len: usize) -> usize {
    let next_major = major.get(major.partition_point(|&l| l <= line)).copied();
    match (next_major, next_rule) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => len,
    }
}

fn declared_severity(description: &str) -> Option<Severity> {
    description.lines().find_map(|line| {
        SEVERITY_LINE
            .captures(line)
            .and_then(|caps| Severity::from_keyword(&caps[1]))
    })
}

/// Metadata lines are only read from the preamble: everything before the
/// first `##` heading (or a second `#` heading) or the first rule heading,
/// outside fenced code.
fn extract_metadata(
    doc: &ScannedDoc<'_>,
    first_rule: Option<usize>,
) -> Option<ConstitutionMetadata> {
    let title = doc.first_title().map(str::to_string).filter(|t| !t.is_empty());

    let title_line = doc.headings.iter().find(|h| h.level == 1).map(|h| h.line);
    let preamble_end = doc
        .headings
        .iter()
        .find(|h| h.level <= 2 && Some(h.line) != title_line)
        .map(|h| h.line)
        .into_iter()
        .chain(first_rule)
        .min()
        .unwrap_or(doc.lines.len());

    let capture = |re: &Regex| {
        doc.lines[..preamble_end]
            .iter()
            .zip(&doc.fenced)
            .filter(|(_, fenced)| !**fenced)
            .find_map(|(line, _)| {
                re.captures(line)
                    .map(|caps| caps[1].trim_end_matches('*').trim().to_string())
                    .filter(|v| !v.is_empty())
            })
    };
    let applies_to = capture(LazyLock::force(&APPLIES_TO_LINE));
    let version = capture(LazyLock::force(&VERSION_LINE));

    if title.is_none() && applies_to.is_none() && version.is_none() {
        return None;
    }
    Some(ConstitutionMetadata {
        title,
        applies_to,
        version,
    })
}
