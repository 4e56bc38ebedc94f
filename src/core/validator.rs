//! Specification validation against a parsed constitution.
//!
//! A [`SpecValidator`] is bound to one constitution and reused across specs.
//! Every call walks the rules in fixed order (principles, constraints,
//! architecture rules, design principles), asks the detector registry for a
//! verdict, and turns non-pass verdicts into [`ValidationIssue`]s.
//!
//! Results are plain serde values: same constitution and same spec always
//! give the same result, and reports differ only in `timestamp`.

use crate::core::constitution::{Constitution, RuleRecord, RuleRef, RuleType, Severity};
use crate::core::detectors::{
    DetectorRegistry, DetectorSettings, DetectorVerdict, SpecSubject, VerdictStatus,
};
use crate::core::report;
use crate::core::spec_content::SpecContent;
use crate::core::time;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Info => "info",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub code: String,
    pub severity: IssueSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<RuleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub score: u32,
    pub issues: Vec<ValidationIssue>,
    pub checked_constraints: usize,
}

impl ValidationResult {
    pub fn count(&self, severity: IssueSeverity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportMetrics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub info: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeTally {
    pub checked: usize,
    pub passed: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ByType {
    pub principles: TypeTally,
    pub constraints: TypeTally,
    pub architecture_rules: TypeTally,
    pub design_principles: TypeTally,
}

impl ByType {
    pub fn tally_mut(&mut self, rule_type: RuleType) -> &mut TypeTally {
        match rule_type {
            RuleType::Principle => &mut self.principles,
            RuleType::Constraint => &mut self.constraints,
            RuleType::ArchitectureRule => &mut self.architecture_rules,
            RuleType::DesignPrinciple => &mut self.design_principles,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub score: u32,
    pub issues: Vec<ValidationIssue>,
    pub checked_constraints: usize,
    pub timestamp: String,
    pub metrics: ReportMetrics,
    pub by_type: ByType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

/// Score penalties and the low-score recommendation threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub error_penalty: u32,
    pub warning_penalty: u32,
    pub info_penalty: u32,
    pub low_score_threshold: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            error_penalty: 15,
            warning_penalty: 5,
            info_penalty: 1,
            low_score_threshold: 70,
        }
    }
}

impl ScoringWeights {
    /// 100 minus weighted penalties, clamped to `[0, 100]`.
    pub fn score(&self, errors: usize, warnings: usize, infos: usize) -> u32 {
        let weighted = |count: usize, penalty: u32| (count as u64).saturating_mul(u64::from(penalty));
        let penalty = weighted(errors, self.error_penalty)
            .saturating_add(weighted(warnings, self.warning_penalty))
            .saturating_add(weighted(infos, self.info_penalty));
        100u64.saturating_sub(penalty) as u32
    }
}

/// Map a detector verdict to an issue severity for this rule.
///
/// Failed constraints follow their own severity; failed architecture rules
/// are errors; principles and design principles never exceed `warning`.
pub fn issue_severity(rule: RuleRef<'_>, status: VerdictStatus) -> Option<IssueSeverity> {
    let rule_type = rule.entry().rule_type;
    match status {
        VerdictStatus::Pass => None,
        VerdictStatus::Info => Some(IssueSeverity::Info),
        VerdictStatus::Warn => match rule.severity() {
            Some(Severity::May) => Some(IssueSeverity::Info),
            _ => Some(IssueSeverity::Warning),
        },
        VerdictStatus::Fail => Some(match rule_type {
            RuleType::Constraint => match rule.severity().unwrap_or_default() {
                Severity::Must => IssueSeverity::Error,
                Severity::Should => IssueSeverity::Warning,
                Severity::May => IssueSeverity::Info,
            },
            RuleType::ArchitectureRule => IssueSeverity::Error,
            RuleType::Principle | RuleType::DesignPrinciple => IssueSeverity::Warning,
        }),
    }
}

fn issue_code(rule: RuleRef<'_>, status: VerdictStatus) -> String {
    let suffix = match status {
        VerdictStatus::Fail => "VIOLATION",
        VerdictStatus::Warn => "WARNING",
        VerdictStatus::Info | VerdictStatus::Pass => "INFO",
    };
    format!("{}-{}", rule.entry().code_prefix(), suffix)
}

fn to_issue(rule: RuleRef<'_>, verdict: DetectorVerdict) -> Option<ValidationIssue> {
    let severity = issue_severity(rule, verdict.status)?;
    let entry = rule.entry();
    let message = verdict.message.unwrap_or_else(|| {
        format!(
            "Spec does not satisfy {} {}: {}",
            entry.rule_type, entry.id, entry.title
        )
    });
    Some(ValidationIssue {
        code: issue_code(rule, verdict.status),
        severity,
        message,
        constraint: Some(rule.to_record()),
        suggestion: verdict.suggestion,
    })
}

#[derive(Debug, Clone)]
pub struct SpecValidator {
    constitution: Arc<Constitution>,
    registry: DetectorRegistry,
    settings: DetectorSettings,
    weights: ScoringWeights,
}

impl SpecValidator {
    pub fn new(constitution: impl Into<Arc<Constitution>>) -> Self {
        Self {
            constitution: constitution.into(),
            registry: DetectorRegistry::builtin(),
            settings: DetectorSettings::default(),
            weights: ScoringWeights::default(),
        }
    }

    pub fn with_registry(mut self, registry: DetectorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_settings(mut self, settings: DetectorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn constitution(&self) -> &Constitution {
        &self.constitution
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Run one rule, returning its issue if it did not pass.
    fn check(&self, rule: RuleRef<'_>, spec: &SpecSubject<'_>) -> Option<ValidationIssue> {
        let verdict = self.registry.run(rule.entry(), spec, &self.settings);
        to_issue(rule, verdict)
    }

    pub fn validate(&self, spec: &SpecContent) -> ValidationResult {
        let subject = SpecSubject::new(spec);
        let issues: Vec<ValidationIssue> = self
            .constitution
            .rules()
            .filter_map(|rule| self.check(rule, &subject))
            .collect();
        self.result_from(issues)
    }

    fn result_from(&self, issues: Vec<ValidationIssue>) -> ValidationResult {
        let count = |s: IssueSeverity| issues.iter().filter(|i| i.severity == s).count();
        let errors = count(IssueSeverity::Error);
        let score = self.weights.score(
            errors,
            count(IssueSeverity::Warning),
            count(IssueSeverity::Info),
        );
        ValidationResult {
            valid: errors == 0,
            score,
            checked_constraints: self.constitution.total_rules(),
            issues,
        }
    }

    pub fn generate_report(&self, spec: &SpecContent) -> ValidationReport {
        self.generate_report_at(spec, time::now_iso8601())
    }

    /// Same as [`generate_report`](Self::generate_report) with a fixed
    /// timestamp.
    pub fn generate_report_at(
        &self,
        spec: &SpecContent,
        timestamp: impl Into<String>,
    ) -> ValidationReport {
        let result = self.validate(spec);

        let failed = result.count(IssueSeverity::Error);
        let warnings = result.count(IssueSeverity::Warning);
        let info = result.count(IssueSeverity::Info);
        let total = result.checked_constraints;
        let metrics = ReportMetrics {
            total,
            passed: total.saturating_sub(result.issues.len()),
            failed,
            warnings,
            info,
        };

        let mut by_type = ByType::default();
        for rule_type in RuleType::ALL {
            let checked = self.constitution.count_of(rule_type);
            let flagged = result
                .issues
                .iter()
                .filter(|i| {
                    i.constraint
                        .as_ref()
                        .is_some_and(|c| c.entry().rule_type == rule_type)
                })
                .count();
            *by_type.tally_mut(rule_type) = TypeTally {
                checked,
                passed: checked.saturating_sub(flagged),
            };
        }

        let recommendations = self.recommendations(&metrics, result.score);

        ValidationReport {
            valid: result.valid,
            score: result.score,
            issues: result.issues,
            checked_constraints: result.checked_constraints,
            timestamp: timestamp.into(),
            metrics,
            by_type,
            recommendations,
        }
    }

    fn recommendations(&self, metrics: &ReportMetrics, score: u32) -> Option<Vec<String>> {
        let mut out = Vec::new();
        if metrics.failed > 0 {
            out.push(format!(
                "Address {} error(s) first: they violate non-negotiable constraints",
                metrics.failed
            ));
        }
        if metrics.warnings > 0 {
            out.push(format!(
                "Review {} warning(s) to improve alignment with the constitution",
                metrics.warnings
            ));
        }
        if score < self.weights.low_score_threshold {
            out.push(format!(
                "Overall score is low ({}/100), consider revising the specification",
                score
            ));
        }
        if out.is_empty() { None } else { Some(out) }
    }

    pub fn format_report_as_markdown(&self, report: &ValidationReport) -> String {
        report::format_report_as_markdown(report)
    }
}
