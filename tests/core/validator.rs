use serde_json::json;
use specgate::core::assets;
use specgate::core::detectors::{
    DetectorRegistry, DetectorVerdict, SpecSubject, keyword_contradiction,
};
use specgate::{
    Constitution, IssueSeverity, RuleEntry, RuleType, ScoringWeights, SpecContent, SpecValidator,
    ValidationReport, format_report_as_markdown, parse,
};

const TS: &str = "2026-10-19T12:00:00.000Z";

const STRICT_AND_ESM: &str = "\
## Constraints

### C1: TypeScript Strict Mode

- strict: true
- No any types

### C2: ESM Only

- No `require()` calls
";

fn embedded_validator() -> SpecValidator {
    let text = assets::get_embedded_doc(assets::DEFAULT_CONSTITUTION).expect("embedded doc");
    SpecValidator::new(parse(text))
}

fn assert_metrics_consistent(report: &ValidationReport) {
    let m = report.metrics;
    assert_eq!(m.total, report.checked_constraints);
    assert_eq!(m.failed + m.warnings + m.info, report.issues.len());
    assert_eq!(m.passed, m.total - report.issues.len());
    assert!(report.score <= 100);
    assert_eq!(report.valid, m.failed == 0);
}

#[test]
fn empty_constitution_scores_full_marks() {
    let validator = SpecValidator::new(Constitution::default());
    let report = validator.generate_report_at(&SpecContent::with_raw_markdown("anything"), TS);
    assert!(report.valid);
    assert_eq!(report.score, 100);
    assert_eq!(report.checked_constraints, 0);
    assert!(report.issues.is_empty());
    assert!(report.recommendations.is_none());
    assert_metrics_consistent(&report);
}

#[test]
fn strict_mode_violation_is_an_error() {
    let validator = SpecValidator::new(parse(
        "### C1: TypeScript Strict Mode\n- strict: true\n- No any types\n",
    ));
    let result = validator.validate(&SpecContent::with_raw_markdown("Use any type here"));
    assert!(!result.valid);
    assert_eq!(result.score, 85);
    assert_eq!(result.issues.len(), 1);

    let issue = &result.issues[0];
    assert_eq!(issue.severity, IssueSeverity::Error);
    assert!(issue.code.contains("C1"));
    assert_eq!(issue.code, "C1-VIOLATION");
    assert!(issue.suggestion.is_some());
    let rule = issue.constraint.as_ref().expect("issue carries its rule");
    assert_eq!(rule.entry().id, "C1");
}

#[test]
fn two_failed_must_constraints_score_seventy() {
    let validator = SpecValidator::new(parse(STRICT_AND_ESM));
    let spec = SpecContent::with_raw_markdown("Use any type and const fs = require('fs')");
    let report = validator.generate_report_at(&spec, TS);

    assert!(!report.valid);
    assert_eq!(report.score, 70);
    assert_eq!(report.metrics.failed, 2);
    assert_eq!(report.metrics.passed, 0);
    assert_eq!(report.by_type.constraints.checked, 2);
    assert_eq!(report.by_type.constraints.passed, 0);
    assert_metrics_consistent(&report);

    let recs = report.recommendations.expect("recommendations on errors");
    assert!(recs[0].starts_with("Address 2 error(s)"));
}

#[test]
fn compliant_spec_passes_every_rule() {
    let validator = SpecValidator::new(parse(STRICT_AND_ESM));
    let spec = SpecContent::with_raw_markdown("Use unknown and import statements throughout");
    let result = validator.validate(&spec);
    assert!(result.valid);
    assert_eq!(result.score, 100);
    assert_eq!(result.checked_constraints, 2);
}

#[test]
fn spec_template_is_clean_against_embedded_constitution() {
    let template = assets::get_embedded_doc("SPEC_TEMPLATE.md").expect("template");
    let report = embedded_validator().generate_report_at(&SpecContent::from_markdown(template), TS);
    assert!(report.issues.is_empty(), "unexpected issues: {:?}", report.issues);
    assert!(report.valid);
    assert_eq!(report.score, 100);
    assert_eq!(report.checked_constraints, 13);
    assert!(report.recommendations.is_none());
}

#[test]
fn missing_title_and_overview_warn_per_principle() {
    let report =
        embedded_validator().generate_report_at(&SpecContent::with_raw_markdown("plain text"), TS);
    let principle_codes: Vec<&str> = report
        .issues
        .iter()
        .filter(|i| i.code.starts_with('P'))
        .map(|i| i.code.as_str())
        .collect();
    assert_eq!(principle_codes, vec!["P1-WARNING", "P2-WARNING", "P3-WARNING"]);
    assert!(report.valid);
    assert_eq!(report.score, 85);
    assert_eq!(report.by_type.principles.passed, 0);
    assert_metrics_consistent(&report);
}

#[test]
fn reversed_dependency_fails_architecture_rule() {
    let spec = SpecContent::from_markdown(
        "# Fetcher\n\n## Overview\n\nLoads rows.\n\n## Requirements\n\n- domain → gateway for data access\n",
    );
    let report = embedded_validator().generate_report_at(&spec, TS);
    let issue = report
        .issues
        .iter()
        .find(|i| i.code == "AR1-VIOLATION")
        .expect("AR1 violation");
    assert_eq!(issue.severity, IssueSeverity::Error);
    assert!(!report.valid);
    assert_metrics_consistent(&report);
}

#[test]
fn should_and_may_constraints_never_invalidate() {
    let constitution = parse(
        "### C1: Parsing\n- **Severity**: should\n- Never use `JSON.parse()`\n\n\
         ### C2: Docs\n- **Severity**: may\n- Avoid `TODO` markers\n",
    );
    let validator = SpecValidator::new(constitution);
    let result =
        validator.validate(&SpecContent::with_raw_markdown("JSON.parse(body) // TODO tidy"));
    assert!(result.valid);
    let severities: Vec<IssueSeverity> = result.issues.iter().map(|i| i.severity).collect();
    assert_eq!(severities, vec![IssueSeverity::Warning, IssueSeverity::Info]);
    assert_eq!(result.score, 94);
}

#[test]
fn structured_spec_fields_are_searched() {
    let validator = SpecValidator::new(parse(STRICT_AND_ESM));
    let spec: SpecContent = serde_json::from_value(json!({
        "title": "Loader",
        "overview": "Loads config",
        "requirements": ["Reads files via require('fs')"],
    }))
    .expect("spec json");
    let result = validator.validate(&spec);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].code, "C2-VIOLATION");
}

#[test]
fn too_many_responsibilities_is_informational() {
    let spec: SpecContent = serde_json::from_value(json!({
        "title": "Everything Service",
        "overview": "Does it all",
        "objectives": ["a", "b", "c"],
        "requirements": ["d", "e", "f", "g"],
    }))
    .expect("spec json");
    let report = embedded_validator().generate_report_at(&spec, TS);
    let issue = report
        .issues
        .iter()
        .find(|i| i.code.starts_with("DP1"))
        .expect("DP1 issue");
    assert_eq!(issue.severity, IssueSeverity::Info);
    assert_eq!(issue.code, "DP1-INFO");
    assert!(report.valid);
    assert_eq!(report.score, 99);
}

#[test]
fn reports_are_deterministic_apart_from_timestamp() {
    let validator = embedded_validator();
    let spec = SpecContent::with_raw_markdown("Use any type; domain -> gateway");
    let a = validator.generate_report_at(&spec, TS);
    let b = validator.generate_report_at(&spec, TS);
    assert_eq!(a, b);
    assert_eq!(format_report_as_markdown(&a), format_report_as_markdown(&b));

    let live = validator.generate_report(&spec);
    assert_eq!(live.issues, a.issues);
    assert_eq!(live.score, a.score);
    assert_ne!(live.timestamp, "");
}

#[test]
fn score_stays_in_bounds_under_many_errors() {
    let mut doc = String::new();
    for i in 1..=12 {
        doc.push_str(&format!("### C{}: Rule {}\n- No forbidden\n\n", i, i));
    }
    let validator = SpecValidator::new(parse(&doc));
    let report = validator.generate_report_at(&SpecContent::with_raw_markdown("forbidden"), TS);
    assert_eq!(report.metrics.failed, 12);
    assert_eq!(report.score, 0);
    assert_metrics_consistent(&report);
    let recs = report.recommendations.expect("recommendations");
    assert!(recs.iter().any(|r| r.contains("score is low (0/100)")));
}

#[test]
fn custom_weights_change_score_only() {
    let weights = ScoringWeights {
        error_penalty: 40,
        ..ScoringWeights::default()
    };
    let validator = SpecValidator::new(parse(STRICT_AND_ESM)).with_weights(weights);
    let result = validator.validate(&SpecContent::with_raw_markdown("any require(x)"));
    assert_eq!(result.score, 20);
    assert_eq!(result.issues.len(), 2);
}

fn always_fail(
    _: &RuleEntry,
    _: &SpecSubject<'_>,
    _: &specgate::DetectorSettings,
) -> DetectorVerdict {
    DetectorVerdict::fail("nope")
}

#[test]
fn fallback_detector_cannot_fail_a_spec() {
    let mut registry = DetectorRegistry::empty();
    registry.set_fallback(always_fail);
    let validator = SpecValidator::new(parse(STRICT_AND_ESM)).with_registry(registry);
    let result = validator.validate(&SpecContent::with_raw_markdown("anything"));
    assert!(result.valid);
    assert!(result.issues.iter().all(|i| i.severity == IssueSeverity::Info));
    assert_eq!(result.score, 98);
}

#[test]
fn id_registration_overrides_prefix() {
    let mut registry = DetectorRegistry::builtin();
    registry.register_id("C2", always_fail);
    let validator = SpecValidator::new(parse(STRICT_AND_ESM)).with_registry(registry);
    let result = validator.validate(&SpecContent::with_raw_markdown("clean text"));
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].code, "C2-VIOLATION");
    assert_eq!(result.issues[0].message, "nope");
}

#[test]
fn unknown_prefix_falls_back_to_contradiction_check() {
    let mut registry = DetectorRegistry::empty();
    registry.set_fallback(keyword_contradiction);
    let rule = RuleEntry::new("X1", "Code Review", "", RuleType::Constraint);
    let (_, is_fallback) = registry.resolve(&rule);
    assert!(is_fallback);
    let verdict = registry.run(
        &rule,
        &SpecSubject::new(&SpecContent::with_raw_markdown(
            "We skip code review for hotfixes",
        )),
        &specgate::DetectorSettings::default(),
    );
    assert_eq!(verdict.status, specgate::VerdictStatus::Info);
}

#[test]
fn report_json_round_trips() {
    let report = embedded_validator()
        .generate_report_at(&SpecContent::with_raw_markdown("Use any type here"), TS);
    let value = serde_json::to_value(&report).expect("serialize");
    assert_eq!(value["timestamp"], TS);
    assert!(value["byType"]["architectureRules"]["checked"].is_number());
    assert_eq!(value["issues"][0]["severity"], "warning");

    let back: ValidationReport = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, report);
}

#[test]
fn markdown_report_lists_issues_by_severity() {
    let report = embedded_validator()
        .generate_report_at(&SpecContent::with_raw_markdown("Use any type here"), TS);
    let md = format_report_as_markdown(&report);
    assert!(md.starts_with("# Validation Report"));
    assert!(md.contains(&format!("*Generated: {}*", TS)));
    assert!(md.contains("**Status**: ❌ Invalid"));
    assert!(md.contains("### ❌ Errors"));
    assert!(md.contains("### ⚠️ Warnings"));
    assert!(md.contains("- **C1-VIOLATION**:"));
    assert!(md.contains("  - Constraint: C1 (constraint)"));
    assert!(md.contains("## Recommendations"));
    let errors_at = md.find("### ❌ Errors").expect("errors section");
    let warnings_at = md.find("### ⚠️ Warnings").expect("warnings section");
    assert!(errors_at < warnings_at);
}
