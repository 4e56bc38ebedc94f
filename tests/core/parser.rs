use specgate::core::assets;
use specgate::{ConstitutionDocumentParser, ParserOptions, RuleType, Severity, parse};

const SAMPLE: &str = "\
# Sample Constitution

appliesTo: prompts and tools
version: 0.3.0

## Core Principles

### 1. Clarity First

Say what a thing does before how.

### 2. Small Surfaces

Expose as little as possible.

## Constraints

### C1: TypeScript Strict Mode

- strict: true
- No any types

### C2: Logging

- **Severity**: should
- Avoid `console.log()` in library code

## Architecture Rules

### AR1: Layered Dependencies

- tools → gateway
- gateway → domain

## Design Principles

### DP1: Single Responsibility

One job per unit.
";

#[test]
fn parse_is_idempotent() {
    assert_eq!(parse(SAMPLE), parse(SAMPLE));
}

#[test]
fn rules_land_in_their_categories() {
    let c = parse(SAMPLE);
    let ids = |entries: &[specgate::RuleEntry]| {
        entries.iter().map(|e| e.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&c.principles), vec!["1", "2"]);
    assert_eq!(c.principles[0].title, "Clarity First");
    assert_eq!(c.principles[1].title, "Small Surfaces");
    assert!(c.principles.iter().all(|p| p.rule_type == RuleType::Principle));

    let constraint_ids: Vec<&str> = c.constraints.iter().map(|k| k.entry.id.as_str()).collect();
    assert_eq!(constraint_ids, vec!["C1", "C2"]);
    assert_eq!(ids(&c.architecture_rules), vec!["AR1"]);
    assert_eq!(ids(&c.design_principles), vec!["DP1"]);
    assert_eq!(c.total_rules(), 6);
}

#[test]
fn descriptions_do_not_cross_sections() {
    let c = parse(SAMPLE);
    let last_principle = &c.principles[1].description;
    assert_eq!(last_principle, "Expose as little as possible.");
    assert!(!last_principle.contains("Constraints"));

    let c2 = &c.constraints[1].entry.description;
    assert!(c2.contains("console.log()"));
    assert!(!c2.contains("Architecture"));
    assert!(!c2.contains("tools → gateway"));
}

#[test]
fn severity_defaults_to_must_and_honours_declarations() {
    let c = parse(SAMPLE);
    assert_eq!(c.constraints[0].severity, Severity::Must);
    assert_eq!(c.constraints[1].severity, Severity::Should);
}

#[test]
fn default_severity_is_configurable() {
    let parser = ConstitutionDocumentParser::new(ParserOptions {
        default_severity: Severity::May,
    });
    let c = parser.parse(SAMPLE);
    assert_eq!(c.constraints[0].severity, Severity::May);
    // An explicit declaration still wins.
    assert_eq!(c.constraints[1].severity, Severity::Should);
}

#[test]
fn metadata_is_extracted() {
    let meta = parse(SAMPLE).metadata.expect("metadata");
    assert_eq!(meta.title.as_deref(), Some("Sample Constitution"));
    assert_eq!(meta.applies_to.as_deref(), Some("prompts and tools"));
    assert_eq!(meta.version.as_deref(), Some("0.3.0"));
}

#[test]
fn empty_and_unstructured_input_yield_empty_constitution() {
    for text in ["", "   \n\n", "just some prose\nwith no headings", "## Constraints\n\nnothing here"] {
        let c = parse(text);
        assert!(c.is_empty(), "expected no rules for {:?}", text);
        assert_eq!(c.total_rules(), 0);
    }
}

#[test]
fn single_rule_runs_to_end_of_document() {
    let c = parse("### C7: Final Rule\n\nfirst line\n\nlast line\n");
    assert_eq!(c.constraints.len(), 1);
    assert_eq!(c.constraints[0].entry.description, "first line\n\nlast line");
}

#[test]
fn wrong_heading_levels_are_not_rules() {
    let c = parse("## C1: Too High\n\n#### C2: Too Deep\n\n### C3: Just Right\n");
    let ids: Vec<&str> = c.constraints.iter().map(|k| k.entry.id.as_str()).collect();
    assert_eq!(ids, vec!["C3"]);
}

#[test]
fn headings_inside_code_fences_are_ignored() {
    let text = "### AR1: Real Rule\n\n```md\n### AR2: Not A Rule\n```\n";
    let c = parse(text);
    assert_eq!(c.architecture_rules.len(), 1);
    assert!(c.architecture_rules[0].description.contains("AR2: Not A Rule"));
}

#[test]
fn embedded_constitution_parses_fully() {
    let text = assets::get_embedded_doc(assets::DEFAULT_CONSTITUTION).expect("embedded doc");
    let c = parse(text);
    assert_eq!(c.principles.len(), 3);
    assert_eq!(c.constraints.len(), 5);
    assert_eq!(c.architecture_rules.len(), 3);
    assert_eq!(c.design_principles.len(), 2);

    let severities: Vec<Severity> = c.constraints.iter().map(|k| k.severity).collect();
    assert_eq!(
        severities,
        vec![
            Severity::Must,
            Severity::Must,
            Severity::Should,
            Severity::Must,
            Severity::May
        ]
    );
    assert_eq!(c.find_constraint("C5").map(|k| k.severity), Some(Severity::May));
    assert!(c.find_rule("DP2").is_some());
    assert!(c.find_rule("DP9").is_none());

    let meta = c.metadata.expect("metadata");
    assert_eq!(meta.version.as_deref(), Some("1.2.0"));
}

#[test]
fn constitution_serializes_with_camel_case_keys() {
    let value = serde_json::to_value(parse(SAMPLE)).expect("serialize");
    assert!(value["architectureRules"].is_array());
    assert!(value["designPrinciples"].is_array());
    assert_eq!(value["constraints"][1]["severity"], "should");
    assert_eq!(value["constraints"][1]["id"], "C2");
    assert_eq!(value["architectureRules"][0]["type"], "architecture-rule");
    assert_eq!(value["metadata"]["appliesTo"], "prompts and tools");
}

#[test]
fn thousands_of_rules_keep_their_own_bodies() {
    let mut text = String::from("# Big\n\n## Constraints\n\n");
    for i in 1..=5_000 {
        text.push_str(&format!("### C{}: Rule {}\n\n- No token{}\n\n", i, i, i));
    }
    text.push_str("## Design Principles\n\n### DP1: Focus\n");
    text.push_str(&"\n".repeat(20_000));
    text.push_str("One job.\n");

    let c = parse(&text);
    assert_eq!(c.constraints.len(), 5_000);
    assert_eq!(c.constraints[0].entry.description, "- No token1");
    assert_eq!(c.constraints[4_999].entry.description, "- No token5000");
    assert_eq!(c.design_principles[0].description, "One job.");
}
