//! Constitution data model.
//!
//! A constitution is the parsed form of a governance document: numbered
//! principles, severity-graded constraints, architecture rules and design
//! principles. Values are built once by the parser and treated as read-only.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RuleType {
    Principle,
    Constraint,
    ArchitectureRule,
    DesignPrinciple,
}

impl RuleType {
    /// Fixed validation order.
    pub const ALL: [RuleType; 4] = [
        RuleType::Principle,
        RuleType::Constraint,
        RuleType::ArchitectureRule,
        RuleType::DesignPrinciple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Principle => "principle",
            RuleType::Constraint => "constraint",
            RuleType::ArchitectureRule => "architecture-rule",
            RuleType::DesignPrinciple => "design-principle",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint strength. Unspecified severities fall back to the parser's
/// configured default.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Must,
    Should,
    May,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Must => "must",
            Severity::Should => "should",
            Severity::May => "may",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "must" => Some(Severity::Must),
            "should" => Some(Severity::Should),
            "may" => Some(Severity::May),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RuleEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
}

impl RuleEntry {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        rule_type: RuleType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            rule_type,
        }
    }

    /// Prefix used in issue codes. Principle ids are bare integers, so they
    /// get a `P` to keep codes readable (`P1-VIOLATION`).
    pub fn code_prefix(&self) -> String {
        match self.rule_type {
            RuleType::Principle => format!("P{}", self.id),
            _ => self.id.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Constraint {
    #[serde(flatten)]
    pub entry: RuleEntry,
    pub severity: Severity,
}

impl Constraint {
    pub fn new(entry: RuleEntry, severity: Severity) -> Self {
        Self { entry, severity }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConstitutionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Constitution {
    #[serde(default)]
    pub principles: Vec<RuleEntry>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub architecture_rules: Vec<RuleEntry>,
    #[serde(default)]
    pub design_principles: Vec<RuleEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ConstitutionMetadata>,
}

/// A rule as seen by the validator: either a plain entry or a constraint
/// carrying its severity.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum RuleRef<'a> {
    Constraint(&'a Constraint),
    Rule(&'a RuleEntry),
}

impl<'a> RuleRef<'a> {
    pub fn entry(&self) -> &'a RuleEntry {
        match self {
            RuleRef::Constraint(c) => &c.entry,
            RuleRef::Rule(r) => r,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            RuleRef::Constraint(c) => Some(c.severity),
            RuleRef::Rule(_) => None,
        }
    }

    pub fn to_record(&self) -> RuleRecord {
        match self {
            RuleRef::Constraint(c) => RuleRecord::Constraint((*c).clone()),
            RuleRef::Rule(r) => RuleRecord::Rule((*r).clone()),
        }
    }
}

/// Owned copy of a rule attached to a validation issue.
///
/// Untagged: a constraint serializes with its `severity`, other rules without.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RuleRecord {
    Constraint(Constraint),
    Rule(RuleEntry),
}

impl RuleRecord {
    pub fn entry(&self) -> &RuleEntry {
        match self {
            RuleRecord::Constraint(c) => &c.entry,
            RuleRecord::Rule(r) => r,
        }
    }
}

impl Constitution {
    pub fn is_empty(&self) -> bool {
        self.total_rules() == 0
    }

    pub fn total_rules(&self) -> usize {
        self.principles.len()
            + self.constraints.len()
            + self.architecture_rules.len()
            + self.design_principles.len()
    }

    pub fn count_of(&self, rule_type: RuleType) -> usize {
        match rule_type {
            RuleType::Principle => self.principles.len(),
            RuleType::Constraint => self.constraints.len(),
            RuleType::ArchitectureRule => self.architecture_rules.len(),
            RuleType::DesignPrinciple => self.design_principles.len(),
        }
    }

    /// Every rule in validation order: principles, constraints, architecture
    /// rules, design principles.
    pub fn rules(&self) -> impl Iterator<Item = RuleRef<'_>> {
        self.principles
            .iter()
            .map(RuleRef::Rule)
            .chain(self.constraints.iter().map(RuleRef::Constraint))
            .chain(self.architecture_rules.iter().map(RuleRef::Rule))
            .chain(self.design_principles.iter().map(RuleRef::Rule))
    }

    /// Look up a rule by id across all categories. With duplicate ids the
    /// first one in validation order wins.
    pub fn find_rule(&self, id: &str) -> Option<RuleRef<'_>> {
        self.rules().find(|r| r.entry().id == id)
    }

    pub fn find_constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.entry.id == id)
    }
}
