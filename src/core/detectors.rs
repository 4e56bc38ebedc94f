//! Constraint detectors.
//!
//! A detector is a pure function from a rule and a spec to a verdict. The
//! [`DetectorRegistry`] decides which detector checks which rule:
//!
//! 1. exact rule id (`register_id("C7", ..)`)
//! 2. longest id prefix followed only by digits (`register_prefix("AR", ..)`)
//! 3. rule category (`register_category(RuleType::Principle, ..)`)
//! 4. the fallback detector
//!
//! Verdicts from the fallback are capped at `info`, so a rule nobody wrote a
//! detector for can never fail a spec on its own.

use crate::core::constitution::{RuleEntry, RuleType};
use crate::core::spec_content::SpecContent;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Pass,
    Fail,
    Warn,
    Info,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DetectorVerdict {
    pub status: VerdictStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl DetectorVerdict {
    pub fn pass() -> Self {
        Self {
            status: VerdictStatus::Pass,
            message: None,
            suggestion: None,
        }
    }

    fn with_status(status: VerdictStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            suggestion: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::with_status(VerdictStatus::Fail, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::with_status(VerdictStatus::Warn, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_status(VerdictStatus::Info, message)
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_pass(&self) -> bool {
        self.status == VerdictStatus::Pass
    }

    /// Any non-pass verdict becomes `info`.
    pub fn capped_at_info(mut self) -> Self {
        if !self.is_pass() {
            self.status = VerdictStatus::Info;
        }
        self
    }
}

/// Tunables shared by all detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorSettings {
    /// Above this many objectives/requirements a spec is flagged as
    /// carrying too many responsibilities.
    pub max_responsibilities: usize,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            max_responsibilities: 5,
        }
    }
}

/// A spec prepared for detection. Its searchable text and the lowercase
/// form used for term matching are built once per validation run and shared
/// by every detector.
#[derive(Debug, Clone)]
pub struct SpecSubject<'a> {
    pub content: &'a SpecContent,
    pub text: String,
    folded: String,
}

impl<'a> SpecSubject<'a> {
    pub fn new(content: &'a SpecContent) -> Self {
        let text = content.searchable_text();
        let folded = text.to_lowercase();
        Self {
            content,
            text,
            folded,
        }
    }

    /// Lowercased [`text`](Self::text).
    pub fn folded(&self) -> &str {
        &self.folded
    }
}

pub type Detector = fn(&RuleEntry, &SpecSubject<'_>, &DetectorSettings) -> DetectorVerdict;

#[derive(Debug, Clone)]
pub struct DetectorRegistry {
    by_id: FxHashMap<String, Detector>,
    by_prefix: Vec<(String, Detector)>,
    by_category: FxHashMap<RuleType, Detector>,
    fallback: Detector,
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DetectorRegistry {
    /// A registry that sends every rule to the fallback detector.
    pub fn empty() -> Self {
        Self {
            by_id: FxHashMap::default(),
            by_prefix: Vec::new(),
            by_category: FxHashMap::default(),
            fallback: keyword_contradiction,
        }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry
            .register_prefix("C", prohibited_tokens)
            .register_prefix("AR", dependency_direction)
            .register_prefix("DP", responsibility_focus)
            .register_category(RuleType::Principle, spec_completeness);
        registry
    }

    pub fn register_id(&mut self, id: impl Into<String>, detector: Detector) -> &mut Self {
        self.by_id.insert(id.into(), detector);
        self
    }

    pub fn register_prefix(&mut self, prefix: impl Into<String>, detector: Detector) -> &mut Self {
        let prefix = prefix.into();
        self.by_prefix.retain(|(p, _)| *p != prefix);
        self.by_prefix.push((prefix, detector));
        self
    }

    pub fn register_category(&mut self, rule_type: RuleType, detector: Detector) -> &mut Self {
        self.by_category.insert(rule_type, detector);
        self
    }

    pub fn set_fallback(&mut self, detector: Detector) -> &mut Self {
        self.fallback = detector;
        self
    }

    /// Detector responsible for `rule`, and whether it is the fallback.
    pub fn resolve(&self, rule: &RuleEntry) -> (Detector, bool) {
        if let Some(d) = self.by_id.get(&rule.id) {
            return (*d, false);
        }

        let by_prefix = self
            .by_prefix
            .iter()
            .filter(|(prefix, _)| {
                rule.id.strip_prefix(prefix.as_str()).is_some_and(|rest| {
                    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
                })
            })
            .max_by_key(|(prefix, _)| prefix.len());
        if let Some((_, d)) = by_prefix {
            return (*d, false);
        }

        if let Some(d) = self.by_category.get(&rule.rule_type) {
            return (*d, false);
        }
        (self.fallback, true)
    }

    pub fn run(
        &self,
        rule: &RuleEntry,
        spec: &SpecSubject<'_>,
        settings: &DetectorSettings,
    ) -> DetectorVerdict {
        let (detector, is_fallback) = self.resolve(rule);
        let verdict = detector(rule, spec, settings);
        if is_fallback {
            verdict.capped_at_info()
        } else {
            verdict
        }
    }
}

// ===== Built-in detectors =====

/// Title keywords that imply well-known prohibited tokens.
const TOPIC_TERMS: &[(&[&str], &[&str])] = &[
    (
        &["strict mode", "typescript strict", "no any"],
        &["any", "@ts-ignore", "@ts-nocheck"],
    ),
    (
        &["esm", "es module", "es modules", "ecmascript module"],
        &["require(", "module.exports"],
    ),
    (&["no console", "structured logging"], &["console.log("]),
];

/// Trailing nouns dropped from prohibition phrases ("No any types" → `any`).
const GENERIC_NOUNS: &[&str] = &[
    "type",
    "types",
    "call",
    "calls",
    "usage",
    "usages",
    "statement",
    "statements",
    "import",
    "imports",
    "keyword",
    "keywords",
];

/// Design principle titles that call for the responsibility count check.
const FOCUS_KEYWORDS: &[&str] = &[
    "responsibility",
    "responsibilities",
    "single purpose",
    "focused",
    "focus",
    "cohesion",
    "do one thing",
];

static PROHIBITION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^\s*[-*+]\s+(?:no|never(?:\s+use)?|avoid|do\s+not\s+use|don't\s+use|must\s+not\s+use|forbidden:?)\s+(.+?)\s*$",
    )
    .expect("valid prohibition regex")
});
static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid code span regex"));
static ARROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z][\w./-]*)\s*(?:→|->|=>)\s*([A-Za-z][\w./-]*)")
        .expect("valid arrow regex")
});
static DEPENDS_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Za-z][\w-]*)\s+(?:depends\s+on|imports|calls\s+into)\s+(?:the\s+)?([A-Za-z][\w-]*)")
        .expect("valid dependency phrase regex")
});
static FORBIDDEN_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Za-z][\w-]*)\s+(?:must|may|should)\s+not\s+(?:depend\s+on|import)\s+(?:the\s+)?([A-Za-z][\w-]*)")
        .expect("valid forbidden phrase regex")
});

/// Words that negate the phrase right after them ("skip code review").
const NEGATIONS: &[&str] = &[
    "no",
    "without",
    "skip",
    "skipping",
    "ignore",
    "ignoring",
    "disable",
    "disabling",
    "bypass",
    "bypassing",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// No word character directly before `idx` or after `idx + len`.
fn bounded(haystack: &str, idx: usize, len: usize) -> bool {
    let before = haystack[..idx].chars().next_back();
    let after = haystack[idx + len..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// True when `needle` occurs in `haystack` as a whole word or phrase.
fn mentions(haystack: &str, needle: &str) -> bool {
    !needle.is_empty()
        && haystack
            .match_indices(needle)
            .any(|(idx, _)| bounded(haystack, idx, needle.len()))
}

/// True when `phrase` occurs in `folded` as a whole phrase directly preceded
/// by whitespace and a negation word.
fn negated(folded: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    folded.match_indices(phrase).any(|(idx, _)| {
        if !bounded(folded, idx, phrase.len()) {
            return false;
        }
        let before = &folded[..idx];
        let head = before.trim_end();
        if head.len() == before.len() {
            return false;
        }
        head.char_indices()
            .rev()
            .take_while(|(_, c)| is_word_char(*c))
            .last()
            .is_some_and(|(start, _)| NEGATIONS.contains(&&head[start..]))
    })
}

fn is_generic_noun(word: &str) -> bool {
    let word = word.to_lowercase();
    GENERIC_NOUNS.contains(&word.trim_end_matches(['.', ',']))
}

fn normalize_term(raw: &str) -> Option<String> {
    let mut term = raw.trim().trim_end_matches(['.', ',', ';', ':']).to_string();
    if let Some(stripped) = term.strip_suffix("()") {
        term = format!("{}(", stripped);
    }
    if term.chars().count() < 2 {
        return None;
    }
    Some(term)
}

/// Terms a constraint forbids, in first-seen order.
pub fn prohibited_terms(rule: &RuleEntry) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut push = |t: String| {
        if !terms.contains(&t) {
            terms.push(t);
        }
    };

    let title = rule.title.to_lowercase();
    for (keywords, implied) in TOPIC_TERMS {
        if keywords.iter().any(|k| mentions(&title, k)) {
            implied.iter().for_each(|t| push(t.to_string()));
        }
    }

    for caps in PROHIBITION_LINE.captures_iter(&rule.description) {
        let phrase = &caps[1];
        if let Some(code) = CODE_SPAN.captures(phrase) {
            if let Some(t) = normalize_term(&code[1]) {
                push(t);
            }
            continue;
        }
        let mut words: Vec<&str> = phrase.split_whitespace().collect();
        if words.len() > 3 {
            continue;
        }
        while words.len() > 1 && words.last().is_some_and(|w| is_generic_noun(w)) {
            words.pop();
        }
        if let Some(t) = normalize_term(&words.join(" ")) {
            push(t);
        }
    }

    terms
}

/// Whether `term` appears in `folded`, which must already be lowercase.
/// Matching ignores case. Identifier-like terms match as whole words;
/// anything containing punctuation matches as a plain substring.
fn folded_term_matches(folded: &str, term: &str) -> bool {
    let term = term.to_lowercase();
    let wordy = term.chars().all(|c| is_word_char(c) || c == ' ');
    if wordy {
        mentions(folded, &term)
    } else {
        folded.contains(&term)
    }
}

/// Case-insensitive form of the check prohibited-token detection runs.
pub fn term_matches(text: &str, term: &str) -> bool {
    folded_term_matches(&text.to_lowercase(), term)
}

/// Constraints: fail when the spec uses a token the constraint prohibits.
pub fn prohibited_tokens(
    rule: &RuleEntry,
    spec: &SpecSubject<'_>,
    settings: &DetectorSettings,
) -> DetectorVerdict {
    let terms = prohibited_terms(rule);
    if terms.is_empty() {
        return keyword_contradiction(rule, spec, settings).capped_at_info();
    }

    match terms.iter().find(|t| folded_term_matches(spec.folded(), t)) {
        Some(term) => DetectorVerdict::fail(format!(
            "Spec content uses `{}`, which {} ({}) prohibits",
            term, rule.id, rule.title
        ))
        .with_suggestion(format!(
            "Remove or replace `{}` to comply with {}: {}",
            term, rule.id, rule.title
        )),
        None => DetectorVerdict::pass(),
    }
}

type Edge = (String, String);

fn edges(re: &Regex, text: &str) -> BTreeSet<Edge> {
    re.captures_iter(text)
        .map(|caps| (caps[1].to_lowercase(), caps[2].to_lowercase()))
        .filter(|(a, b)| a != b)
        .collect()
}

/// Architecture rules: fail when the spec describes a dependency that runs
/// against an allowed `a → b` direction, or one the rule forbids outright.
pub fn dependency_direction(
    rule: &RuleEntry,
    spec: &SpecSubject<'_>,
    settings: &DetectorSettings,
) -> DetectorVerdict {
    let rule_text = format!("{}\n{}", rule.title, rule.description);
    let forbidden = edges(&FORBIDDEN_PHRASE, &rule_text);
    let allowed: BTreeSet<Edge> = edges(&ARROW, &rule_text)
        .into_iter()
        .filter(|e| !forbidden.contains(e))
        .collect();
    if allowed.is_empty() && forbidden.is_empty() {
        return keyword_contradiction(rule, spec, settings).capped_at_info();
    }

    let mut described = edges(&ARROW, &spec.text);
    described.extend(edges(&DEPENDS_PHRASE, &spec.text));

    for (from, to) in &described {
        let edge = (from.clone(), to.clone());
        if forbidden.contains(&edge) {
            return DetectorVerdict::fail(format!(
                "Spec describes dependency `{} → {}`, which {} ({}) forbids",
                from, to, rule.id, rule.title
            ))
            .with_suggestion(format!("Remove the dependency of `{}` on `{}`", from, to));
        }
        let reversed = (to.clone(), from.clone());
        if allowed.contains(&reversed) && !allowed.contains(&edge) {
            return DetectorVerdict::fail(format!(
                "Spec describes dependency `{} → {}`, reversing the allowed direction `{} → {}` of {} ({})",
                from, to, to, from, rule.id, rule.title
            ))
            .with_suggestion(format!(
                "Invert the dependency so `{}` depends on `{}`, e.g. through an interface owned by `{}`",
                to, from, from
            ));
        }
    }
    DetectorVerdict::pass()
}

/// Design principles about focus: flag specs that try to do too many things
/// at once. Other design principles get the contradiction check.
pub fn responsibility_focus(
    rule: &RuleEntry,
    spec: &SpecSubject<'_>,
    settings: &DetectorSettings,
) -> DetectorVerdict {
    let title = rule.title.to_lowercase();
    if !FOCUS_KEYWORDS.iter().any(|k| mentions(&title, k)) {
        return keyword_contradiction(rule, spec, settings).capped_at_info();
    }
    let count = spec.content.responsibility_count();
    if count <= settings.max_responsibilities {
        return DetectorVerdict::pass();
    }
    DetectorVerdict::info(format!(
        "Too many responsibilities: spec lists {} objectives/requirements (threshold {}) under {} ({})",
        count, settings.max_responsibilities, rule.id, rule.title
    ))
    .with_suggestion("Split the spec into smaller, single-purpose units")
}

/// Principles: the spec must at least say what it is and why it exists.
pub fn spec_completeness(
    rule: &RuleEntry,
    spec: &SpecSubject<'_>,
    _settings: &DetectorSettings,
) -> DetectorVerdict {
    let mut missing = Vec::new();
    if spec.content.effective_title().is_none() {
        missing.push("a title");
    }
    if spec.content.effective_overview().is_none() {
        missing.push("an overview");
    }
    if missing.is_empty() {
        return DetectorVerdict::pass();
    }
    DetectorVerdict::warn(format!(
        "Spec is missing {} needed to assess principle {} ({})",
        missing.join(" and "),
        rule.id,
        rule.title
    ))
    .with_suggestion("Add a title and an overview section describing the spec's purpose")
}

/// Fallback: flag specs that explicitly negate the rule's key phrase
/// ("without strict mode", "skip code review").
pub fn keyword_contradiction(
    rule: &RuleEntry,
    spec: &SpecSubject<'_>,
    _settings: &DetectorSettings,
) -> DetectorVerdict {
    let phrase = rule.title.trim().to_lowercase();
    if phrase.is_empty() {
        return DetectorVerdict::pass();
    }
    let contradicted = negated(spec.folded(), &phrase);
    if !contradicted {
        return DetectorVerdict::pass();
    }
    DetectorVerdict::info(format!(
        "Spec appears to contradict {} ({})",
        rule.id, rule.title
    ))
    .with_suggestion(format!("Reconcile the spec with {}: {}", rule.id, rule.title))
}
