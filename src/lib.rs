//! specgate: constitution parsing and specification validation.
//!
//! A *constitution* is a markdown document listing a project's principles,
//! constraints, architecture rules and design principles. specgate parses it
//! into a typed rule set and scores arbitrary specification documents
//! against that rule set.
//!
//! # Core Properties
//!
//! - **Total**: parsing and validation never fail; malformed input degrades
//!   to empty or partial structures
//! - **Deterministic**: same constitution and spec give the same result;
//!   reports differ only in their timestamp
//! - **Pure**: the engine performs no I/O and holds no global state
//! - **Extensible**: detectors are registered by rule id, id prefix or
//!   category, with a fallback that can only ever produce `info`
//!
//! # Library Use
//!
//! ```
//! use specgate::{parse, SpecContent, SpecValidator};
//!
//! let constitution = parse("### C1: TypeScript Strict Mode\n- strict: true\n- No any types\n");
//! let validator = SpecValidator::new(constitution);
//! let result = validator.validate(&SpecContent::with_raw_markdown("Use any type here"));
//! assert!(!result.valid);
//! assert_eq!(result.issues[0].code, "C1-VIOLATION");
//! ```
//!
//! # CLI
//!
//! ```bash
//! # Inspect the rule set of a constitution
//! specgate parse docs/CONSTITUTION.md
//!
//! # Validate specs (markdown or JSON) and render a markdown report
//! specgate validate --constitution docs/CONSTITUTION.md specs/*.md --format md
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: the engine (parser, detectors, validator, report) and its
//!   ambient helpers (config, assets, errors, output)

pub mod cli;
pub mod core;

pub use core::cache::ValidatorCache;
pub use core::constitution::{
    Constitution, ConstitutionMetadata, Constraint, RuleEntry, RuleRecord, RuleType, Severity,
};
pub use core::detectors::{DetectorRegistry, DetectorSettings, DetectorVerdict, VerdictStatus};
pub use core::parser::{ConstitutionDocumentParser, ParserOptions, parse};
pub use core::report::format_report_as_markdown;
pub use core::spec_content::SpecContent;
pub use core::validator::{
    IssueSeverity, ScoringWeights, SpecValidator, ValidationIssue, ValidationReport,
    ValidationResult,
};

use crate::cli::{Cli, Command, ConstitutionCommand, OutputFormat, ParseCli, ValidateCli};
use crate::core::{assets, config, error, output, time};
use clap::Parser;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const MESSAGE_WIDTH: usize = 160;

pub fn run() -> Result<(), error::SpecgateError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Parse(args) => run_parse(args, &current_dir),
        Command::Validate(args) => run_validate(args, &current_dir),
        Command::Constitution(args) => match args.command {
            None | Some(ConstitutionCommand::List) => {
                for name in assets::list_docs() {
                    println!("{}", name);
                }
                Ok(())
            }
            Some(ConstitutionCommand::Show { name }) => {
                let doc = assets::get_embedded_doc(&name).ok_or_else(|| {
                    error::SpecgateError::NotFound(format!("embedded doc {}", name))
                })?;
                print!("{}", doc);
                Ok(())
            }
        },
    }
}

/// Constitution text and a label for output. `None` means the embedded
/// reference constitution.
fn read_constitution(path: Option<&Path>) -> Result<(String, String), error::SpecgateError> {
    match path {
        Some(p) => {
            if !p.exists() {
                return Err(error::SpecgateError::NotFound(format!(
                    "constitution {}",
                    p.display()
                )));
            }
            let text = fs::read_to_string(p).map_err(error::SpecgateError::IoError)?;
            Ok((text, p.display().to_string()))
        }
        None => {
            let text = assets::get_embedded_doc(assets::DEFAULT_CONSTITUTION).ok_or_else(|| {
                error::SpecgateError::NotFound(assets::DEFAULT_CONSTITUTION.to_string())
            })?;
            Ok((text.to_string(), format!("embedded:{}", assets::DEFAULT_CONSTITUTION)))
        }
    }
}

/// Load a spec file: `.json` deserializes into `SpecContent`, anything else
/// is read as markdown.
pub fn load_spec(path: &Path) -> Result<SpecContent, error::SpecgateError> {
    if !path.exists() {
        return Err(error::SpecgateError::NotFound(format!(
            "spec {}",
            path.display()
        )));
    }
    let text = fs::read_to_string(path).map_err(error::SpecgateError::IoError)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(SpecContent::from_markdown(&text))
    }
}

fn run_parse(args: ParseCli, current_dir: &Path) -> Result<(), error::SpecgateError> {
    use colored::Colorize;

    let cfg = config::load_config(args.config.as_deref(), current_dir)?;
    let (text, label) = read_constitution(args.constitution.as_deref())?;
    let constitution = ConstitutionDocumentParser::new(cfg.parser_options()).parse(&text);

    if args.format == OutputFormat::Json {
        let envelope = time::command_envelope(
            "parse",
            "ok",
            serde_json::json!({
                "source": label,
                "constitution": constitution,
            }),
        );
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    let title = constitution
        .metadata
        .as_ref()
        .and_then(|m| m.title.clone())
        .unwrap_or_else(|| "Untitled constitution".to_string());
    println!("{} {}", "▸".bright_cyan(), title.bold());
    println!("  source: {}", label);
    if let Some(applies_to) = constitution.metadata.as_ref().and_then(|m| m.applies_to.as_ref()) {
        println!("  applies to: {}", applies_to);
    }

    for rule_type in RuleType::ALL {
        println!();
        println!(
            "{} ({})",
            rule_type.as_str().bright_white().bold(),
            constitution.count_of(rule_type)
        );
        for rule in constitution.rules().filter(|r| r.entry().rule_type == rule_type) {
            let entry = rule.entry();
            match rule.severity() {
                Some(sev) => println!(
                    "  {:<5} [{}] {}",
                    entry.id.bright_cyan(),
                    sev.as_str().bright_yellow(),
                    entry.title
                ),
                None => println!("  {:<5} {}", entry.id.bright_cyan(), entry.title),
            }
        }
    }
    Ok(())
}

fn run_validate(args: ValidateCli, current_dir: &Path) -> Result<(), error::SpecgateError> {
    let cfg = config::load_config(args.config.as_deref(), current_dir)?;
    let (text, label) = read_constitution(args.constitution.as_deref())?;

    let mut cache = ValidatorCache::new(
        cfg.parser_options(),
        cfg.detector_settings(),
        cfg.scoring,
    );
    let validator = cache.get_or_parse(&text);

    let specs: Vec<(PathBuf, SpecContent)> = args
        .specs
        .iter()
        .map(|p| load_spec(p).map(|spec| (p.clone(), spec)))
        .collect::<Result<_, _>>()?;

    let reports: Vec<(PathBuf, ValidationReport)> = specs
        .par_iter()
        .map(|(path, spec)| (path.clone(), validator.generate_report(spec)))
        .collect();

    let invalid = reports.iter().filter(|(_, r)| !r.valid).count();

    match args.format {
        OutputFormat::Json => {
            let results: Vec<serde_json::Value> = reports
                .iter()
                .map(|(path, report)| {
                    serde_json::json!({
                        "spec": path.display().to_string(),
                        "report": report,
                    })
                })
                .collect();
            let status = if invalid == 0 { "ok" } else { "invalid" };
            let envelope = time::command_envelope(
                "validate",
                status,
                serde_json::json!({
                    "constitution": label,
                    "results": results,
                }),
            );
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        OutputFormat::Md => {
            for (path, report) in &reports {
                println!("<!-- spec: {} -->", path.display());
                println!("{}", format_report_as_markdown(report));
            }
        }
        OutputFormat::Text => print_text_reports(&reports, &label),
    }

    if invalid > 0 {
        return Err(error::SpecgateError::ValidationError(format!(
            "{} of {} spec(s) failed validation",
            invalid,
            reports.len()
        )));
    }
    Ok(())
}

fn print_text_reports(reports: &[(PathBuf, ValidationReport)], label: &str) {
    use colored::Colorize;

    println!("{} constitution: {}", "▸".bright_cyan(), label);
    for (path, report) in reports {
        let result = ValidationResult {
            valid: report.valid,
            score: report.score,
            issues: report.issues.clone(),
            checked_constraints: report.checked_constraints,
        };
        let header = format!("{}", path.display());
        if report.valid {
            println!("{} {}", "✓".bright_green(), header.bright_green());
        } else {
            println!("{} {}", "✗".bright_red(), header.bright_red().bold());
        }
        println!("  {}", output::summary_line(&result));

        for issue in &report.issues {
            let line = output::issue_line(issue, MESSAGE_WIDTH);
            let line = match issue.severity {
                IssueSeverity::Error => line.bright_red(),
                IssueSeverity::Warning => line.bright_yellow(),
                IssueSeverity::Info => line.normal(),
            };
            println!("    {}", line);
            if let Some(suggestion) = &issue.suggestion {
                println!(
                    "      {} {}",
                    "▸".bright_cyan(),
                    output::compact_line(suggestion, MESSAGE_WIDTH).dimmed()
                );
            }
        }
        if let Some(recs) = &report.recommendations {
            for rec in recs {
                println!("  {} {}", "→".bright_cyan(), rec);
            }
        }
    }
}
