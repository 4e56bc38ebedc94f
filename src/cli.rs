//! CLI struct definitions for the specgate command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "specgate",
    version = env!("CARGO_PKG_VERSION"),
    about = "Parse project constitutions and score specifications against them."
)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
    Md,
}

#[derive(clap::Args, Debug)]
pub(crate) struct ParseCli {
    /// Constitution markdown file. Defaults to the embedded reference constitution.
    pub constitution: Option<PathBuf>,
    /// Output format: 'text' or 'json'.
    #[clap(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
    /// Config file (defaults to ./specgate.toml or ./.specgate/config.toml).
    #[clap(long)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub(crate) struct ValidateCli {
    /// Spec documents to validate (.json as SpecContent, anything else as markdown).
    #[clap(required = true)]
    pub specs: Vec<PathBuf>,
    /// Constitution markdown file. Defaults to the embedded reference constitution.
    #[clap(long, short = 'c')]
    pub constitution: Option<PathBuf>,
    /// Output format: 'text', 'json' or 'md'.
    #[clap(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
    /// Config file (defaults to ./specgate.toml or ./.specgate/config.toml).
    #[clap(long)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub(crate) struct ConstitutionCli {
    #[clap(subcommand)]
    pub command: Option<ConstitutionCommand>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ConstitutionCommand {
    /// List embedded reference documents
    List,
    /// Print an embedded reference document
    Show {
        /// Document name, e.g. CONSTITUTION.md
        #[clap(default_value = "CONSTITUTION.md")]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Parse a constitution and print its rule set
    Parse(ParseCli),
    /// Validate specification documents against a constitution
    Validate(ValidateCli),
    /// Inspect the embedded reference constitution and spec template
    Constitution(ConstitutionCli),
    /// Print version
    Version,
}
