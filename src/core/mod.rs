//! Core modules: the constitution engine and the shared helpers around it.
//!
//! Engine (pure, no I/O): `markdown`, `constitution`, `parser`,
//! `spec_content`, `detectors`, `validator`, `report`, `cache`.
//! Edges: `config`, `assets`, `error`, `output`, `time`.

pub mod assets;
pub mod cache;
pub mod config;
pub mod constitution;
pub mod detectors;
pub mod error;
pub mod markdown;
pub mod output;
pub mod parser;
pub mod report;
pub mod spec_content;
pub mod time;
pub mod validator;
