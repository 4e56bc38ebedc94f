//! Caller-owned memoization of validators by constitution content.
//!
//! Keys are the SHA-256 of the constitution text, so two reads of the same
//! file share one parsed constitution and detector registry. Nothing here is
//! global: the caller decides the cache's lifetime and when to invalidate.

use crate::core::detectors::{DetectorRegistry, DetectorSettings};
use crate::core::parser::{ConstitutionDocumentParser, ParserOptions};
use crate::core::validator::{ScoringWeights, SpecValidator};
use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Hex SHA-256 of `text`.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Default)]
pub struct ValidatorCache {
    parser: ConstitutionDocumentParser,
    registry: DetectorRegistry,
    settings: DetectorSettings,
    weights: ScoringWeights,
    entries: FxHashMap<String, Arc<SpecValidator>>,
}

impl ValidatorCache {
    pub fn new(
        parser_options: ParserOptions,
        settings: DetectorSettings,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            parser: ConstitutionDocumentParser::new(parser_options),
            registry: DetectorRegistry::builtin(),
            settings,
            weights,
            entries: FxHashMap::default(),
        }
    }

    /// Use `registry` for validators built after this call.
    pub fn with_registry(mut self, registry: DetectorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Validator for `constitution_text`, parsing it on first use.
    pub fn get_or_parse(&mut self, constitution_text: &str) -> Arc<SpecValidator> {
        let key = content_hash(constitution_text);
        if let Some(existing) = self.entries.get(&key) {
            return Arc::clone(existing);
        }
        let constitution = self.parser.parse(constitution_text);
        let validator = Arc::new(
            SpecValidator::new(constitution)
                .with_registry(self.registry.clone())
                .with_settings(self.settings)
                .with_weights(self.weights),
        );
        self.entries.insert(key, Arc::clone(&validator));
        validator
    }

    pub fn get(&self, constitution_text: &str) -> Option<Arc<SpecValidator>> {
        self.entries.get(&content_hash(constitution_text)).cloned()
    }

    /// Drop the entry for `constitution_text`. Returns whether one existed.
    pub fn invalidate(&mut self, constitution_text: &str) -> bool {
        self.entries.remove(&content_hash(constitution_text)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
