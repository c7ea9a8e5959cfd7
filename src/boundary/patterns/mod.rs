//! Shared pattern library for PHI redaction and detection
//!
//! One compiled registry feeds both the de-identifier and the firewall so
//! the two can never disagree about what PHI looks like.

use crate::boundary::models::PhiCategory;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Built-in pattern library (TOML source)
pub const DEFAULT_PATTERN_LIBRARY: &str = include_str!("../../../patterns/phi_patterns.toml");

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Regex patterns for this category
    pub patterns: Vec<String>,
    /// PHI category label
    pub category: String,
    /// Position in the sequential redaction pass
    pub order: u32,
    /// Applied by free-text sanitization
    #[serde(default = "default_true")]
    pub redact: bool,
    /// A match makes the firewall reject the payload
    #[serde(default = "default_true")]
    pub block: bool,
}

fn default_true() -> bool {
    true
}

/// Keyword list whose presence drops a whole free-text field
#[derive(Debug, Clone, Deserialize)]
struct KeywordList {
    keywords: Vec<String>,
}

/// Explicit label regexes checked by the firewall
#[derive(Debug, Clone, Deserialize)]
struct LabelList {
    patterns: Vec<String>,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    patterns: HashMap<String, PatternDefinition>,
    labeled_phi: KeywordList,
    firewall_labels: LabelList,
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Library entry name
    pub name: String,
    /// Compiled regex
    pub regex: Regex,
    /// PHI category
    pub category: PhiCategory,
    /// Redaction order
    pub order: u32,
    /// Used by sanitization
    pub redact: bool,
    /// Used by the firewall
    pub block: bool,
}

/// Compiled, immutable PHI pattern registry
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    labeled_keywords: Regex,
    firewall_labels: Vec<Regex>,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut patterns = Vec::new();
        for (name, def) in library.patterns {
            let category = PhiCategory::parse(&def.category).with_context(|| {
                format!("Invalid category in pattern '{}': {}", name, def.category)
            })?;

            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str)
                    .with_context(|| format!("Invalid regex in pattern '{name}': {pattern_str}"))?;

                patterns.push(CompiledPattern {
                    name: name.clone(),
                    regex,
                    category,
                    order: def.order,
                    redact: def.redact,
                    block: def.block,
                });
            }
        }

        // HashMap iteration order is arbitrary; redaction must be sequential.
        patterns.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));

        let present: BTreeSet<PhiCategory> = patterns.iter().map(|p| p.category).collect();
        let missing: Vec<&str> = PhiCategory::REQUIRED
            .iter()
            .filter(|c| !present.contains(c))
            .map(|c| c.label())
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Pattern library is missing required categories: {}",
                missing.join(", ")
            );
        }

        let labeled_keywords = Self::compile_keywords(&library.labeled_phi.keywords)?;

        let firewall_labels = library
            .firewall_labels
            .patterns
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("Invalid firewall label regex: {p}")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            labeled_keywords,
            firewall_labels,
        })
    }

    /// Create a default pattern registry with built-in patterns
    pub fn default_patterns() -> Result<Self> {
        Self::from_toml(DEFAULT_PATTERN_LIBRARY)
    }

    /// All patterns in redaction order
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Patterns applied by free-text sanitization, in order
    pub fn redaction_patterns(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter().filter(|p| p.redact)
    }

    /// Patterns that make the firewall reject a payload, in order
    pub fn blocking_patterns(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter().filter(|p| p.block)
    }

    /// Patterns for a specific category
    pub fn patterns_for_category(&self, category: PhiCategory) -> Vec<&CompiledPattern> {
        self.patterns
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Case-insensitive, word-bounded keyword matcher
    pub fn labeled_keywords(&self) -> &Regex {
        &self.labeled_keywords
    }

    /// Explicit label regexes
    pub fn firewall_labels(&self) -> &[Regex] {
        &self.firewall_labels
    }

    /// `(?i)\b(?:kw1|kw2|...)\b`, with spaces inside a keyword matching any whitespace
    fn compile_keywords(keywords: &[String]) -> Result<Regex> {
        if keywords.is_empty() {
            anyhow::bail!("Pattern library must define at least one labeled_phi keyword");
        }

        let alternation = keywords
            .iter()
            .map(|k| {
                k.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect::<Vec<_>>()
            .join("|");

        Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
            .context("Failed to compile labeled_phi keywords")
    }
}
