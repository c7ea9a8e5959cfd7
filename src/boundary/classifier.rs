//! Text classifier over the shared pattern library
//!
//! Sanitization (de-identifier) and detection (firewall) both go through
//! [`PhiClassifier`], so a pattern added to the library takes effect on
//! both sides of the boundary at once.

use super::codes::slugify;
use super::models::PhiCategory;
use super::patterns::PatternRegistry;
use anyhow::Result;
use std::sync::Arc;

/// Replacement for every redacted span
///
/// Neutral on purpose: it must not contain a labeled-PHI keyword.
pub const REDACTION_TOKEN: &str = "[REDACTED]";

/// Marker appended to truncated fields
pub const ELLIPSIS: &str = "...";

/// Classifier shared by the de-identifier and the firewall
#[derive(Clone)]
pub struct PhiClassifier {
    registry: Arc<PatternRegistry>,
}

impl PhiClassifier {
    /// Classifier over the built-in pattern library
    pub fn new() -> Result<Self> {
        Ok(Self::with_registry(PatternRegistry::default_patterns()?))
    }

    /// Classifier over a custom pattern registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Underlying pattern registry
    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Replace every redactable pattern, in library order
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for pattern in self.registry.redaction_patterns() {
            if pattern.regex.is_match(&out) {
                out = pattern
                    .regex
                    .replace_all(&out, REDACTION_TOKEN)
                    .into_owned();
            }
        }
        out
    }

    /// Whether the text carries a labeled-PHI keyword (`dob`, `mrn`, ...)
    pub fn contains_labeled_phi(&self, text: &str) -> bool {
        self.registry.labeled_keywords().is_match(text)
    }

    /// First PHI signal in the text: explicit labels, then blocking patterns
    pub fn detect(&self, text: &str) -> Option<PhiCategory> {
        if self
            .registry
            .firewall_labels()
            .iter()
            .any(|label| label.is_match(text))
        {
            return Some(PhiCategory::Label);
        }

        self.registry
            .blocking_patterns()
            .find(|p| p.regex.is_match(text))
            .map(|p| p.category)
    }

    /// Sanitize one free-text field for the outbound packet
    ///
    /// Collapses whitespace, redacts patterns, then drops the whole field if
    /// a labeled-PHI keyword survives, then truncates to `max_len` chars.
    ///
    /// Whitespace collapses before redaction so spaced-out numbers are seen
    /// in the same shape the firewall will see. The result never classifies
    /// as PHI: a truncation that leaves a pattern behind (`12345` cut out of
    /// a longer token) drops the field too.
    pub fn sanitize(&self, text: &str, max_len: usize) -> String {
        let redacted = self.redact(&collapse_whitespace(text));
        if self.contains_labeled_phi(&redacted) {
            return String::new();
        }
        let truncated = truncate_with_ellipsis(&collapse_whitespace(&redacted), max_len);
        if self.detect(&truncated).is_some() {
            return String::new();
        }
        truncated
    }

    /// Sanitized field, or `None` when nothing usable survives
    pub fn clean_field(&self, text: &str, max_len: usize) -> Option<String> {
        Some(self.sanitize(text, max_len)).filter(|s| !s.is_empty())
    }

    /// Normalized `[a-z0-9_]` key built from sanitized text
    ///
    /// Redacted spans are dropped rather than slugged.
    pub fn normalize_key(&self, text: &str) -> Option<String> {
        let sanitized = self.sanitize(text, text.chars().count());
        let slug = slugify(&sanitized.replace(REDACTION_TOKEN, " "));
        if slug.is_empty() || self.detect(&slug).is_some() {
            return None;
        }
        Some(slug)
    }
}

/// Collapse runs of whitespace to single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_len` characters, marking the cut with `...`
pub fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    if max_len <= ELLIPSIS.len() {
        return text.chars().take(max_len).collect();
    }

    let kept: String = text.chars().take(max_len - ELLIPSIS.len()).collect();
    format!("{}{ELLIPSIS}", kept.trim_end())
}
