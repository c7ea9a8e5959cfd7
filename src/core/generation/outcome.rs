//! Letter generation outcome

use crate::domain::CaseId;
use std::time::Duration;

/// Result of one letter generation run
///
/// `document` holds local PHI once reinsertion ran. It must stay on the
/// device and is never logged.
#[derive(Debug, Clone)]
pub struct LetterOutcome {
    /// Ephemeral case id shared with the generation service
    pub case_id: CaseId,

    /// Final letter, or the raw template when reinsertion was skipped
    pub document: String,

    /// Placeholders left in `document`, in order of first appearance
    pub unfilled: Vec<String>,

    /// Context fields the pre-flight check found missing
    pub context_missing: Vec<&'static str>,

    /// Whether the template looked like a letter and was filled
    pub reinserted: bool,

    /// Wall-clock time for the run
    pub duration: Duration,
}

impl LetterOutcome {
    /// Whether staff must look at the letter before it is sent
    pub fn needs_review(&self) -> bool {
        !self.reinserted || !self.unfilled.is_empty() || !self.context_missing.is_empty()
    }

    /// One-line reasons for review, without any field values
    pub fn review_notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if !self.reinserted {
            notes.push("generated text did not look like a letter; reinsertion skipped".to_string());
        }
        if !self.unfilled.is_empty() {
            notes.push(format!("unfilled placeholders: {}", self.unfilled.join(", ")));
        }
        if !self.context_missing.is_empty() {
            notes.push(format!(
                "missing context fields: {}",
                self.context_missing.join(", ")
            ));
        }
        notes
    }
}
