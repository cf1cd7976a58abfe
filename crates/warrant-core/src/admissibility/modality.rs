//! Modality detection: head-driven classification of statement form.
//!
//! Only the core assertion (first paragraph or sentence) determines
//! modality; supplementary clauses in the tail cannot flip a
//! recommendation into a conditional. Declared conditions, by contrast,
//! are scanned over the full text: they are declarative flags for the
//! conditionality axiom, not logical premises.

use tracing::debug;

use crate::admissibility::patterns;
use crate::types::{Modality, Statement};

/// Classifies one statement's illocutionary form.
///
/// Priority order: refusal, goal-conditional, personalization,
/// recommendation, conditional, descriptive, assertive default. The
/// assertive default is the anti-evasion rule: normative language that
/// matches nothing specific reads as a categorical claim, so vague
/// phrasing cannot dodge licensing.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModalityDetector;

impl ModalityDetector {
    pub fn detect(&self, text: &str) -> Modality {
        let core = extract_core_assertion(text);

        if patterns::matches_refusal(&core) {
            return Modality::Refusal;
        }
        // Goal-scoped and personalization framing force the conditional
        // reading even when recommendation markers are present.
        if patterns::matches_goal_conditional(&core) {
            return Modality::Conditional;
        }
        if patterns::matches_personalization(&core) {
            return Modality::Conditional;
        }
        if patterns::matches_recommendation(&core) {
            return Modality::Assertive;
        }
        if patterns::matches_conditional(&core) {
            return Modality::Conditional;
        }
        if patterns::matches_descriptive(&core) && !patterns::matches_normative(&core) {
            return Modality::Descriptive;
        }
        Modality::Assertive
    }

    /// Set the statement's modality in place; conditionals also get their
    /// declared conditions.
    pub fn detect_with_conditions(&self, statement: &mut Statement) {
        let modality = self.detect(&statement.raw_text);
        debug!(
            statement = %statement.id,
            modality = modality.as_str(),
            "modality detected"
        );
        statement.modality = Some(modality);
        if modality == Modality::Conditional {
            statement.conditions = extract_conditions(&statement.raw_text);
        }
    }
}

/// Extract the lowercased core assertion: first paragraph, else first
/// sentence, else first line, else the first 500 characters.
fn extract_core_assertion(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    if let Some((head, _)) = lower.split_once("\n\n") {
        return head.trim().to_string();
    }
    if let Some(caps) = patterns::FIRST_SENTENCE.captures(&lower) {
        if let Some(sentence) = caps.get(1) {
            return sentence.as_str().trim().to_string();
        }
    }
    if let Some((head, _)) = lower.split_once('\n') {
        return head.trim().to_string();
    }
    lower.chars().take(500).collect::<String>().trim().to_string()
}

/// Extract declared condition clauses from the full text. Clauses are
/// textual markers only: "unless X" becomes "NOT X" without any logical
/// evaluation, and a conditional with no extractable clause yields the
/// `unspecified` sentinel.
fn extract_conditions(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut conditions = Vec::new();

    if let Some(caps) = patterns::IF_CONDITION.captures(&lower) {
        conditions.push(caps[1].trim().to_string());
    }
    if let Some(caps) = patterns::UNLESS_CONDITION.captures(&lower) {
        conditions.push(format!("NOT {}", caps[1].trim()));
    }
    if let Some(caps) = patterns::ASSUMING_CONDITION.captures(&lower) {
        conditions.push(caps[1].trim().to_string());
    }
    if let Some(caps) = patterns::GIVEN_YOUR_CONDITION.captures(&lower) {
        conditions.push(format!("given your {}", caps[1].trim()));
    }
    if let Some(caps) = patterns::BASED_ON_YOUR_CONDITION.captures(&lower) {
        conditions.push(format!("based on your {}", caps[1].trim()));
    }
    if patterns::FOR_YOU_MARKER.is_match(&lower) {
        conditions.push("for you".to_string());
    }

    if conditions.is_empty() {
        conditions.push("unspecified".to_string());
    }
    conditions
}
