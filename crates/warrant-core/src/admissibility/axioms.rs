//! Axiom checking: the admissibility rules for one statement.
//!
//! The rules, in check order:
//! - **A6** — an explicit refusal is always admissible; it makes no claim.
//! - **A5** — an assertive claim needs a license that permits assertion
//!   (the categoricity ban).
//! - **A7** — a conditional claim must declare its conditions.
//! - **A4** — claims need grounding; descriptive claims specifically need
//!   factual grounding.
//!
//! Anything the rules cannot reach is underdetermined, never guessed.

use crate::types::{EvaluationStatus, GroundSet, License, Modality, Statement};

/// Result of checking one statement against the axioms.
#[derive(Debug, Clone, PartialEq)]
pub struct AxiomOutcome {
    pub status: EvaluationStatus,
    pub violated_axiom: Option<String>,
    pub explanation: String,
}

/// Checks one statement against the normative axioms.
#[derive(Debug, Default, Clone, Copy)]
pub struct AxiomChecker;

impl AxiomChecker {
    pub fn check(
        &self,
        statement: &Statement,
        license: &License,
        ground_set: &GroundSet,
    ) -> AxiomOutcome {
        if statement.modality == Some(Modality::Refusal) {
            return outcome(
                EvaluationStatus::Acceptable,
                None,
                "Explicit refusal is always admissible (A6)",
            );
        }

        if statement.modality == Some(Modality::Assertive) && !license.permits(Modality::Assertive)
        {
            return outcome(
                EvaluationStatus::ViolatesNorm,
                Some("A5"),
                "Assertive statement without sufficient grounding (categoricity ban)",
            );
        }

        if statement.modality == Some(Modality::Conditional) {
            if license.permits(Modality::Assertive) {
                return outcome(
                    EvaluationStatus::ConditionallyAcceptable,
                    None,
                    "Conditional form chosen by agent (ASSERTIVE also permitted by grounding)",
                );
            }
            if !statement.conditions.is_empty() {
                return outcome(
                    EvaluationStatus::ConditionallyAcceptable,
                    None,
                    format!(
                        "Conditional statement with declared conditions: {:?}",
                        statement.conditions
                    ),
                );
            }
            return outcome(
                EvaluationStatus::Unsupported,
                Some("A7"),
                "Conditional statement without declared conditions",
            );
        }

        if is_normative(statement) && ground_set.is_empty() {
            return outcome(
                EvaluationStatus::Unsupported,
                Some("A4"),
                "Normative claim without grounding",
            );
        }

        if statement.modality == Some(Modality::Descriptive) {
            if ground_set.has_factual() {
                return outcome(
                    EvaluationStatus::Acceptable,
                    None,
                    "Descriptive statement grounded in factual knowledge",
                );
            }
            return outcome(
                EvaluationStatus::Unsupported,
                Some("A4"),
                "Descriptive statement without factual grounding",
            );
        }

        if let Some(modality) = statement.modality {
            if license.permits(modality) {
                return outcome(
                    EvaluationStatus::Acceptable,
                    None,
                    format!("Statement modality ({}) permitted by license", modality.as_str()),
                );
            }
            return outcome(
                EvaluationStatus::Underdetermined,
                None,
                format!(
                    "Cannot determine status (modality={}, license={:?})",
                    modality.as_str(),
                    license
                        .permitted_modalities
                        .iter()
                        .map(|m| m.as_str().to_string())
                        .collect::<Vec<_>>()
                ),
            );
        }

        outcome(
            EvaluationStatus::Underdetermined,
            None,
            "Cannot determine status (modality=None)",
        )
    }
}

fn is_normative(statement: &Statement) -> bool {
    matches!(
        statement.modality,
        Some(Modality::Assertive | Modality::Conditional)
    )
}

fn outcome(
    status: EvaluationStatus,
    violated_axiom: Option<&str>,
    explanation: impl Into<String>,
) -> AxiomOutcome {
    AxiomOutcome {
        status,
        violated_axiom: violated_axiom.map(ToString::to_string),
        explanation: explanation.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Ground, Scope, Source, Status, Strength};
    use std::collections::BTreeSet;

    fn statement(modality: Option<Modality>, conditions: Vec<&str>) -> Statement {
        Statement {
            id: "final_response".to_string(),
            subject: "agent".to_string(),
            predicate: "participation".to_string(),
            raw_text: "text".to_string(),
            modality,
            conditions: conditions.into_iter().map(ToString::to_string).collect(),
        }
    }

    fn license(modalities: &[Modality]) -> License {
        License {
            permitted_modalities: modalities.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    fn factual_set() -> GroundSet {
        GroundSet {
            grounds: vec![Ground {
                id: "g1".to_string(),
                source: Source::Observed,
                status: Status::Confirmed,
                confidence: 1.0,
                scope: Scope::Factual,
                strength: Strength::Strong,
                semantic_id: None,
            }],
        }
    }

    #[test]
    fn test_refusal_is_always_acceptable() {
        let result = AxiomChecker.check(
            &statement(Some(Modality::Refusal), vec![]),
            &License::default(),
            &GroundSet::default(),
        );
        assert_eq!(result.status, EvaluationStatus::Acceptable);
        assert_eq!(result.violated_axiom, None);
        assert_eq!(result.explanation, "Explicit refusal is always admissible (A6)");
    }

    #[test]
    fn test_unlicensed_assertive_violates_a5() {
        let result = AxiomChecker.check(
            &statement(Some(Modality::Assertive), vec![]),
            &license(&[Modality::Refusal]),
            &factual_set(),
        );
        assert_eq!(result.status, EvaluationStatus::ViolatesNorm);
        assert_eq!(result.violated_axiom.as_deref(), Some("A5"));
    }

    #[test]
    fn test_licensed_assertive_is_acceptable() {
        let result = AxiomChecker.check(
            &statement(Some(Modality::Assertive), vec![]),
            &license(&[Modality::Assertive, Modality::Conditional, Modality::Refusal]),
            &factual_set(),
        );
        assert_eq!(result.status, EvaluationStatus::Acceptable);
        assert_eq!(
            result.explanation,
            "Statement modality (assertive) permitted by license"
        );
    }

    #[test]
    fn test_conditional_under_assertive_license_is_conditionally_acceptable() {
        let result = AxiomChecker.check(
            &statement(Some(Modality::Conditional), vec![]),
            &license(&[Modality::Assertive, Modality::Conditional, Modality::Refusal]),
            &factual_set(),
        );
        assert_eq!(result.status, EvaluationStatus::ConditionallyAcceptable);
        assert_eq!(
            result.explanation,
            "Conditional form chosen by agent (ASSERTIVE also permitted by grounding)"
        );
    }

    #[test]
    fn test_conditional_with_declared_conditions_is_conditionally_acceptable() {
        let result = AxiomChecker.check(
            &statement(Some(Modality::Conditional), vec!["the deadline is friday"]),
            &license(&[Modality::Conditional, Modality::Refusal]),
            &factual_set(),
        );
        assert_eq!(result.status, EvaluationStatus::ConditionallyAcceptable);
        assert!(result.explanation.contains("the deadline is friday"));
    }

    #[test]
    fn test_conditional_without_declared_conditions_violates_a7() {
        let result = AxiomChecker.check(
            &statement(Some(Modality::Conditional), vec![]),
            &license(&[Modality::Conditional, Modality::Refusal]),
            &factual_set(),
        );
        assert_eq!(result.status, EvaluationStatus::Unsupported);
        assert_eq!(result.violated_axiom.as_deref(), Some("A7"));
    }

    #[test]
    fn test_normative_claim_with_empty_ground_set_is_unsupported() {
        // Unreachable through the pipeline (a license permitting
        // assertion implies a non-empty set), but the guard keeps the
        // ladder total.
        let result = AxiomChecker.check(
            &statement(Some(Modality::Assertive), vec![]),
            &license(&[Modality::Assertive]),
            &GroundSet::default(),
        );
        assert_eq!(result.status, EvaluationStatus::Unsupported);
        assert_eq!(result.violated_axiom.as_deref(), Some("A4"));
    }

    #[test]
    fn test_descriptive_with_factual_grounding_is_acceptable() {
        let result = AxiomChecker.check(
            &statement(Some(Modality::Descriptive), vec![]),
            &License::default(),
            &factual_set(),
        );
        assert_eq!(result.status, EvaluationStatus::Acceptable);
    }

    #[test]
    fn test_descriptive_without_factual_grounding_violates_a4() {
        let result = AxiomChecker.check(
            &statement(Some(Modality::Descriptive), vec![]),
            &License::default(),
            &GroundSet::default(),
        );
        assert_eq!(result.status, EvaluationStatus::Unsupported);
        assert_eq!(result.violated_axiom.as_deref(), Some("A4"));
    }

    #[test]
    fn test_unclassified_modality_is_underdetermined() {
        let result = AxiomChecker.check(
            &statement(None, vec![]),
            &License::default(),
            &factual_set(),
        );
        assert_eq!(result.status, EvaluationStatus::Underdetermined);
        assert_eq!(result.explanation, "Cannot determine status (modality=None)");
    }
}
