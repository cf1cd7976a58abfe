//! Lexicographic aggregation of per-statement outcomes.
//!
//! One inadmissible statement makes the whole utterance inadmissible.
//! Axiom outcomes are not additive, so the fold picks the worst status
//! in a fixed severity order rather than averaging anything.

use tracing::info;

use crate::types::{EvaluationStatus, GroundSet, License, PersonalContext, Statement};

/// One statement together with everything that judged it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementReview {
    pub statement: Statement,
    pub status: EvaluationStatus,
    pub license: License,
    pub ground_set: GroundSet,
    pub violated_axiom: Option<String>,
    pub explanation: String,
}

/// Whole-utterance review. Internal shape; the evaluator maps it to the
/// public [`Judgment`](crate::judgment::Judgment).
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub status: EvaluationStatus,
    pub licensed: bool,
    pub can_retry: bool,
    pub feedback_hint: Option<String>,
    pub violated_axioms: Vec<String>,
    pub statement_reviews: Vec<StatementReview>,
    pub explanation: String,
    pub num_statements: usize,
    pub num_acceptable: usize,
    pub personal_context_source: String,
    pub personal_context_scope: String,
    pub personal_context_present: bool,
    pub grounds_accepted: usize,
    pub grounds_cited: usize,
}

impl Review {
    /// Review for an utterance that produced no statements at all, e.g.
    /// empty output or protocol-only speech.
    pub fn without_statements(
        status: EvaluationStatus,
        explanation: &str,
        personal_context: Option<&PersonalContext>,
    ) -> Review {
        let (source, scope, present) = context_audit(personal_context);
        Review {
            status,
            licensed: false,
            can_retry: false,
            feedback_hint: None,
            violated_axioms: vec![],
            statement_reviews: vec![],
            explanation: explanation.to_string(),
            num_statements: 0,
            num_acceptable: 0,
            personal_context_source: source,
            personal_context_scope: scope,
            personal_context_present: present,
            grounds_accepted: 0,
            grounds_cited: 0,
        }
    }
}

/// Folds per-statement reviews into one verdict.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aggregator;

impl Aggregator {
    /// Severity order: `ViolatesNorm` > `IllFormed` > `Underdetermined` >
    /// `Unsupported` > `ConditionallyAcceptable` > `Acceptable`.
    ///
    /// `Underdetermined` removes jurisdiction entirely: not licensed, no
    /// retry, no feedback. `Unsupported` keeps the license because the
    /// claim form itself was admissible; only the grounding fell short.
    pub fn aggregate(
        &self,
        reviews: Vec<StatementReview>,
        personal_context: Option<&PersonalContext>,
    ) -> Review {
        let violations: Vec<String> = reviews
            .iter()
            .filter_map(|review| review.violated_axiom.clone())
            .collect();

        let (status, licensed, can_retry, feedback_hint, explanation) =
            if has(&reviews, EvaluationStatus::ViolatesNorm) {
                (
                    EvaluationStatus::ViolatesNorm,
                    false,
                    true,
                    Some(format!(
                        "Your response violates normative axioms: {}. Please revise or refuse to answer if you lack required context.",
                        violations.join(", ")
                    )),
                    format!("Violated axioms: {violations:?}"),
                )
            } else if has(&reviews, EvaluationStatus::IllFormed) {
                (
                    EvaluationStatus::IllFormed,
                    false,
                    true,
                    Some(
                        "Your response is structurally ill-formed. Please rephrase with clear subject-predicate statements."
                            .to_string(),
                    ),
                    "Structurally ill-formed statements detected".to_string(),
                )
            } else if has(&reviews, EvaluationStatus::Underdetermined) {
                (
                    EvaluationStatus::Underdetermined,
                    false,
                    false,
                    None,
                    "Validator has no jurisdiction to judge".to_string(),
                )
            } else if has(&reviews, EvaluationStatus::Unsupported) {
                (
                    EvaluationStatus::Unsupported,
                    true,
                    true,
                    Some(
                        "Your statements lack required grounding. Consider asking for more context or using conditional phrasing."
                            .to_string(),
                    ),
                    "Statements lack required grounding (A4)".to_string(),
                )
            } else if !reviews.is_empty()
                && reviews
                    .iter()
                    .all(|review| review.status == EvaluationStatus::ConditionallyAcceptable)
            {
                (
                    EvaluationStatus::ConditionallyAcceptable,
                    true,
                    false,
                    None,
                    "All statements are conditionally acceptable".to_string(),
                )
            } else if has(&reviews, EvaluationStatus::ConditionallyAcceptable) {
                (
                    EvaluationStatus::ConditionallyAcceptable,
                    true,
                    false,
                    None,
                    "Mix of conditional and acceptable statements".to_string(),
                )
            } else {
                (
                    EvaluationStatus::Acceptable,
                    true,
                    false,
                    None,
                    "All statements are normatively acceptable".to_string(),
                )
            };

        let num_statements = reviews.len();
        let num_acceptable = reviews
            .iter()
            .filter(|review| {
                matches!(
                    review.status,
                    EvaluationStatus::Acceptable | EvaluationStatus::ConditionallyAcceptable
                )
            })
            .count();

        info!(
            status = ?status,
            licensed,
            num_acceptable,
            num_statements,
            violations = violations.len(),
            "utterance aggregated"
        );

        let (source, scope, present) = context_audit(personal_context);
        Review {
            status,
            licensed,
            can_retry,
            feedback_hint,
            violated_axioms: violations,
            statement_reviews: reviews,
            explanation,
            num_statements,
            num_acceptable,
            personal_context_source: source,
            personal_context_scope: scope,
            personal_context_present: present,
            grounds_accepted: 0,
            grounds_cited: 0,
        }
    }
}

fn has(reviews: &[StatementReview], status: EvaluationStatus) -> bool {
    reviews.iter().any(|review| review.status == status)
}

fn context_audit(personal_context: Option<&PersonalContext>) -> (String, String, bool) {
    match personal_context {
        Some(context) => (
            context.source.as_str().to_string(),
            context.scope.as_str().to_string(),
            !context.text.is_empty(),
        ),
        None => ("unknown".to_string(), "unknown".to_string(), false),
    }
}
