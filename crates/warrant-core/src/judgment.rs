//! Public judgment model.
//!
//! This is the wire contract consumers see: a top-level admissibility
//! status plus per-statement evaluations with their grounding traces.
//! Internal enums are flattened to lowercase strings here so the JSON
//! shape stays stable even if the internal model grows variants.

use serde::Serialize;

/// Final admissibility status of an evaluation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdmissibilityStatus {
    Acceptable,
    ConditionallyAcceptable,
    ViolatesNorm,
    Unsupported,
    /// Reserved for structurally broken statements. The engine currently
    /// reports malformed input as an error instead of producing this.
    IllFormed,
    Underdetermined,
    NoNormativeContent,
}

/// One ground as it appeared in a statement's matched ground set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroundRef {
    pub id: String,
    pub scope: String,
    pub source: String,
    pub status: String,
    pub confidence: f64,
    pub strength: String,
    pub semantic_id: Option<String>,
}

/// Evaluation of a single extracted statement.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatementEvaluation {
    pub statement_id: String,
    /// The statement text as evaluated.
    pub statement: String,
    /// Detected modality, or `"unknown"` when detection did not run.
    pub modality: String,
    /// Modalities the grounding licensed for this statement.
    pub license: Vec<String>,
    pub status: AdmissibilityStatus,
    pub violated_axiom: Option<String>,
    pub explanation: String,
    pub grounding_trace: Vec<GroundRef>,
    pub subject: Option<String>,
    pub predicate: Option<String>,
}

/// The complete admissibility judgment for one agent utterance.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Judgment {
    pub status: AdmissibilityStatus,
    /// Whether the utterance may be used as-is.
    pub licensed: bool,
    /// Whether a revised attempt could plausibly pass.
    pub can_retry: bool,
    pub statement_evaluations: Vec<StatementEvaluation>,
    /// Actionable guidance for the agent when revision could help.
    pub feedback_hint: Option<String>,
    pub violated_axioms: Vec<String>,
    pub explanation: String,
    pub num_statements: usize,
    pub num_acceptable: usize,
    /// Audit trail for supplied personal context. Never affects the
    /// verdict.
    pub personal_context_source: String,
    pub personal_context_scope: String,
    pub personal_context_present: bool,
    /// Distinct ground ids accepted into this evaluation.
    pub grounds_accepted: usize,
    /// Distinct ground ids actually cited by the utterance.
    pub grounds_cited: usize,
}
