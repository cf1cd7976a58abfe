//! # warrant-core
//!
//! Deterministic normative admissibility engine for agent utterances.
//!
//! Given an agent's final message, the conversation trajectory it came
//! from, and any declared grounds, this crate answers:
//! - Was the agent licensed to say this?
//! - Which axiom did an unlicensed claim violate?
//! - Can a revised attempt plausibly pass?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces the same judgment
//! 2. **No LLM calls**: Modality, grounding, and licensing are rule-based
//! 3. **Traceable**: Every verdict carries per-statement grounding traces
//! 4. **Lexicographic**: One inadmissible statement fails the whole act
//!
//! ## Example
//!
//! ```rust,ignore
//! use warrant_core::{evaluate, AdmissibilityStatus, EvaluateInput};
//!
//! let input = EvaluateInput {
//!     agent_output: Some("You should prioritize AGENT-5. [@call1]".to_string()),
//!     ..Default::default()
//! };
//! let judgment = evaluate(input)?;
//!
//! match judgment.status {
//!     AdmissibilityStatus::Acceptable => println!("OK: {}", judgment.explanation),
//!     AdmissibilityStatus::ViolatesNorm => {
//!         println!("REJECT: {:?}", judgment.violated_axioms)
//!     }
//!     _ => println!("{}: {}", judgment.licensed, judgment.explanation),
//! }
//! ```

pub mod admissibility;
mod aggregator;
pub mod conversation;
mod evaluator;
pub mod grounding;
pub mod judgment;
pub mod types;

// Re-export the main surface at crate root
pub use admissibility::LicenseMode;
pub use evaluator::{
    evaluate, evaluate_from_json, evaluate_from_json_with_options, evaluate_with_options,
    AdmissibilityEvaluator, EvaluateInput,
};
pub use judgment::{AdmissibilityStatus, Judgment, StatementEvaluation};
pub use types::{GroundError, PersonalContext};

use thiserror::Error;

/// Input-contract violations. These are request errors, not judgments:
/// a payload that fails here was never evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluateError {
    #[error("either agent_output or conversation is required")]
    MissingInput,

    #[error("conversation must contain at least one message")]
    InvalidConversation,

    #[error("last conversation message must have role 'assistant'")]
    LastMessageNotAssistant,

    #[error("assistant content must be a string or content parts")]
    LastAssistantContentNotString,

    #[error("agent_output does not match the last assistant message")]
    AgentOutputMismatch,

    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Evaluation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluateOptions {
    /// How grounding licenses claims: cited links only (default) or
    /// presence of grounds alone.
    pub license_mode: LicenseMode,
}
