//! Core domain model for admissibility evaluation.
//!
//! Everything here is deterministic data: statements carved out of agent
//! output, grounds built from observed evidence, the licenses grounds
//! confer, and the links that tie cited grounds to statements.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

/// Errors from domain-level validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroundError {
    #[error("Confidence must be in [0.0, 1.0], got {0}")]
    InvalidConfidence(f64),
}

/// Statement modality: how the agent committed to its claim.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Unconditional claim ("X should Y").
    Assertive,
    /// Claim under a stated condition ("If A, X should Y").
    Conditional,
    /// Declining to judge ("Cannot determine X").
    Refusal,
    /// Plain factual description, no normative force.
    Descriptive,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Assertive => "assertive",
            Modality::Conditional => "conditional",
            Modality::Refusal => "refusal",
            Modality::Descriptive => "descriptive",
        }
    }
}

/// How a ground entered the knowledge state.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Observed,
    Explicit,
    Inferred,
    Repeated,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Observed => "observed",
            Source::Explicit => "explicit",
            Source::Inferred => "inferred",
            Source::Repeated => "repeated",
        }
    }
}

/// Epistemic status of a ground.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Hypothesis,
    Candidate,
    Confirmed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Hypothesis => "hypothesis",
            Status::Candidate => "candidate",
            Status::Confirmed => "confirmed",
        }
    }
}

/// What a ground is about: the world or the conversation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Factual,
    Contextual,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Factual => "factual",
            Scope::Contextual => "contextual",
        }
    }
}

/// Evidential strength, ordered `None < Weak < Strong`.
///
/// Per-ground strength is derived from confidence at construction and is
/// never `None`; `None` is the aggregate value of an empty scope.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    None,
    Weak,
    Strong,
}

impl Strength {
    /// Strength threshold: confidence at or above this derives `Strong`.
    pub const STRONG_CONFIDENCE: f64 = 0.8;

    pub fn from_confidence(confidence: f64) -> Strength {
        if confidence >= Self::STRONG_CONFIDENCE {
            Strength::Strong
        } else {
            Strength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::None => "none",
            Strength::Weak => "weak",
            Strength::Strong => "strong",
        }
    }
}

/// A statement carved out of the agent's utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub id: String,
    pub subject: String,
    pub predicate: String,
    pub raw_text: String,
    pub modality: Option<Modality>,
    /// Declared conditions; populated only for conditional statements.
    pub conditions: Vec<String>,
}

/// A single piece of evidence the agent could ground a statement on.
#[derive(Debug, Clone, PartialEq)]
pub struct Ground {
    pub id: String,
    pub source: Source,
    pub status: Status,
    pub confidence: f64,
    pub scope: Scope,
    pub strength: Strength,
    /// Domain-level identity (e.g. `weather_nyc_2026-02-07`), when one
    /// could be extracted from the evidence payload.
    pub semantic_id: Option<String>,
}

impl Ground {
    /// Build a ground, validating confidence and deriving strength.
    pub fn new(
        id: String,
        source: Source,
        status: Status,
        confidence: f64,
        scope: Scope,
        semantic_id: Option<String>,
    ) -> Result<Self, GroundError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(GroundError::InvalidConfidence(confidence));
        }
        Ok(Self {
            id,
            source,
            status,
            confidence,
            scope,
            strength: Strength::from_confidence(confidence),
            semantic_id,
        })
    }
}

/// The grounds relevant to one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundSet {
    pub grounds: Vec<Ground>,
}

impl GroundSet {
    pub fn is_empty(&self) -> bool {
        self.grounds.is_empty()
    }

    pub fn has_factual(&self) -> bool {
        self.has_scope(Scope::Factual)
    }

    pub fn has_scope(&self, scope: Scope) -> bool {
        self.grounds.iter().any(|g| g.scope == scope)
    }

    /// Aggregate strength of a scope: the strongest ground in it, or
    /// `Strength::None` when the scope holds no grounds.
    pub fn scope_strength(&self, scope: Scope) -> Strength {
        self.grounds
            .iter()
            .filter(|g| g.scope == scope)
            .map(|g| g.strength)
            .max()
            .unwrap_or(Strength::None)
    }

    pub fn has_strong_in_scope(&self, scope: Scope) -> bool {
        self.grounds
            .iter()
            .any(|g| g.scope == scope && g.strength == Strength::Strong)
    }

    pub fn grounds_in_scope(&self, scope: Scope) -> Vec<&Ground> {
        self.grounds.iter().filter(|g| g.scope == scope).collect()
    }

    /// Resolve a cited ground id. Canonical ids win over semantic ids.
    pub fn resolve(&self, ground_id: &str) -> Option<&Ground> {
        if let Some(g) = self.grounds.iter().find(|g| g.id == ground_id) {
            return Some(g);
        }
        self.grounds
            .iter()
            .find(|g| g.semantic_id.as_deref() == Some(ground_id))
    }
}

/// The set of modalities a statement's grounding licenses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct License {
    pub permitted_modalities: BTreeSet<Modality>,
}

impl License {
    pub fn permits(&self, modality: Modality) -> bool {
        self.permitted_modalities.contains(&modality)
    }
}

/// Role a ground plays for the statement it is linked to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkRole {
    Supports,
    Disambiguates,
    Contextualizes,
}

/// Who asserted a ground-statement link.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CreatorType {
    Human,
    ToolObserver,
    AgentDeclaration,
    UpstreamPipeline,
}

/// Kind of evidence behind a link.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceType {
    Observation,
    Explicit,
    Structural,
    Validation,
}

/// Where a link came from. Deliberately carries no timestamp; judgments
/// must be byte-identical across runs.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Provenance {
    pub creator: CreatorType,
    pub evidence_type: EvidenceType,
    pub evidence_content: Option<String>,
    pub signature: Option<String>,
}

/// A citation link from a statement to a ground.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SupportLink {
    pub statement_id: String,
    pub ground_id: String,
    pub role: LinkRole,
    pub provenance: Provenance,
}

/// All citation links gathered for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    pub links: Vec<SupportLink>,
}

/// Scope of supplied personal context.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContextScope {
    Global,
    Session,
    #[default]
    Unknown,
}

impl ContextScope {
    pub fn parse(value: &str) -> ContextScope {
        match value {
            "global" => ContextScope::Global,
            "session" => ContextScope::Session,
            _ => ContextScope::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextScope::Global => "global",
            ContextScope::Session => "session",
            ContextScope::Unknown => "unknown",
        }
    }
}

/// Origin of supplied personal context.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContextSource {
    User,
    System,
    Memory,
    #[default]
    Unknown,
}

impl ContextSource {
    pub fn parse(value: &str) -> ContextSource {
        match value {
            "user" => ContextSource::User,
            "system" => ContextSource::System,
            "memory" => ContextSource::Memory,
            _ => ContextSource::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextSource::User => "user",
            ContextSource::System => "system",
            ContextSource::Memory => "memory",
            ContextSource::Unknown => "unknown",
        }
    }
}

/// Non-epistemic personalization context.
///
/// Audited on the judgment and nothing more. None of the detection,
/// matching, licensing, or axiom signatures accept this type, which keeps
/// the exclusion structural rather than conventional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalContext {
    pub text: String,
    pub scope: ContextScope,
    pub source: ContextSource,
}

impl PersonalContext {
    pub fn new(text: impl Into<String>, scope: ContextScope, source: ContextSource) -> Self {
        Self {
            text: text.into(),
            scope,
            source,
        }
    }
}

/// Internal per-statement evaluation status, produced by the axiom check
/// and folded by the aggregator. The public judgment status is a mapped
/// subset of this enum; see the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStatus {
    /// Structurally sound. Not produced by the current pipeline; mapped
    /// to `Underdetermined` at the public boundary.
    WellFormed,
    /// Structurally broken statement (reserved).
    IllFormed,
    /// Claim lacks the grounding it needs.
    Unsupported,
    /// The validator has no basis to judge.
    Underdetermined,
    /// Admissible while its declared conditions hold.
    ConditionallyAcceptable,
    /// A normative axiom is violated.
    ViolatesNorm,
    /// Admissible.
    Acceptable,
    /// Nothing normative to evaluate.
    NoNormativeContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground(id: &str, scope: Scope, confidence: f64) -> Ground {
        Ground::new(id.to_string(), Source::Observed, Status::Confirmed, confidence, scope, None)
            .unwrap()
    }

    #[test]
    fn test_strength_derivation() {
        assert_eq!(Strength::from_confidence(1.0), Strength::Strong);
        assert_eq!(Strength::from_confidence(0.8), Strength::Strong);
        assert_eq!(Strength::from_confidence(0.79), Strength::Weak);
        assert_eq!(Strength::from_confidence(0.0), Strength::Weak);
    }

    #[test]
    fn test_strength_ordering() {
        assert!(Strength::None < Strength::Weak);
        assert!(Strength::Weak < Strength::Strong);
    }

    #[test]
    fn test_ground_rejects_out_of_range_confidence() {
        let result = Ground::new(
            "g1".to_string(),
            Source::Observed,
            Status::Confirmed,
            1.5,
            Scope::Factual,
            None,
        );
        assert_eq!(result, Err(GroundError::InvalidConfidence(1.5)));
    }

    #[test]
    fn test_scope_strength_takes_maximum() {
        let set = GroundSet {
            grounds: vec![
                ground("weak", Scope::Factual, 0.5),
                ground("strong", Scope::Factual, 0.95),
            ],
        };
        assert_eq!(set.scope_strength(Scope::Factual), Strength::Strong);
        assert_eq!(set.scope_strength(Scope::Contextual), Strength::None);
    }

    #[test]
    fn test_resolve_prefers_canonical_id() {
        let mut by_semantic = ground("node_a", Scope::Factual, 1.0);
        by_semantic.semantic_id = Some("shared".to_string());
        let canonical = ground("shared", Scope::Contextual, 1.0);
        let set = GroundSet {
            grounds: vec![by_semantic, canonical],
        };

        let resolved = set.resolve("shared").unwrap();
        assert_eq!(resolved.id, "shared");
        assert_eq!(resolved.scope, Scope::Contextual);
    }

    #[test]
    fn test_resolve_falls_back_to_semantic_id() {
        let mut g = ground("tool_get_weather_abc123", Scope::Factual, 1.0);
        g.semantic_id = Some("weather_nyc".to_string());
        let set = GroundSet { grounds: vec![g] };

        assert!(set.resolve("weather_nyc").is_some());
        assert!(set.resolve("missing").is_none());
    }

    #[test]
    fn test_license_permits() {
        let mut permitted = BTreeSet::new();
        permitted.insert(Modality::Conditional);
        permitted.insert(Modality::Refusal);
        let license = License {
            permitted_modalities: permitted,
        };

        assert!(license.permits(Modality::Conditional));
        assert!(!license.permits(Modality::Assertive));
    }

    #[test]
    fn test_context_parse_normalizes_unknown_values() {
        assert_eq!(ContextScope::parse("session"), ContextScope::Session);
        assert_eq!(ContextScope::parse("galaxy"), ContextScope::Unknown);
        assert_eq!(ContextSource::parse("memory"), ContextSource::Memory);
        assert_eq!(ContextSource::parse(""), ContextSource::Unknown);
    }
}
