//! Shared detection patterns for modality classification.
//!
//! This module contains the regex tables used by the modality detector to
//! classify speech acts and to extract declared conditions from utterance
//! text.
//!
//! ## SOLID Rationale
//!
//! Pattern tables are separate from the classification ladder:
//! - **DRY**: Single source of truth for each modality class
//! - **OCP**: Extend a class by adding a pattern, without touching detector logic
//! - **SRP**: Pattern definition is separate from pattern usage

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // =========================================================================
    // REFUSAL PATTERNS
    // =========================================================================

    /// Markers of an explicit refusal or an admission of insufficient
    /// knowledge. Checked before every other class.
    pub static ref REFUSAL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)cannot\s+(?:determine|decide|choose)").unwrap(),
        Regex::new(r"(?i)(?:need|require)\s+(?:more|additional)").unwrap(),
        Regex::new(r"(?i)insufficient").unwrap(),
        Regex::new(r"(?i)please\s+(?:provide|clarify|check)").unwrap(),
        Regex::new(r"(?i)i\s+don'?t\s+(?:know|have)").unwrap(),
        Regex::new(r"(?i)hard\s+to\s+(?:say|determine)").unwrap(),
        Regex::new(r"(?i)^i\s+(?:would|will)\s+not\s+\w+").unwrap(),
        Regex::new(r"(?i)^i\s+(?:wouldn't|won't)\s+\w+").unwrap(),
    ];

    // =========================================================================
    // CONDITIONAL PATTERNS
    // =========================================================================

    /// Goal-scoped openings ("If your goal is throughput, ..."). Anchored to
    /// the start of the core assertion so a mid-sentence aside does not make
    /// a recommendation look conditional.
    pub static ref GOAL_CONDITIONAL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)^if\s+(?:your\s+)?goal\s+is").unwrap(),
        Regex::new(r"(?i)^if\s+you\s+(?:want|care|optimize|aim)").unwrap(),
        Regex::new(r"(?i)^assuming\s+you\s+(?:want|care|optimize|aim)").unwrap(),
        Regex::new(r"(?i)^if\s+you'?re\s+(?:optimizing|aiming|trying)").unwrap(),
    ];

    /// Personalization markers. Tailoring advice to the user presupposes
    /// knowledge of the user, so these force the conditional reading.
    pub static ref PERSONALIZATION_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bfor\s+you\b").unwrap(),
        Regex::new(r"(?i)\bgiven\s+your\b").unwrap(),
        Regex::new(r"(?i)\bbased\s+on\s+your\b").unwrap(),
        Regex::new(r"(?i)\baccording\s+to\s+your\b").unwrap(),
        Regex::new(r"(?i)\bwith\s+your\s+(?:preferences|constraints)\b").unwrap(),
    ];

    /// General conditional markers, checked after the recommendation class.
    pub static ref CONDITIONAL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(?:if|unless|assuming|given\s+that|provided)\s+").unwrap(),
        Regex::new(r"(?i)depends\s+on").unwrap(),
        Regex::new(r"(?i)(?:would|could|might)\s+\w+\s+(?:if|when|unless)").unwrap(),
    ];

    // =========================================================================
    // ASSERTIVE (RECOMMENDATION) PATTERNS
    // =========================================================================

    /// Direct recommendation forms. Deliberately narrow: a bare "should"
    /// stays out of this class so "if X, we should Y" can still read as
    /// conditional.
    pub static ref RECOMMENDATION_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(?:is|are)\s+(?:the\s+)?better\b").unwrap(),
        Regex::new(r"(?i)\bshould\s+(?:be\s+)?(?:prioritiz|focus|pick|choose)").unwrap(),
        Regex::new(r"(?i)\brecommend\s+\w+").unwrap(),
        Regex::new(r"(?i)\bsuggest\s+(?:you\s+)?(?:pick|choose|start)").unwrap(),
        Regex::new(r"(?i)\bbest\s+(?:place|choice|option)").unwrap(),
        Regex::new(r"(?i)\bprioritize\s+(?:the\s+)?\w+").unwrap(),
        Regex::new(r"(?i)\b(?:finish|complete)\s+\w+\s+first\b").unwrap(),
    ];

    // =========================================================================
    // DESCRIPTIVE / NORMATIVE PATTERNS
    // =========================================================================

    /// Statements of observable fact (statuses, dependencies, dates).
    pub static ref DESCRIPTIVE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bblocks?\b").unwrap(),
        Regex::new(r"(?i)\bis\s+blocked\s+by\b").unwrap(),
        Regex::new(r"(?i)\bdepends?\s+on\b").unwrap(),
        Regex::new(r"(?i)\bhas\s+status\b").unwrap(),
        Regex::new(r"(?i)\bis\s+(?:in\s+progress|blocked|done|to\s+do)").unwrap(),
        Regex::new(r"(?i)\bdue\s+date\s+is\b").unwrap(),
    ];

    /// Normative vocabulary. A descriptive reading is only available when
    /// none of these appear.
    pub static ref NORMATIVE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bshould\b").unwrap(),
        Regex::new(r"(?i)\bmust\b").unwrap(),
        Regex::new(r"(?i)\bneeds?\s+to\b").unwrap(),
        Regex::new(r"(?i)\brecommend").unwrap(),
        Regex::new(r"(?i)\bsuggest").unwrap(),
        Regex::new(r"(?i)\badvise").unwrap(),
    ];

    // =========================================================================
    // STRUCTURAL PATTERNS
    // =========================================================================

    /// First sentence of a paragraph, including its terminating period.
    pub static ref FIRST_SENTENCE: Regex = Regex::new(r"(?s)^(.+?\.)\s").unwrap();

    /// `if <condition>,` clauses.
    pub static ref IF_CONDITION: Regex = Regex::new(r"(?i)\bif\s+([^,]+)").unwrap();

    /// `unless <condition>,` clauses (negated on extraction).
    pub static ref UNLESS_CONDITION: Regex = Regex::new(r"(?i)\bunless\s+([^,]+)").unwrap();

    /// `assuming <condition>` / `given that <condition>` clauses.
    pub static ref ASSUMING_CONDITION: Regex =
        Regex::new(r"(?i)\b(?:assuming|given\s+that)\s+([^,]+)").unwrap();

    /// `given your <context>` fragments.
    pub static ref GIVEN_YOUR_CONDITION: Regex =
        Regex::new(r"(?i)\bgiven\s+your\s+([^,.;]+)").unwrap();

    /// `based on your <context>` fragments.
    pub static ref BASED_ON_YOUR_CONDITION: Regex =
        Regex::new(r"(?i)\bbased\s+on\s+your\s+([^,.;]+)").unwrap();

    /// Bare personalization marker with no named context.
    pub static ref FOR_YOU_MARKER: Regex = Regex::new(r"(?i)\bfor\s+you\b").unwrap();
}

/// Check if text matches any refusal pattern.
pub fn matches_refusal(text: &str) -> bool {
    REFUSAL_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Check if text opens with a goal-scoped conditional.
pub fn matches_goal_conditional(text: &str) -> bool {
    GOAL_CONDITIONAL_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Check if text carries a personalization marker.
pub fn matches_personalization(text: &str) -> bool {
    PERSONALIZATION_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Check if text matches any direct recommendation form.
pub fn matches_recommendation(text: &str) -> bool {
    RECOMMENDATION_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Check if text matches any general conditional marker.
pub fn matches_conditional(text: &str) -> bool {
    CONDITIONAL_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Check if text matches any descriptive pattern.
pub fn matches_descriptive(text: &str) -> bool {
    DESCRIPTIVE_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Check if text carries normative vocabulary.
pub fn matches_normative(text: &str) -> bool {
    NORMATIVE_PATTERNS.iter().any(|p| p.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_detection() {
        assert!(matches_refusal("I cannot determine which task matters more"));
        assert!(matches_refusal("I need more information about the deadline"));
        assert!(matches_refusal("there is insufficient context"));
        assert!(matches_refusal("i don't know the current sprint"));
        assert!(matches_refusal("i won't speculate about that"));
        assert!(!matches_refusal("AGENT-5 blocks AGENT-9"));
    }

    #[test]
    fn test_anchored_refusal_requires_line_start() {
        assert!(matches_refusal("i would not guess here"));
        // "i would not" buried mid-text is not an anchored refusal, but the
        // unanchored markers still fire when present.
        assert!(!matches_refusal("they said i would not be needed"));
    }

    #[test]
    fn test_goal_conditional_is_anchored() {
        assert!(matches_goal_conditional("if your goal is speed, ship daily"));
        assert!(matches_goal_conditional("if you want fewer bugs, add tests"));
        assert!(matches_goal_conditional("assuming you care about latency, batch writes"));
        assert!(!matches_goal_conditional("ship daily if you want speed"));
    }

    #[test]
    fn test_personalization_markers() {
        assert!(matches_personalization("the evening slot works best for you"));
        assert!(matches_personalization("given your timezone, start at 9am"));
        assert!(matches_personalization("based on your history, pick the blue plan"));
        assert!(!matches_personalization("the team picked the blue plan"));
    }

    #[test]
    fn test_recommendation_is_narrow() {
        assert!(matches_recommendation("option a is better"));
        assert!(matches_recommendation("you should prioritize the login fix"));
        assert!(matches_recommendation("i recommend starting with AGENT-5"));
        assert!(matches_recommendation("finish AGENT-5 first"));
        // A bare "should" is normative vocabulary, not a recommendation form.
        assert!(!matches_recommendation("we should talk to the team"));
        assert!(matches_normative("we should talk to the team"));
    }

    #[test]
    fn test_conditional_markers() {
        assert!(matches_conditional("if the deadline moves, we should reorder"));
        assert!(matches_conditional("it depends on the sprint goal"));
        assert!(matches_conditional("this could break if the cache is cold"));
        assert!(!matches_conditional("AGENT-5 has status In Progress"));
    }

    #[test]
    fn test_descriptive_excludes_normative_vocabulary() {
        let text = "AGENT-5 blocks AGENT-9";
        assert!(matches_descriptive(text));
        assert!(!matches_normative(text));

        let mixed = "AGENT-5 blocks AGENT-9, so you should fix it first";
        assert!(matches_descriptive(mixed));
        assert!(matches_normative(mixed));
    }

    #[test]
    fn test_first_sentence_capture() {
        let caps = FIRST_SENTENCE.captures("first point. second point.").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "first point.");
        assert!(FIRST_SENTENCE.captures("no terminator here").is_none());
    }
}
