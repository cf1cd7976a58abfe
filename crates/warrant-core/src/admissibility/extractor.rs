//! Statement extraction from agent output.
//!
//! The extractor separates protocol speech (greetings, capability offers,
//! continuation invites) from normative participation. It returns zero
//! statements for protocol-only output and exactly one statement
//! otherwise; downstream stages fold over the list, so multi-statement
//! segmentation can land without signature changes.
//!
//! Everything here is boundary detection over lowercased text, not
//! semantic classification. Modality is assigned later by the detector.

use tracing::debug;

use crate::types::Statement;

/// Normative indicators that gate extraction. Output containing none of
/// these is protocol-only. Refusal markers count as indicators so an
/// explicit refusal is never mistaken for filler.
const NORMATIVE_GATE_MARKERS: &[&str] = &[
    "should",
    "must",
    "recommend",
    "prioritize",
    "block",
    "depends on",
    "is blocked",
    "is better",
    "better for you",
    "if ",
    "for you",
    "given your",
    "based on your",
    "i would not",
    "i won't",
    "cannot determine",
    "can't determine",
    "unable to determine",
    "not enough info",
    "not enough context",
    "need more",
    "require more",
    "need additional",
    "require additional",
];

/// Help-offer tails. Truncation happens at the rightmost occurrence, so
/// these must only appear where an offer genuinely starts.
const HELP_OFFER_MARKERS: &[&str] = &[
    "i can help",
    "i can assist",
    "i can pull",
    "i can check",
    "i can find",
    "let me know if",
    "feel free to ask",
];

/// Keywords that mark a trailing question as a continuation invite.
const OFFER_QUESTION_KEYWORDS: &[&str] = &["help", "assist", "can i", "would you like"];

/// Keywords that mark a trailing parenthetical as a capability list.
const CAPABILITY_KEYWORDS: &[&str] = &[
    "e.g.",
    "for example",
    "such as",
    "find",
    "check",
    "status",
    "comment",
    "assign",
    "move",
    "create",
    "pull",
    "help",
    "assist",
    "transition",
    "workflow",
];

/// Sentence-level content strong enough to survive the protocol filter on
/// its own. Includes refusal markers: "i can" is also a substring of
/// "i cannot", and a refusal must not read as a capability offer.
const STRONG_NORMATIVE_MARKERS: &[&str] = &[
    "should",
    "must",
    "recommend",
    "prioritize",
    "blocks",
    "depends on",
    "if ",
    "cannot determine",
    "can't determine",
    "unable to determine",
    "not enough info",
    "not enough context",
    "need more",
    "require more",
    "need additional",
    "require additional",
];

/// Weaker markers: enough to keep a sentence, not enough to rescue one
/// that already looks like protocol speech.
const WEAK_NORMATIVE_MARKERS: &[&str] = &[
    "is blocked",
    "for you",
    "given your",
    "based on your",
    "i would not",
];

/// Phrases typical of protocol sentences (self-referential offers).
const PROTOCOL_SENTENCE_MARKERS: &[&str] = &[
    "i can",
    "how can i",
    "what can i",
    "thanks for",
    "let me know",
    "feel free",
    "hope you",
];

/// Greeting prefixes stripped once from the front of the cleaned text.
const GREETING_PREFIXES: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
    "thanks for asking",
    "i'm doing well",
    "i am doing well",
    "i'm ready",
    "i am ready",
    "i'm here",
    "i am here",
    "hope you're doing well",
    "hope you are doing well",
];

/// Extracts the normatively relevant statement from agent output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatementExtractor;

impl StatementExtractor {
    /// Extract zero or one statement from agent output text.
    pub fn extract(&self, text: &str) -> Vec<Statement> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let cleaned = self.strip_protocol(text);
        if cleaned.trim().is_empty() {
            debug!("no normative content after protocol stripping");
            return Vec::new();
        }
        vec![Statement {
            id: "final_response".to_string(),
            subject: "agent".to_string(),
            predicate: "participation".to_string(),
            raw_text: cleaned,
            modality: None,
            conditions: Vec::new(),
        }]
    }

    fn strip_protocol(&self, text: &str) -> String {
        let mut cleaned = text.trim().to_string();

        if !contains_any(&cleaned.to_lowercase(), NORMATIVE_GATE_MARKERS) {
            return String::new();
        }

        cleaned = self.strip_suffix_tails(&cleaned);
        cleaned = self.strip_protocol_sentences(&cleaned);
        cleaned = strip_greeting_prefix(&cleaned);

        // Questions without any remaining indicator are continuation
        // invites, not participation.
        if cleaned.trim_end().ends_with('?')
            && !contains_any(&cleaned.to_lowercase(), NORMATIVE_GATE_MARKERS)
        {
            return String::new();
        }
        cleaned.trim().to_string()
    }

    /// Strip protocol tails. Tail rules only ever cut from the end; a
    /// mid-text help offer followed by normative content is left for the
    /// sentence filter. Capped passes cover cascaded tails.
    fn strip_suffix_tails(&self, text: &str) -> String {
        let mut out = text.trim().to_string();
        for _ in 0..5 {
            let before = out.len();
            out = strip_capability_parenthetical(&out);
            out = strip_help_offer_tail(&out);
            out = strip_offer_question_tail(&out);
            if out.len() == before {
                break;
            }
        }
        out
    }

    /// Walk sentences from the start, dropping protocol speech until the
    /// first normative sentence; keep that sentence and everything after.
    fn strip_protocol_sentences(&self, text: &str) -> String {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return text.to_string();
        }
        let mut kept = Vec::new();
        for (idx, sentence) in sentences.iter().enumerate() {
            let lower = sentence.to_lowercase();
            let strong = has_strong_normative(&lower);
            let any = strong || contains_any(&lower, WEAK_NORMATIVE_MARKERS);
            let looks_protocol = contains_any(&lower, PROTOCOL_SENTENCE_MARKERS)
                || (lower.trim().ends_with('?') && !any);

            if looks_protocol && !strong {
                continue;
            }
            if any {
                kept.extend(sentences[idx..].iter().cloned());
                break;
            }
            // Neither clearly protocol nor clearly normative: keep it.
            kept.push(sentence.clone());
        }
        kept.join(" ").trim().to_string()
    }
}

fn has_strong_normative(lower: &str) -> bool {
    contains_any(lower, STRONG_NORMATIVE_MARKERS)
}

fn strip_capability_parenthetical(text: &str) -> String {
    let trimmed = text.trim_end();
    if !trimmed.ends_with(')') {
        return text.to_string();
    }
    let Some(open) = trimmed.rfind('(') else {
        return text.to_string();
    };
    let inner = trimmed[open + 1..trimmed.len() - 1].to_lowercase();
    if contains_any(&inner, CAPABILITY_KEYWORDS) {
        trimmed[..open].trim_end().to_string()
    } else {
        text.to_string()
    }
}

fn strip_help_offer_tail(text: &str) -> String {
    let lower = text.to_lowercase();
    for marker in HELP_OFFER_MARKERS {
        if let Some(idx) = lower.rfind(marker) {
            if text.is_char_boundary(idx) {
                return text[..idx]
                    .trim()
                    .trim_end_matches(['.', ',', ';'])
                    .to_string();
            }
        }
    }
    text.to_string()
}

fn strip_offer_question_tail(text: &str) -> String {
    let trimmed = text.trim_end();
    if !trimmed.ends_with('?') {
        return text.to_string();
    }
    let body = &trimmed[..trimmed.len() - 1];
    let start = body.rfind(['.', '!', '?']).map(|i| i + 1).unwrap_or(0);
    if contains_any(&body[start..].to_lowercase(), OFFER_QUESTION_KEYWORDS) {
        body[..start].trim_end().to_string()
    } else {
        text.to_string()
    }
}

fn strip_greeting_prefix(text: &str) -> String {
    let lowered = text.to_lowercase();
    for prefix in GREETING_PREFIXES {
        if lowered.starts_with(prefix) && text.is_char_boundary(prefix.len()) {
            return text[prefix.len()..]
                .trim_start_matches(|c: char| c.is_whitespace() || ",.!-—".contains(c))
                .to_string();
        }
    }
    text.to_string()
}

/// Split on `.` `!` `?`, keeping the terminator with its sentence and any
/// non-empty unterminated tail.
fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    for c in text.chars() {
        buf.push(c);
        if matches!(c, '.' | '!' | '?') {
            let trimmed = buf.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
            buf.clear();
        }
    }
    let tail = buf.trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }
    out
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}
