//! Declared grounds and citation links.
//!
//! A request may declare grounds in three shapes: native ground records,
//! OpenAI-style annotations, or bare legacy items carrying `file_id`/`url`.
//! The shape is classified exactly once here; downstream code only ever
//! sees `GroundRecord`s. Utterances cite grounds with `[@key]` markers.

use std::collections::{BTreeMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use crate::types::{CreatorType, EvidenceType, LinkRole, LinkSet, Provenance, SupportLink};

lazy_static! {
    /// A citation marker: `[@key]` with an alphabetic first character.
    static ref CITATION_MARKER: Regex =
        Regex::new(r"\[@([A-Za-z][A-Za-z0-9_-]*)\]").unwrap();
}

/// A declared ground reference, normalized from the request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundRecord {
    /// Key the utterance cites this ground by.
    pub citation_key: String,
    /// Identity of the ground being cited.
    pub ground_id: String,
    pub role: LinkRole,
    pub creator: CreatorType,
    pub evidence_type: EvidenceType,
    pub evidence_content: Option<String>,
    pub signature: Option<String>,
}

/// The classified shape of a request's `grounds` array.
///
/// Classification happens once at the boundary; nothing downstream
/// re-sniffs payload shapes. Precedence: native records win over
/// annotations, annotations over legacy items.
#[derive(Debug, Clone, PartialEq)]
pub enum GroundsPayload {
    /// No grounds were declared.
    Empty,
    /// Native ground records with explicit citation keys.
    Native(Vec<GroundRecord>),
    /// OpenAI-style annotations with a recognized `type` discriminator.
    Annotations(Vec<GroundRecord>),
    /// Untyped items carrying `file_id` or `url`.
    Legacy(Vec<GroundRecord>),
    /// Items were present but none parsed; evaluated as no grounds.
    Unrecognized,
}

impl GroundsPayload {
    pub fn classify(payload: &[Value]) -> GroundsPayload {
        if payload.is_empty() {
            return GroundsPayload::Empty;
        }

        let native = native_records(payload);
        if !native.is_empty() {
            return GroundsPayload::Native(native);
        }

        let (records, saw_typed) = annotation_scan(payload);
        if !records.is_empty() {
            return if saw_typed {
                GroundsPayload::Annotations(records)
            } else {
                GroundsPayload::Legacy(records)
            };
        }

        warn!(
            items = payload.len(),
            "grounds payload not recognized; evaluating without declared grounds"
        );
        GroundsPayload::Unrecognized
    }

    pub fn into_records(self) -> Vec<GroundRecord> {
        match self {
            GroundsPayload::Native(records)
            | GroundsPayload::Annotations(records)
            | GroundsPayload::Legacy(records) => records,
            GroundsPayload::Empty | GroundsPayload::Unrecognized => Vec::new(),
        }
    }
}

/// Parse native ground records. Lenient per item: anything without both
/// string `citation_key` and `ground_id` is skipped.
fn native_records(payload: &[Value]) -> Vec<GroundRecord> {
    let mut records = Vec::new();
    for item in payload {
        let Some(obj) = item.as_object() else {
            continue;
        };
        let Some(citation_key) = obj.get("citation_key").and_then(Value::as_str) else {
            continue;
        };
        let Some(ground_id) = obj.get("ground_id").and_then(Value::as_str) else {
            continue;
        };
        records.push(GroundRecord {
            citation_key: citation_key.to_string(),
            ground_id: ground_id.to_string(),
            role: LinkRole::Supports,
            creator: CreatorType::UpstreamPipeline,
            evidence_type: EvidenceType::Observation,
            evidence_content: obj
                .get("evidence_content")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            signature: obj
                .get("signature")
                .and_then(Value::as_str)
                .map(ToString::to_string),
        });
    }
    records
}

/// Parse annotation-shaped items into ground records.
pub fn annotation_records(payload: &[Value]) -> Vec<GroundRecord> {
    annotation_scan(payload).0
}

fn annotation_scan(payload: &[Value]) -> (Vec<GroundRecord>, bool) {
    let mut records = Vec::new();
    let mut saw_typed = false;
    for item in payload {
        let Some(obj) = item.as_object() else {
            continue;
        };
        let (id, typed) = annotation_id(obj);
        saw_typed = saw_typed || typed;
        let Some(id) = id else {
            continue;
        };
        records.push(GroundRecord {
            citation_key: id.clone(),
            ground_id: id,
            role: LinkRole::Supports,
            creator: CreatorType::UpstreamPipeline,
            evidence_type: EvidenceType::Observation,
            evidence_content: Some("openai_citation".to_string()),
            signature: None,
        });
    }
    (records, saw_typed)
}

fn annotation_id(obj: &Map<String, Value>) -> (Option<String>, bool) {
    match obj.get("type").and_then(Value::as_str) {
        Some("file_citation") | Some("container_file_citation") | Some("file_path") => (
            obj.get("file_id")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            true,
        ),
        Some("url_citation") => (
            obj.get("url")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            true,
        ),
        // No recognized discriminator: legacy items identified by their
        // file or url field alone.
        _ => (
            obj.get("file_id")
                .and_then(Value::as_str)
                .or_else(|| obj.get("url").and_then(Value::as_str))
                .map(ToString::to_string),
            false,
        ),
    }
}

/// Extract citation keys from an utterance, first appearance order,
/// duplicates removed.
pub fn extract_citation_keys(text: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut seen = HashSet::new();
    for capture in CITATION_MARKER.captures_iter(text) {
        let key = &capture[1];
        if seen.insert(key.to_string()) {
            keys.push(key.to_string());
        }
    }
    keys
}

/// Build support links for every ground record the utterance cites.
pub fn build_links(text: &str, records: &[GroundRecord], statement_id: &str) -> LinkSet {
    let mut by_key: BTreeMap<&str, Vec<&GroundRecord>> = BTreeMap::new();
    for record in records {
        by_key
            .entry(record.citation_key.as_str())
            .or_default()
            .push(record);
    }

    let mut links = Vec::new();
    for key in extract_citation_keys(text) {
        if let Some(list) = by_key.get(key.as_str()) {
            for record in list {
                links.push(SupportLink {
                    statement_id: statement_id.to_string(),
                    ground_id: record.ground_id.clone(),
                    role: record.role,
                    provenance: Provenance {
                        creator: record.creator,
                        evidence_type: record.evidence_type,
                        evidence_content: Some(
                            record
                                .evidence_content
                                .clone()
                                .unwrap_or_else(|| format!("citation_key={key}")),
                        ),
                        signature: record.signature.clone(),
                    },
                });
            }
        }
    }

    LinkSet { links }
}

/// Ground records that let an utterance cite tool calls by call id.
pub fn records_from_tool_call_refs(
    tool_call_refs: &BTreeMap<String, Vec<String>>,
) -> Vec<GroundRecord> {
    let mut out = Vec::new();
    for (citation_key, ground_ids) in tool_call_refs {
        for ground_id in ground_ids {
            out.push(GroundRecord {
                citation_key: citation_key.clone(),
                ground_id: ground_id.clone(),
                role: LinkRole::Supports,
                creator: CreatorType::ToolObserver,
                evidence_type: EvidenceType::Observation,
                evidence_content: Some(format!("tool_call_id={citation_key}")),
                signature: None,
            });
        }
    }
    out
}
