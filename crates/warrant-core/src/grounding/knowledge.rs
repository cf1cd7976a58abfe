//! Knowledge building: tool observations become grounds.
//!
//! Every epistemic tool result in the trajectory turns into one or more
//! grounds with stable ids. Results whose payload carries entity identity
//! (`*_key` / `*_id` fields) also get a semantic id so utterances can cite
//! the entity rather than the observation.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};
use tracing::debug;

use crate::grounding::citations::GroundRecord;
use crate::types::{Ground, Scope, Source, Status, Strength};

/// Confidence assigned to structured (JSON object/array) tool payloads.
const STRUCTURED_CONFIDENCE: f64 = 1.0;
/// Confidence assigned to plain-text tool payloads.
const PLAIN_TEXT_CONFIDENCE: f64 = 0.9;

/// One tool invocation result observed in the trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolObservation {
    pub tool_name: String,
    pub tool_call_id: Option<String>,
    pub arguments: Map<String, Value>,
    pub result_text: String,
}

/// Builds the knowledge state for one evaluation.
pub struct KnowledgeBuilder;

impl KnowledgeBuilder {
    pub fn build(&self, observations: &[ToolObservation]) -> Vec<Ground> {
        let (grounds, _) = self.build_with_references(observations);
        grounds
    }

    /// Build grounds plus a map from tool call id to the ids that call
    /// produced (semantic id when present, ground id otherwise). The map
    /// lets utterances cite `[@<tool_call_id>]`.
    pub fn build_with_references(
        &self,
        observations: &[ToolObservation],
    ) -> (Vec<Ground>, BTreeMap<String, Vec<String>>) {
        let mut grounds = Vec::new();
        let mut refs: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for observation in observations {
            let Some(produced) = self.observation_to_grounds(observation) else {
                continue;
            };
            let ids: Vec<String> = produced
                .iter()
                .map(|g| g.semantic_id.clone().unwrap_or_else(|| g.id.clone()))
                .collect();
            if let Some(call_id) = &observation.tool_call_id {
                if !ids.is_empty() {
                    refs.insert(call_id.clone(), ids);
                }
            }
            grounds.extend(produced);
        }
        (grounds, refs)
    }

    /// Materialize declared ground records as grounds. Tool-sourced
    /// knowledge wins: records whose id collides with an existing ground
    /// id or semantic id are skipped.
    pub fn materialize_external_grounds(
        &self,
        grounds: &[Ground],
        records: &[GroundRecord],
    ) -> Vec<Ground> {
        if records.is_empty() {
            return grounds.to_vec();
        }
        let existing_ids: HashSet<&str> = grounds.iter().map(|g| g.id.as_str()).collect();
        let existing_semantic_ids: HashSet<&str> = grounds
            .iter()
            .filter_map(|g| g.semantic_id.as_deref())
            .collect();

        let mut expanded = grounds.to_vec();
        for record in records {
            if existing_ids.contains(record.ground_id.as_str())
                || existing_semantic_ids.contains(record.ground_id.as_str())
            {
                continue;
            }
            expanded.push(observed_ground(
                record.ground_id.clone(),
                STRUCTURED_CONFIDENCE,
                Some(record.ground_id.clone()),
            ));
        }
        expanded
    }

    fn observation_to_grounds(&self, observation: &ToolObservation) -> Option<Vec<Ground>> {
        let tool_name = if observation.tool_name.is_empty() {
            "unknown"
        } else {
            &observation.tool_name
        };
        if is_non_epistemic_tool(tool_name) {
            debug!(tool = tool_name, "skipping non-epistemic tool result");
            return None;
        }

        let payload = parse_payload(&observation.result_text);
        let confidence = match payload {
            Some(_) => STRUCTURED_CONFIDENCE,
            None => PLAIN_TEXT_CONFIDENCE,
        };

        if let Some(Value::Array(items)) = &payload {
            let ids: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_object().and_then(extract_entity_id))
                .collect();
            if !ids.is_empty() {
                let mut out = Vec::new();
                for (idx, sid) in ids.into_iter().enumerate() {
                    let stable = stable_id_fragment(&format!("{tool_name}:{sid}"));
                    out.push(observed_ground(
                        format!("tool_{tool_name}_item{idx}_{stable}"),
                        confidence,
                        Some(sid),
                    ));
                }
                return Some(out);
            }
        }

        let semantic_id = match &payload {
            Some(Value::Object(map)) => extract_entity_id(map),
            _ => None,
        };
        let stable = stable_id_fragment(&format!(
            "{}:{}:{}",
            tool_name,
            observation.result_text,
            observation.tool_call_id.clone().unwrap_or_default()
        ));
        Some(vec![observed_ground(
            format!("tool_{tool_name}_{stable}"),
            confidence,
            semantic_id,
        )])
    }
}

/// Observed, confirmed, factual ground with derived strength.
fn observed_ground(id: String, confidence: f64, semantic_id: Option<String>) -> Ground {
    Ground {
        id,
        source: Source::Observed,
        status: Status::Confirmed,
        confidence,
        scope: Scope::Factual,
        strength: Strength::from_confidence(confidence),
        semantic_id,
    }
}

/// Tools that touch personalization, memory, or preference state are
/// non-epistemic: their results say something about the user's context
/// machinery, not about the world, so they never ground claims.
fn is_non_epistemic_tool(tool_name: &str) -> bool {
    let name = tool_name.to_lowercase();
    if name == "get_user_cognitive_context" {
        return true;
    }
    if name.contains("personalization") || name.contains("personal_context") {
        return true;
    }
    if name.contains("memory")
        && ["save", "note", "notes", "load", "consolidat", "distill", "state"]
            .iter()
            .any(|k| name.contains(k))
    {
        return true;
    }
    if name.contains("profile")
        && ["save", "set", "update", "load", "consolidat"]
            .iter()
            .any(|k| name.contains(k))
    {
        return true;
    }
    ["remember", "preference", "preferences", "setting", "settings"]
        .iter()
        .any(|k| name.contains(k))
}

/// Parse a tool payload, keeping only structured (object/array) values.
fn parse_payload(result_text: &str) -> Option<Value> {
    if result_text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(result_text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

/// Extract a domain-level entity id from a payload object: the first
/// `*_key` field with a string value, else the first `*_id` field, as
/// `{prefix}_{value}`. Field iteration is sorted-key order.
fn extract_entity_id(map: &Map<String, Value>) -> Option<String> {
    for (field, value) in map {
        if let Some(prefix) = field.strip_suffix("_key") {
            if let Some(v) = value.as_str() {
                return Some(format!("{prefix}_{v}"));
            }
        }
    }
    for (field, value) in map {
        if let Some(prefix) = field.strip_suffix("_id") {
            if let Some(v) = value.as_str() {
                return Some(format!("{prefix}_{v}"));
            }
        }
    }
    None
}

/// Short stable id fragment: FNV-1a over the input, first 10 hex chars.
fn stable_id_fragment(value: &str) -> String {
    let mut hash: u64 = 1469598103934665603;
    for b in value.as_bytes() {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    let hex = format!("{hash:016x}");
    hex[..10].to_string()
}
