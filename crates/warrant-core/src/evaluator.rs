//! Evaluator orchestration: from a conversation to a judgment.
//!
//! The entry functions validate the input contract, then
//! [`AdmissibilityEvaluator`] runs the pipeline: tool results become
//! grounds, the final assistant message becomes a speech act, statements
//! are extracted and judged one by one, and the per-statement outcomes
//! fold into a single [`Judgment`].

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::admissibility::{
    AxiomChecker, GroundMatcher, LicenseDeriver, ModalityDetector, StatementExtractor,
};
use crate::aggregator::{Aggregator, Review, StatementReview};
use crate::conversation::{
    extract_text_content, extract_tool_text, parse_conversation, to_speech_act, Message, SpeechAct,
};
use crate::grounding::{
    annotation_records, build_links, records_from_tool_call_refs, GroundRecord, GroundsPayload,
    KnowledgeBuilder, ToolObservation,
};
use crate::judgment::{AdmissibilityStatus, GroundRef, Judgment, StatementEvaluation};
use crate::types::{
    ContextScope, ContextSource, EvaluationStatus, Ground, License, LinkSet, Modality,
    PersonalContext, Statement,
};
use crate::{EvaluateError, EvaluateOptions};

/// Input for one evaluation. `agent_output` and `conversation` may be
/// supplied alone or together; together they must agree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluateInput {
    pub agent_output: Option<String>,
    pub conversation: Option<Vec<Message>>,
    /// Grounds declared by the caller, already normalized to records.
    pub grounds: Option<Vec<GroundRecord>>,
    /// Non-epistemic personalization context. Audited, never judged.
    pub personal_context: Option<PersonalContext>,
}

/// Evaluate with default options.
pub fn evaluate(input: EvaluateInput) -> Result<Judgment, EvaluateError> {
    evaluate_with_options(input, EvaluateOptions::default())
}

/// Evaluate one utterance against its trajectory and declared grounds.
pub fn evaluate_with_options(
    input: EvaluateInput,
    options: EvaluateOptions,
) -> Result<Judgment, EvaluateError> {
    if input.agent_output.is_none() && input.conversation.is_none() {
        return Err(EvaluateError::MissingInput);
    }

    let (agent_message, trajectory) = if let Some(conversation) = input.conversation {
        if conversation.is_empty() {
            return Err(EvaluateError::InvalidConversation);
        }
        let last = conversation
            .last()
            .cloned()
            .ok_or(EvaluateError::InvalidConversation)?;
        if last.role != "assistant" {
            return Err(EvaluateError::LastMessageNotAssistant);
        }

        if let Some(expected) = &input.agent_output {
            let actual = extract_text_content(last.content.as_ref())?;
            if &actual != expected {
                return Err(EvaluateError::AgentOutputMismatch);
            }
        }

        (last, conversation)
    } else {
        let message = Message::assistant_text(input.agent_output.unwrap_or_default());
        (message.clone(), vec![message])
    };

    let evaluator = AdmissibilityEvaluator::with_options(options);
    evaluator.evaluate_message(
        &agent_message,
        &trajectory,
        input.grounds.unwrap_or_default(),
        input.personal_context.as_ref(),
    )
}

/// Evaluate a JSON request payload with default options.
pub fn evaluate_from_json(input: &str) -> Result<Judgment, EvaluateError> {
    evaluate_from_json_with_options(input, EvaluateOptions::default())
}

/// Evaluate a JSON request payload.
///
/// Accepts the request envelope shape: `agent_output`, `conversation`,
/// `grounds`, legacy `openai_citations`, and the personal-context triple.
pub fn evaluate_from_json_with_options(
    input: &str,
    options: EvaluateOptions,
) -> Result<Judgment, EvaluateError> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| EvaluateError::InvalidJson(e.to_string()))?;
    let Some(obj) = value.as_object() else {
        return Err(EvaluateError::InvalidJson(
            "payload must be object".to_string(),
        ));
    };

    let agent_output = obj
        .get("agent_output")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    let conversation = match obj.get("conversation") {
        Some(Value::Array(arr)) => Some(parse_conversation(arr)?),
        Some(Value::Null) | None => None,
        Some(_) => {
            return Err(EvaluateError::InvalidJson(
                "conversation must be an array".to_string(),
            ));
        }
    };

    let grounds = match obj.get("grounds") {
        Some(Value::Array(arr)) => Some(GroundsPayload::classify(arr).into_records()),
        Some(Value::Null) | None => None,
        Some(_) => {
            return Err(EvaluateError::InvalidJson(
                "grounds must be an array".to_string(),
            ));
        }
    };

    // Legacy spelling: bare annotation arrays under `openai_citations`.
    let grounds = match obj.get("openai_citations") {
        Some(Value::Array(arr)) => {
            let mut records = grounds.unwrap_or_default();
            records.extend(annotation_records(arr));
            Some(records)
        }
        _ => grounds,
    };

    let personal_context = obj
        .get("personal_context")
        .and_then(Value::as_str)
        .map(|text| {
            let scope = obj
                .get("personal_context_scope")
                .and_then(Value::as_str)
                .map(ContextScope::parse)
                .unwrap_or_default();
            let source = obj
                .get("personal_context_source")
                .and_then(Value::as_str)
                .map(ContextSource::parse)
                .unwrap_or_default();
            PersonalContext::new(text, scope, source)
        });

    evaluate_with_options(
        EvaluateInput {
            agent_output,
            conversation,
            grounds,
            personal_context,
        },
        options,
    )
}

/// The evaluation engine. Stateless; one instance serves any number of
/// evaluations with the same options.
pub struct AdmissibilityEvaluator {
    extractor: StatementExtractor,
    modality_detector: ModalityDetector,
    knowledge_builder: KnowledgeBuilder,
    ground_matcher: GroundMatcher,
    license_deriver: LicenseDeriver,
    axiom_checker: AxiomChecker,
    aggregator: Aggregator,
}

impl Default for AdmissibilityEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissibilityEvaluator {
    pub fn new() -> Self {
        Self::with_options(EvaluateOptions::default())
    }

    pub fn with_options(options: EvaluateOptions) -> Self {
        Self {
            extractor: StatementExtractor,
            modality_detector: ModalityDetector,
            knowledge_builder: KnowledgeBuilder,
            ground_matcher: GroundMatcher,
            license_deriver: LicenseDeriver::new(options.license_mode),
            axiom_checker: AxiomChecker,
            aggregator: Aggregator,
        }
    }

    /// Judge one assistant message in the context of its trajectory.
    pub fn evaluate_message(
        &self,
        agent_message: &Message,
        trajectory: &[Message],
        records: Vec<GroundRecord>,
        personal_context: Option<&PersonalContext>,
    ) -> Result<Judgment, EvaluateError> {
        let observations = self.extract_tool_results(trajectory)?;
        let (tool_grounds, tool_call_refs) =
            self.knowledge_builder.build_with_references(&observations);

        let speech_act = to_speech_act(agent_message)?;

        let grounds = self
            .knowledge_builder
            .materialize_external_grounds(&tool_grounds, &records);

        let mut combined = records;
        combined.extend(records_from_tool_call_refs(&tool_call_refs));

        let (statement_id, text) = match &speech_act {
            SpeechAct::Refusal(text) => ("refusal", text.clone()),
            SpeechAct::Text(text) => ("final_response", text.clone()),
        };
        let links = build_links(&text, &combined, statement_id);

        let grounds_accepted = combined
            .iter()
            .map(|record| record.ground_id.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        let grounds_cited = links
            .links
            .iter()
            .map(|link| link.ground_id.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        let mut review = match &speech_act {
            SpeechAct::Refusal(_) => {
                self.evaluate_refusal(&text, &grounds, &links, personal_context)
            }
            SpeechAct::Text(_) => self.evaluate_core(&text, &grounds, &links, personal_context),
        };
        review.grounds_accepted = grounds_accepted;
        review.grounds_cited = grounds_cited;

        Ok(self.to_judgment(review))
    }

    /// Core judgment over already-built grounds and links.
    pub(crate) fn evaluate_core(
        &self,
        agent_output: &str,
        grounds: &[Ground],
        links: &LinkSet,
        personal_context: Option<&PersonalContext>,
    ) -> Review {
        if agent_output.is_empty() {
            return Review::without_statements(
                EvaluationStatus::Underdetermined,
                "No content to validate",
                personal_context,
            );
        }

        let mut statements = self.extractor.extract(agent_output);
        if statements.is_empty() {
            return Review::without_statements(
                EvaluationStatus::NoNormativeContent,
                "Protocol-only output (greetings/offers) - no normative claims to evaluate",
                personal_context,
            );
        }
        info!(count = statements.len(), "statements extracted");

        let mut reviews = Vec::with_capacity(statements.len());
        for statement in &mut statements {
            self.modality_detector.detect_with_conditions(statement);
            let ground_set = self.ground_matcher.relevant(statement, grounds);

            // Descriptive claims are judged directly on factual grounding;
            // licensing applies to the normative modalities only.
            let license = if statement.modality == Some(Modality::Descriptive) {
                License::default()
            } else {
                self.license_deriver.derive(&ground_set, links)
            };

            let outcome = self.axiom_checker.check(statement, &license, &ground_set);
            debug!(
                modality = ?statement.modality,
                status = ?outcome.status,
                violated = ?outcome.violated_axiom,
                "statement checked"
            );
            reviews.push(StatementReview {
                statement: statement.clone(),
                status: outcome.status,
                license,
                ground_set,
                violated_axiom: outcome.violated_axiom,
                explanation: outcome.explanation,
            });
        }

        self.aggregator.aggregate(reviews, personal_context)
    }

    /// A committed refusal part bypasses extraction and is judged as a
    /// single refusal statement.
    fn evaluate_refusal(
        &self,
        refusal_text: &str,
        grounds: &[Ground],
        links: &LinkSet,
        personal_context: Option<&PersonalContext>,
    ) -> Review {
        let statement = Statement {
            id: "refusal".to_string(),
            subject: "agent".to_string(),
            predicate: "refuses".to_string(),
            raw_text: refusal_text.to_string(),
            modality: Some(Modality::Refusal),
            conditions: vec![],
        };
        let ground_set = self.ground_matcher.relevant(&statement, grounds);
        let license = self.license_deriver.derive(&ground_set, links);
        let outcome = self.axiom_checker.check(&statement, &license, &ground_set);
        let review = StatementReview {
            statement,
            status: outcome.status,
            license,
            ground_set,
            violated_axiom: outcome.violated_axiom,
            explanation: outcome.explanation,
        };
        self.aggregator.aggregate(vec![review], personal_context)
    }

    /// Pair tool result messages with the assistant tool calls that
    /// produced them. Legacy `function` role messages are accepted
    /// without call linkage.
    fn extract_tool_results(
        &self,
        trajectory: &[Message],
    ) -> Result<Vec<ToolObservation>, EvaluateError> {
        let mut calls_by_id: BTreeMap<String, (String, Map<String, Value>)> = BTreeMap::new();
        for message in trajectory {
            if message.role != "assistant" {
                continue;
            }
            for tool_call in &message.tool_calls {
                if tool_call.kind == "function" {
                    let args = parse_tool_args(tool_call.function_arguments.as_ref());
                    calls_by_id.insert(
                        tool_call.id.clone(),
                        (
                            tool_call
                                .function_name
                                .clone()
                                .unwrap_or_else(|| "unknown".to_string()),
                            args,
                        ),
                    );
                }
            }
        }

        let mut observations = Vec::new();
        for message in trajectory {
            if message.role == "tool" {
                let tool_call_id = message.tool_call_id.clone().unwrap_or_default();
                let (tool_name, arguments) = calls_by_id
                    .get(&tool_call_id)
                    .cloned()
                    .unwrap_or_else(|| ("unknown".to_string(), Map::new()));
                let result_text = extract_tool_text(message.content.as_ref())?;
                observations.push(ToolObservation {
                    tool_name,
                    tool_call_id: Some(tool_call_id),
                    arguments,
                    result_text,
                });
            } else if message.role == "function" {
                if let Some(name) = &message.function_name {
                    let result_text = extract_tool_text(message.content.as_ref())?;
                    observations.push(ToolObservation {
                        tool_name: name.clone(),
                        tool_call_id: None,
                        arguments: Map::new(),
                        result_text,
                    });
                }
            }
        }

        Ok(observations)
    }

    fn to_judgment(&self, review: Review) -> Judgment {
        let mut statement_evaluations = Vec::with_capacity(review.statement_reviews.len());
        let mut violated_axioms = Vec::new();

        for stmt in &review.statement_reviews {
            let modality = stmt
                .statement
                .modality
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let license = stmt
                .license
                .permitted_modalities
                .iter()
                .map(|m| m.as_str().to_string())
                .collect();
            let grounding_trace = stmt
                .ground_set
                .grounds
                .iter()
                .map(|ground| GroundRef {
                    id: ground.id.clone(),
                    scope: ground.scope.as_str().to_string(),
                    source: ground.source.as_str().to_string(),
                    status: ground.status.as_str().to_string(),
                    confidence: ground.confidence,
                    strength: ground.strength.as_str().to_string(),
                    semantic_id: ground.semantic_id.clone(),
                })
                .collect();

            statement_evaluations.push(StatementEvaluation {
                statement_id: stmt.statement.id.clone(),
                statement: stmt.statement.raw_text.clone(),
                modality,
                license,
                status: map_status(stmt.status),
                violated_axiom: stmt.violated_axiom.clone(),
                explanation: stmt.explanation.clone(),
                grounding_trace,
                subject: Some(stmt.statement.subject.clone()),
                predicate: Some(stmt.statement.predicate.clone()),
            });
            if let Some(axiom) = &stmt.violated_axiom {
                violated_axioms.push(axiom.clone());
            }
        }

        Judgment {
            status: map_status(review.status),
            licensed: review.licensed,
            can_retry: review.can_retry,
            statement_evaluations,
            feedback_hint: review.feedback_hint,
            violated_axioms,
            explanation: review.explanation,
            num_statements: review.num_statements,
            num_acceptable: review.num_acceptable,
            personal_context_source: review.personal_context_source,
            personal_context_scope: review.personal_context_scope,
            personal_context_present: review.personal_context_present,
            grounds_accepted: review.grounds_accepted,
            grounds_cited: review.grounds_cited,
        }
    }
}

fn map_status(status: EvaluationStatus) -> AdmissibilityStatus {
    match status {
        EvaluationStatus::Acceptable => AdmissibilityStatus::Acceptable,
        EvaluationStatus::ConditionallyAcceptable => AdmissibilityStatus::ConditionallyAcceptable,
        EvaluationStatus::ViolatesNorm => AdmissibilityStatus::ViolatesNorm,
        EvaluationStatus::Unsupported => AdmissibilityStatus::Unsupported,
        EvaluationStatus::IllFormed => AdmissibilityStatus::IllFormed,
        EvaluationStatus::NoNormativeContent => AdmissibilityStatus::NoNormativeContent,
        EvaluationStatus::Underdetermined | EvaluationStatus::WellFormed => {
            AdmissibilityStatus::Underdetermined
        }
    }
}

fn parse_tool_args(arguments: Option<&Value>) -> Map<String, Value> {
    let Some(arguments) = arguments else {
        return Map::new();
    };

    match arguments {
        Value::Object(map) => map.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}
