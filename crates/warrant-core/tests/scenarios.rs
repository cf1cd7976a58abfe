//! End-to-end evaluation scenarios through the public API.
//!
//! Each scenario feeds a realistic trajectory into `evaluate` and checks
//! the resulting judgment: status, licensing, grounds accounting, and the
//! per-statement trace.

use serde_json::json;
use serde_json::Value;

use warrant_core::conversation::{Message, ToolCall};
use warrant_core::grounding::GroundRecord;
use warrant_core::types::{ContextScope, ContextSource, CreatorType, EvidenceType, LinkRole};
use warrant_core::{evaluate, AdmissibilityStatus, EvaluateInput, PersonalContext};

fn user_text(text: &str) -> Message {
    Message {
        role: "user".to_string(),
        content: Some(json!(text)),
        tool_call_id: None,
        tool_calls: Vec::new(),
        function_name: None,
    }
}

fn tool_call_message(call_id: &str, tool: &str, arguments: Value) -> Message {
    Message {
        role: "assistant".to_string(),
        content: None,
        tool_call_id: None,
        tool_calls: vec![ToolCall {
            id: call_id.to_string(),
            kind: "function".to_string(),
            function_name: Some(tool.to_string()),
            function_arguments: Some(arguments),
            custom_name: None,
            custom_input: None,
        }],
        function_name: None,
    }
}

fn tool_result_message(call_id: &str, payload: &str) -> Message {
    Message {
        role: "tool".to_string(),
        content: Some(json!(payload)),
        tool_call_id: Some(call_id.to_string()),
        tool_calls: Vec::new(),
        function_name: None,
    }
}

fn conversation_input(conversation: Vec<Message>) -> EvaluateInput {
    EvaluateInput {
        conversation: Some(conversation),
        ..Default::default()
    }
}

fn output_input(text: &str) -> EvaluateInput {
    EvaluateInput {
        agent_output: Some(text.to_string()),
        ..Default::default()
    }
}

fn supports_record(citation_key: &str, ground_id: &str) -> GroundRecord {
    GroundRecord {
        citation_key: citation_key.to_string(),
        ground_id: ground_id.to_string(),
        role: LinkRole::Supports,
        creator: CreatorType::UpstreamPipeline,
        evidence_type: EvidenceType::Explicit,
        evidence_content: Some("declared by the caller".to_string()),
        signature: None,
    }
}

#[test]
fn scenario_descriptive_claim_with_tool_grounding_is_acceptable() {
    // Arrange: the agent reports a dependency it just observed.
    let conversation = vec![
        user_text("What is holding up AGENT-5?"),
        tool_call_message("call1", "get_issue", json!({"issue": "AGENT-5"})),
        tool_result_message(
            "call1",
            r#"{"issue_key": "AGENT-5", "status": "Blocked", "blocker": "AGENT-9"}"#,
        ),
        Message::assistant_text("AGENT-5 is blocked by AGENT-9."),
    ];

    // Act
    let judgment = evaluate(conversation_input(conversation)).expect("evaluation should succeed");

    // Assert
    assert_eq!(judgment.status, AdmissibilityStatus::Acceptable);
    assert!(judgment.licensed);
    assert_eq!(judgment.num_statements, 1);
    assert_eq!(judgment.num_acceptable, 1);
    let evaluation = &judgment.statement_evaluations[0];
    assert_eq!(evaluation.modality, "descriptive");
    assert_eq!(
        evaluation.grounding_trace[0].semantic_id.as_deref(),
        Some("issue_AGENT-5")
    );
    // The observation was accepted but the text never cites it.
    assert_eq!(judgment.grounds_accepted, 1);
    assert_eq!(judgment.grounds_cited, 0);
}

#[test]
fn scenario_goal_conditional_recommendation_is_conditionally_acceptable() {
    // Arrange: advice scoped to a stated goal, with no evidence at all.
    let input = output_input("If your goal is to unblock the team, you should finish AGENT-5 first.");

    // Act
    let judgment = evaluate(input).expect("evaluation should succeed");

    // Assert
    assert_eq!(judgment.status, AdmissibilityStatus::ConditionallyAcceptable);
    assert!(judgment.licensed);
    assert!(!judgment.can_retry);
    let evaluation = &judgment.statement_evaluations[0];
    assert_eq!(evaluation.modality, "conditional");
    assert!(evaluation
        .explanation
        .contains("your goal is to unblock the team"));
}

#[test]
fn scenario_personalized_recommendation_reads_as_conditional() {
    // Arrange: "best choice" would be a recommendation, but tailoring it
    // to the user presupposes knowledge of the user.
    let input = output_input("AGENT-7 is the best choice for you, given your release deadline.");

    // Act
    let judgment = evaluate(input).expect("evaluation should succeed");

    // Assert
    assert_eq!(judgment.status, AdmissibilityStatus::ConditionallyAcceptable);
    assert!(judgment.licensed);
    let evaluation = &judgment.statement_evaluations[0];
    assert_eq!(evaluation.modality, "conditional");
    assert!(evaluation.explanation.contains("given your release deadline"));
    assert!(evaluation.explanation.contains("for you"));
}

#[test]
fn scenario_refusal_text_is_admissible() {
    // Arrange: an explicit refusal with a follow-up question.
    let input =
        output_input("I cannot determine which task is more important. Could you share the sprint goal?");

    // Act
    let judgment = evaluate(input).expect("evaluation should succeed");

    // Assert
    assert_eq!(judgment.status, AdmissibilityStatus::Acceptable);
    assert!(judgment.licensed);
    assert!(judgment.violated_axioms.is_empty());
    let evaluation = &judgment.statement_evaluations[0];
    assert_eq!(evaluation.statement_id, "final_response");
    assert_eq!(evaluation.modality, "refusal");
    assert!(evaluation.explanation.contains("(A6)"));
}

#[test]
fn scenario_ungrounded_recommendation_violates_the_categoricity_ban() {
    // Arrange: a categorical recommendation with nothing behind it.
    let input = output_input("You should prioritize the login fix.");

    // Act
    let judgment = evaluate(input).expect("evaluation should succeed");

    // Assert
    assert_eq!(judgment.status, AdmissibilityStatus::ViolatesNorm);
    assert!(!judgment.licensed);
    assert!(judgment.can_retry);
    assert_eq!(judgment.violated_axioms, vec!["A5".to_string()]);
    let hint = judgment.feedback_hint.expect("violation should carry a hint");
    assert!(hint.contains("violates normative axioms: A5"));
    assert!(hint.contains("revise or refuse"));
}

#[test]
fn scenario_greeting_only_output_has_no_normative_content() {
    // Arrange
    let input = output_input("Hello! How can I help you today?");

    // Act
    let judgment = evaluate(input).expect("evaluation should succeed");

    // Assert
    assert_eq!(judgment.status, AdmissibilityStatus::NoNormativeContent);
    assert!(!judgment.licensed);
    assert!(!judgment.can_retry);
    assert_eq!(judgment.num_statements, 0);
    assert!(judgment.statement_evaluations.is_empty());
    assert!(judgment.explanation.contains("Protocol-only"));
}

#[test]
fn scenario_cited_tool_result_licenses_the_recommendation() {
    // Arrange: the recommendation cites the tool call whose result it
    // relies on, so the derived license admits the assertive form.
    let conversation = vec![
        user_text("Do I need an umbrella?"),
        tool_call_message("callWeatherNYC", "get_weather", json!({"city": "NYC"})),
        tool_result_message(
            "callWeatherNYC",
            r#"{"weather_id": "nyc_2026-02-07", "conditions": "rain"}"#,
        ),
        Message::assistant_text("You should carry an umbrella today [@callWeatherNYC]."),
    ];

    // Act
    let judgment = evaluate(conversation_input(conversation)).expect("evaluation should succeed");

    // Assert
    assert_eq!(judgment.status, AdmissibilityStatus::Acceptable);
    assert!(judgment.licensed);
    assert_eq!(judgment.grounds_accepted, 1);
    assert_eq!(judgment.grounds_cited, 1);
    let evaluation = &judgment.statement_evaluations[0];
    assert_eq!(evaluation.modality, "assertive");
    assert!(evaluation.license.contains(&"assertive".to_string()));
}

#[test]
fn scenario_declared_ground_record_licenses_the_recommendation() {
    // Arrange: no trajectory; the caller declares the ground and the
    // utterance cites it by key.
    let input = EvaluateInput {
        agent_output: Some("You should rotate the pager keys [@handbook].".to_string()),
        grounds: Some(vec![supports_record("handbook", "file_handbook_2026")]),
        ..Default::default()
    };

    // Act
    let judgment = evaluate(input).expect("evaluation should succeed");

    // Assert
    assert_eq!(judgment.status, AdmissibilityStatus::Acceptable);
    assert!(judgment.licensed);
    assert_eq!(judgment.grounds_accepted, 1);
    assert_eq!(judgment.grounds_cited, 1);
    let evaluation = &judgment.statement_evaluations[0];
    assert_eq!(
        evaluation.grounding_trace[0].id.as_str(),
        "file_handbook_2026"
    );
}

#[test]
fn scenario_refusal_content_part_short_circuits_evaluation() {
    // Arrange: the assistant message carries a structured refusal part
    // instead of text.
    let conversation = vec![
        user_text("Is the deployment finished?"),
        Message {
            role: "assistant".to_string(),
            content: Some(json!([
                {"type": "refusal", "refusal": "I cannot verify the deployment status."}
            ])),
            tool_call_id: None,
            tool_calls: Vec::new(),
            function_name: None,
        },
    ];

    // Act
    let judgment = evaluate(conversation_input(conversation)).expect("evaluation should succeed");

    // Assert
    assert_eq!(judgment.status, AdmissibilityStatus::Acceptable);
    assert!(judgment.licensed);
    let evaluation = &judgment.statement_evaluations[0];
    assert_eq!(evaluation.statement_id, "refusal");
    assert_eq!(evaluation.modality, "refusal");
}

#[test]
fn scenario_personal_context_is_audited_but_never_judged() {
    // Arrange: the same unlicensed recommendation, with and without
    // personal context attached.
    let plain = evaluate(output_input("You should prioritize the login fix."))
        .expect("evaluation should succeed");
    let contextual = evaluate(EvaluateInput {
        agent_output: Some("You should prioritize the login fix.".to_string()),
        personal_context: Some(PersonalContext::new(
            "prefers morning deploys",
            ContextScope::Session,
            ContextSource::Memory,
        )),
        ..Default::default()
    })
    .expect("evaluation should succeed");

    // Assert: the verdict is identical; only the audit trail differs.
    assert_eq!(plain.status, contextual.status);
    assert_eq!(plain.violated_axioms, contextual.violated_axioms);
    assert_eq!(plain.num_statements, contextual.num_statements);

    assert!(!plain.personal_context_present);
    assert_eq!(plain.personal_context_source, "unknown");
    assert_eq!(plain.personal_context_scope, "unknown");

    assert!(contextual.personal_context_present);
    assert_eq!(contextual.personal_context_source, "memory");
    assert_eq!(contextual.personal_context_scope, "session");
}
