//! Conversation wire model and parsing.
//!
//! Messages follow the common chat-completion shape: a role, string or
//! part-list content, optional tool calls, and tool/function result
//! linkage. Parsing is strict about structure (objects, required role)
//! and lenient about everything optional.

use serde_json::Value;

use crate::EvaluateError;

/// One message of a conversation trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    /// Raw content: a string, an array of content parts, or null.
    pub content: Option<Value>,
    pub tool_call_id: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    /// Name carried by legacy `function` role messages.
    pub function_name: Option<String>,
}

impl Message {
    /// Build a plain-text assistant message.
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(Value::String(text.into())),
            tool_call_id: None,
            tool_calls: Vec::new(),
            function_name: None,
        }
    }
}

/// A tool call announced by an assistant message.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    /// Call kind; defaults to `function`.
    pub kind: String,
    pub function_name: Option<String>,
    pub function_arguments: Option<Value>,
    pub custom_name: Option<String>,
    pub custom_input: Option<String>,
}

/// The assistant's final utterance, as committed content.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechAct {
    Text(String),
    Refusal(String),
}

/// Parse raw JSON messages into the internal message model.
pub fn parse_conversation(messages: &[Value]) -> Result<Vec<Message>, EvaluateError> {
    let mut out = Vec::new();
    for msg in messages {
        let obj = msg
            .as_object()
            .ok_or_else(|| EvaluateError::InvalidMessage("message must be object".to_string()))?;
        let role = obj
            .get("role")
            .and_then(Value::as_str)
            .ok_or_else(|| EvaluateError::InvalidMessage("message.role is required".to_string()))?
            .to_string();

        let content = obj.get("content").cloned();

        let tool_call_id = obj
            .get("tool_call_id")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let function_name = obj
            .get("name")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let tool_calls = parse_tool_calls(obj.get("tool_calls"))?;

        out.push(Message {
            role,
            content,
            tool_call_id,
            tool_calls,
            function_name,
        });
    }
    Ok(out)
}

fn parse_tool_calls(value: Option<&Value>) -> Result<Vec<ToolCall>, EvaluateError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let Some(arr) = value.as_array() else {
        return Err(EvaluateError::InvalidMessage(
            "tool_calls must be an array".to_string(),
        ));
    };

    let mut out = Vec::new();
    for item in arr {
        let Some(obj) = item.as_object() else {
            continue;
        };
        let Some(id) = obj.get("id").and_then(Value::as_str) else {
            continue;
        };
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("function")
            .to_string();

        let mut function_name = None;
        let mut function_arguments = None;
        if let Some(function_obj) = obj.get("function").and_then(Value::as_object) {
            function_name = function_obj
                .get("name")
                .and_then(Value::as_str)
                .map(ToString::to_string);
            function_arguments = function_obj.get("arguments").cloned();
        }

        let mut custom_name = None;
        let mut custom_input = None;
        if let Some(custom_obj) = obj.get("custom").and_then(Value::as_object) {
            custom_name = custom_obj
                .get("name")
                .and_then(Value::as_str)
                .map(ToString::to_string);
            custom_input = custom_obj
                .get("input")
                .and_then(Value::as_str)
                .map(ToString::to_string);
        }

        out.push(ToolCall {
            id: id.to_string(),
            kind,
            function_name,
            function_arguments,
            custom_name,
            custom_input,
        });
    }

    Ok(out)
}

/// Convert assistant message content into a speech act.
///
/// Refusal parts and text parts are mutually exclusive; mixing them is a
/// structural error, not a judgment.
pub fn to_speech_act(message: &Message) -> Result<SpeechAct, EvaluateError> {
    speech_act_from_content(message.content.as_ref())
}

fn speech_act_from_content(content: Option<&Value>) -> Result<SpeechAct, EvaluateError> {
    let Some(content) = content else {
        return Ok(SpeechAct::Text(String::new()));
    };
    match content {
        Value::String(s) => Ok(SpeechAct::Text(s.clone())),
        Value::Array(parts) => {
            let (refusal_parts, text_parts) = collect_parts(parts);
            if !refusal_parts.is_empty() && !text_parts.is_empty() {
                return Err(EvaluateError::InvalidMessage(
                    "Assistant content cannot mix text and refusal parts".to_string(),
                ));
            }
            if !refusal_parts.is_empty() {
                Ok(SpeechAct::Refusal(
                    refusal_parts.join("").trim().to_string(),
                ))
            } else {
                Ok(SpeechAct::Text(text_parts.join("").trim().to_string()))
            }
        }
        _ => Err(EvaluateError::LastAssistantContentNotString),
    }
}

/// Flatten message content to plain text. Refusal-only content yields the
/// refusal text, which is what output comparison wants.
pub fn extract_text_content(content: Option<&Value>) -> Result<String, EvaluateError> {
    match speech_act_from_content(content)? {
        SpeechAct::Text(text) | SpeechAct::Refusal(text) => Ok(text),
    }
}

/// Flatten tool result content to plain text. Tool results carry
/// observations, never refusals.
pub fn extract_tool_text(content: Option<&Value>) -> Result<String, EvaluateError> {
    let Some(content) = content else {
        return Ok(String::new());
    };
    match content {
        Value::String(s) => Ok(s.clone()),
        Value::Array(parts) => {
            let (refusal_parts, text_parts) = collect_parts(parts);
            if !refusal_parts.is_empty() {
                return Err(EvaluateError::InvalidMessage(
                    "Tool message content cannot include refusal parts".to_string(),
                ));
            }
            Ok(text_parts.join("").trim().to_string())
        }
        _ => Err(EvaluateError::LastAssistantContentNotString),
    }
}

fn collect_parts(parts: &[Value]) -> (Vec<String>, Vec<String>) {
    let mut refusal_parts = Vec::new();
    let mut text_parts = Vec::new();
    for part in parts {
        let Some(obj) = part.as_object() else {
            continue;
        };
        let kind = obj.get("type").and_then(Value::as_str).unwrap_or_default();
        if kind == "refusal" {
            if let Some(s) = obj.get("refusal").and_then(Value::as_str) {
                refusal_parts.push(s.to_string());
            }
        }
        // `output_text` is the Responses-API spelling of a text part.
        if kind == "text" || kind == "output_text" {
            if let Some(s) = obj.get("text").and_then(Value::as_str) {
                text_parts.push(s.to_string());
            }
        }
    }
    (refusal_parts, text_parts)
}
