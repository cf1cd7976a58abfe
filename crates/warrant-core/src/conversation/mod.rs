//! Conversation handling: wire message model, content extraction, and
//! request-envelope schema validation.

mod parser;
mod schema;

pub use parser::{
    extract_text_content, extract_tool_text, parse_conversation, to_speech_act, Message,
    SpeechAct, ToolCall,
};
pub use schema::{is_valid_request, validate_request_schema, SchemaError};
