//! Grounding: turning trajectory evidence into grounds and support links.
//!
//! Two sources feed the ground pool. [`knowledge`] converts tool results
//! observed in the trajectory into grounds with stable ids. [`citations`]
//! handles declared ground records and the `[@key]` citation markers that
//! link utterance text back to them.

pub mod citations;
pub mod knowledge;

pub use citations::{
    annotation_records, build_links, extract_citation_keys, records_from_tool_call_refs,
    GroundRecord, GroundsPayload,
};
pub use knowledge::{KnowledgeBuilder, ToolObservation};
