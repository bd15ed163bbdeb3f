//! Instruction text for per-page layout detection.
//!
//! Callers can override the default via
//! [`crate::config::ExtractionConfig::instruction`]; the builder here is used
//! only when no override is provided.

/// Build the default per-page instruction.
///
/// `json_schema` is the reply format rendered as JSON Schema; it is repeated
/// in the prompt because only some providers accept a decoding constraint.
pub fn layout_instruction(json_schema: &str, max_items: usize) -> String {
    format!(
        "Find and summarize all the relevant layout elements in this pdf page in the \
         following format: {json_schema}. \
         Tables should have at least two columns and at least two rows. \
         The coordinates should overlap with each layout item. \
         Return {max_items} items at most. \
         Respond with the JSON object only."
    )
}
