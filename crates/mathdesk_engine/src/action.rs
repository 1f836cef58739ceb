//! Action grammar extraction.
//!
//! The executor model is asked to emit
//! `<THOUGHT> free text </THOUGHT><ACTION> tool_name(arguments) </ACTION>`
//! but the continuation is adversarial: tags may be missing, duplicated
//! or truncated. Extraction takes the first `<ACTION>` span as
//! authoritative and matches `identifier(...)` against it, with the
//! closing tag (not parenthesis balance) delimiting the argument text, so
//! nested parentheses inside string or list literals cannot confuse the
//! boundary.

use mathdesk_common::ActionParseError;
use regex::Regex;
use std::sync::OnceLock;

/// Tool name plus raw (unparsed) argument text extracted from generated
/// output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAction {
    pub tool_name: String,
    pub raw_arguments: String,
}

fn action_span_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<ACTION>(.+?)</ACTION>").expect("valid regex"))
}

fn call_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Greedy body up to the final ')': the span boundary is already
    // fixed by the action tag.
    RE.get_or_init(|| Regex::new(r"(?s)^([A-Za-z_]\w*)\s*\((.*)\)$").expect("valid regex"))
}

/// Extract the first tool action from arbitrary continuation text.
pub fn extract_action(text: &str) -> Result<RawAction, ActionParseError> {
    let span = action_span_pattern()
        .captures(text)
        .and_then(|c| c.get(1))
        .ok_or(ActionParseError::MissingAction)?;

    let call_text = span.as_str().trim();
    let captures = call_pattern()
        .captures(call_text)
        .ok_or_else(|| ActionParseError::MalformedCall(call_text.to_string()))?;

    Ok(RawAction {
        tool_name: captures[1].to_string(),
        raw_arguments: captures[2].to_string(),
    })
}
