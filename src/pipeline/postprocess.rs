//! Post-processing: deterministic cleanup of raw model text before JSON parsing.
//!
//! Gemini's constrained decoding returns bare JSON, but chat-style providers
//! reached through `edgequake-llm` only see the schema in the prompt and
//! regularly wrap the reply in ```` ```json ```` fences or prefix it with a
//! BOM. These rules only touch the edges of the reply; string contents are
//! left to `serde_json`.
//!
//! Rules (applied in order):
//! 1. Trim invisible Unicode (BOM, zero-width spaces) and whitespace at both ends
//! 2. Strip an outer code fence (` ``` ` or ` ```json `)
//! 3. Trim both ends again

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the raw model reply.
pub fn clean_json_payload(input: &str) -> String {
    let s = strip_code_fences(trim_invisible(input));
    trim_invisible(&s).to_string()
}

// ── Rule 1: Trim invisible characters at the edges ───────────────────────────

fn trim_invisible(input: &str) -> &str {
    input.trim_matches(|c: char| {
        c.is_whitespace()
            || matches!(c, '\u{FEFF}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}')
    })
}

// ── Rule 2: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let input = "```json\n{\"layout_items\": []}\n```";
        assert_eq!(clean_json_payload(input), "{\"layout_items\": []}");
    }

    #[test]
    fn strips_bare_fence() {
        let input = "```\n{\"a\": 1}\n```\n";
        assert_eq!(clean_json_payload(input), "{\"a\": 1}");
    }

    #[test]
    fn bare_json_passthrough() {
        let input = "  {\"layout_items\": []}\n";
        assert_eq!(clean_json_payload(input), "{\"layout_items\": []}");
    }

    #[test]
    fn removes_bom() {
        let input = "\u{FEFF}{\"a\": 1}";
        assert_eq!(clean_json_payload(input), "{\"a\": 1}");
    }

    #[test]
    fn zero_width_outside_fence_is_trimmed() {
        let input = "\u{200B}```json\n{\"a\": 1}\n```\u{2060}\n";
        assert_eq!(clean_json_payload(input), "{\"a\": 1}");
    }

    #[test]
    fn zero_width_inside_strings_survives() {
        let input = "{\"summary\": \"\u{645}\u{6CC}\u{200C}\u{62E}\u{648}\u{627}\u{647}\u{645} \u{1F469}\u{200D}\u{1F4BB}\"}";
        assert_eq!(clean_json_payload(input), input);
    }

    #[test]
    fn inner_backticks_survive() {
        let input = "{\"summary\": \"uses ``` inside\"}";
        assert_eq!(clean_json_payload(input), input);
    }
}
