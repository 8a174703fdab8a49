// Shared prompt constants and prompt-building utilities.
// Each engine that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([a-z_]+)\}").unwrap();
}

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You must respond with valid JSON only, no other text.";

/// Instruction that keeps rewrites grounded in the candidate's own record.
pub const GROUNDING_INSTRUCTION: &str = "\
    Only use facts present in the material provided. \
    Do NOT invent employers, titles, dates, metrics or technologies. \
    Keep every number from the original wording.";

/// Fills `{name}` placeholders in one pass over the template.
///
/// Substituted text is never rescanned, so a value containing `{title}` stays
/// literal. Placeholders without a value are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Appends the JSON schema block to a prompt.
pub fn structured_prompt(prompt: &str, schema: &Value) -> String {
    let schema_text =
        serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "{prompt}\n\nYou must respond ONLY with a valid JSON object matching this schema:\n{schema_text}\n\nResponse:"
    )
}

/// Caller system text (if any) followed by the JSON-only rule.
pub fn structured_system(system: Option<&str>) -> String {
    match system {
        Some(s) if !s.trim().is_empty() => format!("{}\n{}", s.trim_end(), JSON_ONLY_SYSTEM),
        _ => JSON_ONLY_SYSTEM.to_string(),
    }
}
