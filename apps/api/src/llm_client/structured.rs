//! Structured output helpers: locate the JSON object in raw model text and
//! check it against the output schema the prompt asked for.

use std::fmt;

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::llm_client::LlmError;

/// Schema errors reported per failed parse; the rest are counted.
const MAX_REPORTED_ERRORS: usize = 3;

/// An output schema compiled once and reused for every call that asks for it.
pub struct OutputSchema {
    schema: Value,
    validator: jsonschema::Validator,
}

impl OutputSchema {
    pub fn compile(schema: Value) -> Result<Self> {
        let validator = jsonschema::options()
            .build(&schema)
            .map_err(|e| anyhow!("invalid output schema: {e}"))?;
        Ok(Self { schema, validator })
    }

    /// The raw schema, embedded in the prompt.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Collects every violation as `$<path>: <message>`.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(value)
            .map(|error| format!("${}: {error}", error.instance_path))
            .collect();
        match errors.len() {
            0 => Ok(()),
            n if n <= MAX_REPORTED_ERRORS => Err(errors.join("; ")),
            n => Err(format!(
                "{} (and {} more)",
                errors[..MAX_REPORTED_ERRORS].join("; "),
                n - MAX_REPORTED_ERRORS
            )),
        }
    }
}

impl fmt::Debug for OutputSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSchema")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Parses the first balanced `{...}` region of `raw` and validates it against `schema`.
pub fn parse_structured(raw: &str, schema: &OutputSchema) -> Result<Value, LlmError> {
    let text = strip_json_fences(raw);
    let object = extract_balanced_object(text).ok_or(LlmError::NoJsonObject)?;
    let value: Value = serde_json::from_str(object)?;
    schema.check(&value).map_err(LlmError::SchemaMismatch)?;
    Ok(value)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the first `{...}` region whose braces balance, ignoring braces inside strings.
pub fn extract_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
