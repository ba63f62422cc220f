//! Pulling a JSON object out of model text.
//!
//! Models asked for JSON still wrap it in markdown fences, add a sentence
//! of preamble, or leave a trailing comma. [`extract_json_object`] handles
//! those cases before giving up.

use serde_json::Value;

/// Parse the JSON object contained in `text`.
///
/// Tries, in order: the trimmed text as-is, the text with markdown fences
/// removed, the span from the first `{` to the last `}`, and that span with
/// trailing commas dropped.
pub fn extract_json_object(text: &str) -> Result<Value, serde_json::Error> {
    let trimmed = text.trim();
    if let Ok(v) = serde_json::from_str(trimmed) {
        return Ok(v);
    }

    let unfenced = strip_markdown_fences(trimmed);
    if let Ok(v) = serde_json::from_str(unfenced) {
        return Ok(v);
    }

    let span = object_span(unfenced).unwrap_or(unfenced);
    match serde_json::from_str(span) {
        Ok(v) => Ok(v),
        Err(_) => serde_json::from_str(&drop_trailing_commas(span)),
    }
}

fn strip_markdown_fences(input: &str) -> &str {
    let after_open = match input
        .strip_prefix("```json")
        .or_else(|| input.strip_prefix("```"))
    {
        Some(rest) => rest,
        None => return input,
    };
    after_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(after_open)
        .trim()
}

fn object_span(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let end = input.rfind('}')?;
    (end > start).then(|| &input[start..=end])
}

/// Remove commas directly followed (after whitespace) by `]` or `}`,
/// leaving string literals alone.
fn drop_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &c) in chars.iter().enumerate() {
        if escape_next {
            escape_next = false;
        } else if in_string && c == '\\' {
            escape_next = true;
        } else if c == '"' {
            in_string = !in_string;
        } else if !in_string && c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some(']') | Some('}')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}
