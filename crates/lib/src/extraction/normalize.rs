//! The Response Normalizer: model reply text in, validated `Table` out.

use crate::{
    errors::NormalizationError,
    types::{Cell, Table},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FENCE: &str = "```";

/// How to treat a record value that is itself an object or an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedValuePolicy {
    /// Fail the whole reply.
    #[default]
    Reject,
    /// Keep the value as a text cell holding its compact JSON.
    Stringify,
}

/// Removes markdown code-fence wrappers and surrounding whitespace.
///
/// Idempotent: stripping an already unwrapped reply returns it unchanged.
pub fn strip_code_fences(reply: &str) -> &str {
    let text = reply.trim();
    let opening = if text.starts_with(FENCE) {
        Some(0)
    } else {
        // A block embedded in prose only counts when it is closed.
        text.find(FENCE)
            .filter(|&i| text[i + FENCE.len()..].contains(FENCE))
    };

    let Some(start) = opening else {
        return text.strip_suffix(FENCE).unwrap_or(text).trim();
    };

    let body = skip_fence_tag(&text[start + FENCE.len()..]);
    let body = match body.find(FENCE) {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim()
}

/// Skips an info string such as `json` right after an opening fence.
fn skip_fence_tag(after_fence: &str) -> &str {
    let line_end = after_fence.find('\n').unwrap_or(after_fence.len());
    let first_line = after_fence[..line_end].trim();
    let is_tag = !first_line.is_empty()
        && first_line
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if is_tag {
        return &after_fence[line_end..];
    }
    match after_fence.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("json") => &after_fence[4..],
        _ => after_fence,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parses a model reply into a `Table`.
///
/// The reply must be a JSON array of flat objects. Columns are the union of the
/// record keys in first-seen order. No partial recovery is attempted.
pub fn normalize_response(
    reply: &str,
    policy: NestedValuePolicy,
) -> Result<Table, NormalizationError> {
    let body = strip_code_fences(reply);
    if body.is_empty() {
        return Err(NormalizationError::EmptyReply);
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| NormalizationError::InvalidJson(e.to_string()))?;
    let items = match value {
        Value::Array(items) => items,
        other => return Err(NormalizationError::NotAnArray(json_type_name(&other))),
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let fields = match item {
            Value::Object(fields) => fields,
            _ => return Err(NormalizationError::RecordNotObject { index }),
        };
        let mut record = Vec::with_capacity(fields.len());
        for (column, value) in fields {
            let cell = match Cell::from_scalar(&value) {
                Some(cell) => cell,
                None if policy == NestedValuePolicy::Stringify => Cell::Text(value.to_string()),
                None => {
                    return Err(NormalizationError::NestedValue {
                        record: index,
                        column,
                    })
                }
            };
            record.push((column, cell));
        }
        records.push(record);
    }

    Ok(Table::from_records(records))
}
