use serde_json::Value as JsonValue;

/// Extracts JSON from model output that may carry commentary around it.
///
/// Tries the whole text first, then the span from the first `{` to the last `}`.
/// `None` means "no structured content"; retrying is the caller's decision.
pub fn parse(raw: &str) -> Option<JsonValue> {
    if let Ok(value) = serde_json::from_str::<JsonValue>(raw.trim()) {
        return Some(value);
    }

    let first = raw.find('{')?;
    let last = raw.rfind('}')?;
    if last <= first {
        return None;
    }
    serde_json::from_str(&raw[first..=last]).ok()
}

/// The raw question items of a parsed reply: the `questions` array, or a bare top-level array.
pub fn question_items(value: &JsonValue) -> Option<&[JsonValue]> {
    if let Some(arr) = value.get("questions").and_then(|a| a.as_array()) {
        return Some(arr.as_slice());
    }
    value.as_array().map(|a| a.as_slice())
}
