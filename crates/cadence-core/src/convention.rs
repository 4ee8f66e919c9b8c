//! Cleanup rules for labeled text envelopes.
//!
//! Regeneration endpoints wrap their values in loose textual conventions:
//! a `week:` / `day:` / `subcontent:` label prefix, stray quotes, and
//! sometimes a JSON object carrying the value under a `subcontent` key.
//! These rules strip the envelope back off. They never fail: malformed
//! input degrades to trimmed raw text, and empty input stays empty.

/// Unwrap a regenerated sub-topic.
///
/// Applied in this precedence:
/// 1. If the trimmed input starts with `{` or `[`, try JSON; a string
///    `subcontent` field replaces the text, anything else falls through
///    with the original.
/// 2. Strip a leading `week:` label (case-insensitive), including an
///    optional single leading quote and its matching close quote.
/// 3. Strip everything through the last `day:` label, then through the
///    last `subcontent:` label.
/// 4. Drop literal `{` and `}` characters.
/// 5. Trim.
pub fn clean_sub_topic(raw: &str) -> String {
    let trimmed = raw.trim();
    let unwrapped = match json_subcontent(trimmed) {
        Some(inner) => inner,
        None => trimmed.to_owned(),
    };
    let text = strip_week_label(&unwrapped);
    let text = strip_through_last(text, "day:");
    let text = strip_through_last(text, "subcontent:");
    text.replace(['{', '}'], "").trim().to_owned()
}

/// Unwrap a regenerated main idea: the `week:` label and braces only.
/// `day:` / `subcontent:` labels are part of the value here and survive.
pub fn clean_main_idea(raw: &str) -> String {
    let text = strip_week_label(raw.trim());
    text.replace(['{', '}'], "").trim().to_owned()
}

/// Remove one leading `label:` prefix from a request payload, so the
/// seed text sent out is the bare value (`"Week 2: coffee"` becomes
/// `"coffee"`). Text without a label passes through trimmed.
pub fn strip_request_label(raw: &str) -> &str {
    match raw.find(':') {
        Some(pos) if pos > 0 => raw[pos + 1..].trim(),
        _ => raw.trim(),
    }
}

/// The `subcontent` string field of a JSON payload, if the input is one.
fn json_subcontent(trimmed: &str) -> Option<String> {
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    match value.get("subcontent") {
        Some(serde_json::Value::String(inner)) => Some(inner.clone()),
        _ => None,
    }
}

/// Strip `^["']?\s*week:\s*`, case-insensitive. When a leading quote was
/// consumed and the remainder ends with the same quote, the close quote
/// goes too. Without the label the input is returned trimmed, quotes
/// intact.
fn strip_week_label(text: &str) -> &str {
    let trimmed = text.trim();
    let (quote, rest) = match trimmed.chars().next() {
        Some(q @ ('"' | '\'')) => (Some(q), &trimmed[1..]),
        _ => (None, trimmed),
    };
    let Some(after) = strip_prefix_ignore_case(rest.trim_start(), "week:") else {
        return trimmed;
    };
    let after = after.trim_start();
    match quote {
        Some(q) => after.strip_suffix(q).unwrap_or(after),
        None => after,
    }
}

/// Drop everything up to and including the last occurrence of `label`
/// (which must be lowercase), plus any whitespace that follows it.
fn strip_through_last<'a>(text: &'a str, label: &str) -> &'a str {
    match text.to_ascii_lowercase().rfind(label) {
        Some(pos) => text[pos + label.len()..].trim_start(),
        None => text,
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}
