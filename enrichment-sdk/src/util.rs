//! Utility module for common functionality
//!
//! Helpers shared by adapters and orchestrators: log redaction, request ids,
//! duration parsing and the code-fence/envelope stripping used before a
//! provider's text answer is parsed as JSON.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

static REDACTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"Bearer\s+[A-Za-z0-9\-_\.=+/]+", "Bearer [REDACTED]"),
        (r"Basic\s+[A-Za-z0-9\-_\.=+/]+", "Basic [REDACTED]"),
        (r"Api-Key\s+[A-Za-z0-9\-_\.=+/]+", "Api-Key [REDACTED]"),
        (r"(?i)api[_-]?key[=:]\s*[A-Za-z0-9\-_\.]+", "api_key=[REDACTED]"),
        (r#"(?i)"access_token"\s*:\s*"[^"]*""#, r#""access_token":"[REDACTED]""#),
        (r"(?i)secret[=:]\s*[^\s&]+", "secret=[REDACTED]"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

static CODE_FENCE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?s)```(?:[A-Za-z0-9_-]+)?\s*(.*?)\s*```").ok());

/// Truncate a string to a maximum length, adding ellipsis if truncated
///
/// Cuts on a char boundary so multi-byte (e.g. Cyrillic) text never panics.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let keep = if max_len <= 3 { max_len } else { max_len - 3 };
    let mut end = keep;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    if max_len <= 3 {
        s[..end].to_string()
    } else {
        format!("{}...", &s[..end])
    }
}

/// Sanitize a string for logging (remove credentials and tokens)
pub fn sanitize_for_logging(s: &str) -> String {
    let mut result = s.to_string();
    for (re, replacement) in REDACTIONS.iter() {
        result = re.replace_all(&result, *replacement).to_string();
    }
    result
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Parse a duration from a string (e.g., "30s", "5m", "1h", "500ms")
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();

    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else if let Some(hours) = s.strip_suffix('h') {
        hours.parse::<u64>().ok().map(|h| Duration::from_secs(h * 3600))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Remove a Markdown code fence (```json ... ```) around a model answer
///
/// Text without a fence is returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    match CODE_FENCE.as_ref().and_then(|re| re.captures(trimmed)) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(trimmed),
        None => trimmed,
    }
}

/// Narrow a model answer to its outermost `{...}` span
///
/// Models sometimes wrap the object in prose; if no braces are present the
/// input is returned unchanged.
pub fn extract_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}
