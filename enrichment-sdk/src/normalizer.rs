//! Validation and coercion of provider answers into `ContentResult`
//!
//! Text providers answer with model-generated text that is supposed to be a
//! JSON object but arrives fenced, wrapped in prose or in an extra envelope,
//! with numbers as strings. Everything is coerced here so all providers
//! yield the same shape. This is the only place that raises
//! `ServiceError::Validation` for provider output.

use serde_json::{Map, Value};

use crate::error::{Result, ServiceError};
use crate::models::{ContentResult, ContentType, RawProviderResponse};
use crate::util::{extract_json_object, sanitize_for_logging, strip_code_fences, truncate_string};

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Single keys some models wrap the object in
const ENVELOPE_KEYS: [&str; 3] = ["result", "data", "content"];

/// Stateless normalizer shared by all text providers
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a raw answer; `Ok(None)` means the provider knows nothing
    pub fn normalize(&self, raw: &RawProviderResponse) -> Result<Option<ContentResult>> {
        match self.parse_payload(raw)? {
            Some(object) => self.normalize_object(&object).map(Some),
            None => Ok(None),
        }
    }

    /// Strip wrapping and parse the answer into a JSON object
    pub fn parse_payload(&self, raw: &RawProviderResponse) -> Result<Option<Map<String, Value>>> {
        let text = strip_code_fences(&raw.text);
        if text.is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(text)
            .or_else(|_| serde_json::from_str(extract_json_object(text)))
            .map_err(|e| {
                log::debug!(
                    "{} answer is not JSON: {}",
                    raw.provider,
                    truncate_string(&sanitize_for_logging(text), 300)
                );
                ServiceError::malformed(raw.provider, format!("Answer is not valid JSON: {}", e))
            })?;

        match unwrap_envelope(value) {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            Value::Object(map) => Ok(Some(map)),
            Value::Array(items) => match items.into_iter().next() {
                None => Ok(None),
                Some(Value::Object(map)) if map.is_empty() => Ok(None),
                Some(Value::Object(map)) => Ok(Some(map)),
                Some(_) => Err(ServiceError::malformed(
                    raw.provider,
                    "Answer array does not contain an object",
                )),
            },
            _ => Err(ServiceError::malformed(
                raw.provider,
                "Answer is not a JSON object",
            )),
        }
    }

    /// Coerce a parsed object into a `ContentResult`
    pub fn normalize_object(&self, object: &Map<String, Value>) -> Result<ContentResult> {
        let title = text_field(object, "title");
        if title.is_empty() {
            return Err(ServiceError::validation("Provider result has no title"));
        }

        let content_type = match object.get("type") {
            Some(Value::String(kind)) => kind.parse::<ContentType>()?,
            Some(other) => {
                return Err(ServiceError::validation(format!(
                    "Unsupported content type {}",
                    other
                )))
            }
            None => return Err(ServiceError::validation("Provider result has no type")),
        };

        Ok(ContentResult {
            title,
            description: text_field(object, "description"),
            genre: text_field(object, "genre"),
            rating: coerce_rating(object.get("rating")),
            year: coerce_year(object.get("year"))?,
            content_type,
            poster_prompt_hint: text_field(object, "image_suggestion"),
        })
    }
}

fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 => {
            let key = ENVELOPE_KEYS.iter().find(|k| map.contains_key(**k));
            match key.and_then(|k| map.remove(*k)) {
                Some(inner @ Value::Object(_)) | Some(inner @ Value::Array(_)) => inner,
                Some(other) => {
                    // not an envelope after all
                    let k = key.map(|k| k.to_string()).unwrap_or_default();
                    map.insert(k, other);
                    Value::Object(map)
                }
                None => Value::Object(map),
            }
        }
        other => other,
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', ".");
    let cleaned = cleaned.split('/').next().unwrap_or_default().trim();
    cleaned.parse::<f64>().ok()
}

/// Missing, unreadable or NaN ratings become 0; the rest, infinities
/// included, are clamped
fn coerce_rating(value: Option<&Value>) -> f64 {
    let rating = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_number(s),
        _ => None,
    };

    match rating {
        Some(r) if !r.is_nan() => r.clamp(MIN_RATING, MAX_RATING),
        Some(_) | None => {
            if let Some(raw) = value.filter(|v| !v.is_null()) {
                log::debug!("Unreadable rating {}, defaulting to 0", raw);
            }
            MIN_RATING
        }
    }
}

/// Years are required; series spans like "2011-2019" use the first year
fn coerce_year(value: Option<&Value>) -> Result<i32> {
    let year = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(Value::String(s)) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse::<i64>().ok()
        }
        _ => None,
    };

    let year = year.ok_or_else(|| {
        ServiceError::validation(match value {
            Some(v) => format!("Unreadable year {}", v),
            None => "Provider result has no year".to_string(),
        })
    })?;

    if !(MIN_YEAR as i64..=MAX_YEAR as i64).contains(&year) {
        return Err(ServiceError::validation(format!(
            "Year {} outside {}..={}",
            year, MIN_YEAR, MAX_YEAR
        )));
    }

    Ok(year as i32)
}
