//! Model reply parsing
//!
//! Replies are parsed structurally: first the whole reply, then a streaming
//! parse starting at each `[`. Only a non-empty array of objects counts. A
//! reply with no such array is either a recognised "nothing found" answer
//! (an empty array or a marker phrase) or malformed.

use serde_json::{Map, Value};

/// Phrases a model uses to say there is nothing to extract
const EMPTY_REPLY_MARKERS: [&str; 3] = [
    "no real training centers",
    "no training centers found",
    "no training centers were found",
];

/// Outcome of classifying a model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyShape {
    /// A non-empty JSON array of objects
    Records(Vec<Map<String, Value>>),
    /// An explicit "nothing found" answer: `[]` or a marker phrase
    Empty,
    /// Neither of the above
    Malformed,
}

/// Strip Markdown code fences around a reply
pub fn strip_code_fences(reply: &str) -> &str {
    reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// What a single parsed JSON value contributes to the reply
enum Found {
    Records(Vec<Map<String, Value>>),
    EmptyArray,
    Other,
}

fn object_array(value: Value) -> Found {
    match value {
        Value::Array(items) if items.is_empty() => Found::EmptyArray,
        Value::Array(items) => match objects(items) {
            Some(records) => Found::Records(records),
            None => Found::Other,
        },
        _ => Found::Other,
    }
}

fn objects(items: Vec<Value>) -> Option<Vec<Map<String, Value>>> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// Classify a raw model reply
pub fn parse_reply(reply: &str) -> ReplyShape {
    let text = strip_code_fences(reply);

    // An empty array only counts once no record array turns up
    let mut saw_empty_array = false;

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        match object_array(value) {
            Found::Records(records) => return ReplyShape::Records(records),
            Found::EmptyArray => saw_empty_array = true,
            Found::Other => {}
        }
    }

    for (start, _) in text.match_indices('[') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(value)) = stream.next() {
            match object_array(value) {
                Found::Records(records) => return ReplyShape::Records(records),
                Found::EmptyArray => saw_empty_array = true,
                Found::Other => {}
            }
        }
    }

    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if saw_empty_array || EMPTY_REPLY_MARKERS.iter().any(|m| normalized.contains(m)) {
        ReplyShape::Empty
    } else {
        ReplyShape::Malformed
    }
}

/// A model record that passed field validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateRecord {
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub source: Option<String>,
}

/// Non-blank string field; other types are ignored
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Coordinate field: numbers or numeric strings, absent/null allowed
fn coordinate_field(obj: &Map<String, Value>, key: &str) -> Result<Option<f64>, String> {
    let parsed = match obj.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("{} is not a number: {}", key, obj[key])),
    }
}

/// Validate one reply element
///
/// Errors carry the reason the record was rejected.
pub fn validate_record(obj: &Map<String, Value>) -> Result<CandidateRecord, String> {
    let name = text_field(obj, "name").ok_or_else(|| "name is missing or blank".to_string())?;

    Ok(CandidateRecord {
        lat: coordinate_field(obj, "lat")?,
        lng: coordinate_field(obj, "lng")?,
        address: text_field(obj, "address"),
        description: text_field(obj, "description"),
        phone: text_field(obj, "phone"),
        website: text_field(obj, "website"),
        email: text_field(obj, "email"),
        source: text_field(obj, "source"),
        name,
    })
}
