use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A key-stamped value delivered by the realtime feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub key: String,
    pub value: Value,
}

impl Snapshot {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Builds a snapshot for a full feed path; the key is the last path segment.
    pub fn at_path(path: &str, value: Value) -> Self {
        Self::new(key_from_path(path), value)
    }
}

/// Either a bare payload or a wrapped snapshot carrying one.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedPayload {
    Raw(Value),
    Snapshot(Snapshot),
}

impl FeedPayload {
    pub fn value(&self) -> &Value {
        match self {
            Self::Raw(value) => value,
            Self::Snapshot(snapshot) => &snapshot.value,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Raw(_) => None,
            Self::Snapshot(snapshot) => Some(&snapshot.key),
        }
    }
}

impl From<Value> for FeedPayload {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl From<bool> for FeedPayload {
    fn from(value: bool) -> Self {
        Self::Raw(Value::Bool(value))
    }
}

impl From<Snapshot> for FeedPayload {
    fn from(snapshot: Snapshot) -> Self {
        Self::Snapshot(snapshot)
    }
}

/// Role of a subscribed feed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Previous,
    Next,
    Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    pub channel: Channel,
    pub payload: FeedPayload,
}

impl FeedEvent {
    pub fn new(channel: Channel, payload: impl Into<FeedPayload>) -> Self {
        Self {
            channel,
            payload: payload.into(),
        }
    }
}

/// One line of a recorded feed session: a value written at a full path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub path: String,
    pub value: Value,
}

pub fn key_from_path(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Loose truthiness: null, false, zero, NaN and the empty string are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number
            .as_f64()
            .map(|n| n != 0.0 && !n.is_nan())
            .unwrap_or(false),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Loose numeric coercion; anything without a numeric reading becomes `NaN`.
/// Strings follow the loose number grammar: decimal with optional exponent,
/// `0x`/`0o`/`0b` radix prefixes and the word `Infinity`; `inf` and `nan`
/// spellings do not count.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                parse_loose_number(text)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn parse_loose_number(text: &str) -> f64 {
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&text[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}
