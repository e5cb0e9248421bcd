use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

// 2^53 - 1, the largest integer an f64 holds exactly
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Render a number the way JavaScript's `Number.prototype.toString`
/// does, so `7.0` is `"7"` and `1e20` is `"100000000000000000000"`.
fn js_number_string(n: &Number) -> String {
    if let Some(i) = n.as_u64().filter(|i| *i <= MAX_SAFE_INTEGER) {
        return i.to_string();
    }
    if let Some(i) = n.as_i64().filter(|i| i.unsigned_abs() <= MAX_SAFE_INTEGER) {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER as f64 => {
            (f as i64).to_string()
        }
        Some(f) => ryu_js::Buffer::new().format(f).to_string(),
        None => n.to_string(),
    }
}

/// A send request as decoded from the caller. Every field is optional
/// here so that missing fields are reported by validation rather than
/// by the decoder.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct NotificationRequest {
    pub token: Option<String>,
    pub topic: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    // Accepts strings and numbers alike, see `msg_id_string`
    pub msg_id: Option<Value>,
}

impl NotificationRequest {
    /// The msg_id in the string form sent to devices. Strings pass
    /// through, numbers use their JavaScript rendering (`42` becomes
    /// `"42"`, `7.0` becomes `"7"`) and booleans become `"true"` or
    /// `"false"`. Anything else, or an empty string, counts
    /// as missing.
    pub fn msg_id_string(&self) -> Option<String> {
        let id = match self.msg_id.as_ref()? {
            Value::String(s) => s.clone(),
            Value::Number(n) => js_number_string(n),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => return None,
        };
        if id.is_empty() { None } else { Some(id) }
    }
}

/// Where a message goes. Serializes as a single `token` or `topic` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Token(String),
    Topic(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Custom data delivered alongside the notification. Client apps match
/// `msg_id` against their own records by exact string equality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageData {
    pub msg_id: String,
}

/// A fully-formed message in the shape of the FCM v1 `message` object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    #[serde(flatten)]
    pub target: Target,
    pub notification: Notification,
    pub data: MessageData,
}
