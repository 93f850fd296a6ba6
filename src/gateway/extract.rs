use serde_json::Value;

pub const FALLBACK_REPLY: &str =
    "I received your message but had trouble formatting a response. Please try again.";

/// Field paths tried, in order, for the assistant reply.
const REPLY_FIELDS: &[&[&str]] = &[&["response"], &["message"], &["data", "message"]];

const UPLOAD_ID_FIELDS: &[&[&str]] = &[&["upload_id"], &["uploadId"], &["data", "upload_id"]];

/// Pulls the assistant reply out of whatever shape the gateway sent back.
pub fn extract_response(payload: &Value) -> String {
    if let Some(text) = first_text(payload, REPLY_FIELDS) {
        return text;
    }
    match payload {
        Value::String(text) => text.clone(),
        _ => FALLBACK_REPLY.to_string(),
    }
}

/// Like `extract_response` but without the canned fallback.
pub fn extract_message(payload: &Value) -> Option<String> {
    first_text(payload, REPLY_FIELDS).or_else(|| match payload {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => None,
    })
}

pub fn extract_upload_id(payload: &Value) -> Option<String> {
    first_text(payload, UPLOAD_ID_FIELDS)
}

fn first_text(payload: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| {
        let value = path
            .iter()
            .try_fold(payload, |node, key| node.get(*key))?;
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            // Numeric ids are accepted as-is
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    })
}
