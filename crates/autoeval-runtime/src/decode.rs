//! Structured-output decoding helpers.
//!
//! The completion client forces a free-text model reply into a typed
//! payload: a JSON-only directive is appended to the system prompt, the
//! first JSON object is carved out of the reply (code fences tolerated),
//! and the object is deserialized into the target type. The retry
//! protocol around these helpers lives in
//! [`CompletionClient::create_structured`](crate::client::CompletionClient::create_structured).

use serde::de::DeserializeOwned;

/// A type the client can decode a completion into.
///
/// The hint is an example-shaped JSON skeleton shown to the model; it
/// doubles as the corrective context when a reply fails to decode.
pub trait SchemaHint {
    /// JSON skeleton describing the expected reply shape.
    fn schema_hint() -> &'static str;
}

/// System-prompt directive forcing a JSON-only reply of the given shape.
pub(crate) fn json_directive(hint: &str) -> String {
    format!(
        "Respond with a single JSON object of exactly this shape:\n{hint}\n\
         Output only the JSON object. No prose, no code fences, no keys beyond the shape."
    )
}

/// Corrective user turn sent after a reply that failed to decode.
pub(crate) fn corrective_feedback(detail: &str, hint: &str) -> String {
    format!(
        "Your previous reply could not be parsed: {detail}. \
         Reply again with only a JSON object of exactly this shape:\n{hint}"
    )
}

/// Carve the first JSON object out of a model reply.
///
/// Tolerates surrounding prose and markdown code fences by slicing from
/// the first `{` to the last `}`.
pub(crate) fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

/// Decode a model reply into `T`, or explain why it could not be.
pub(crate) fn decode_payload<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let json = extract_json(text).ok_or_else(|| "no JSON object found in reply".to_string())?;
    serde_json::from_str(json).map_err(|e| e.to_string())
}
