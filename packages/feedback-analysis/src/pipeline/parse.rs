//! Locating and parsing the JSON object in a classifier reply.

use serde::de::DeserializeOwned;

use crate::error::MalformedResponse;

/// Strip a surrounding markdown code fence, if any.
pub fn strip_code_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// The outermost `{ ... }` span of `text`.
///
/// Runs from the first `{` to the last `}`; prose before or after the
/// object is dropped.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the JSON object contained in a classifier reply.
pub fn parse_json<T: DeserializeOwned>(response: &str) -> Result<T, MalformedResponse> {
    let stripped = strip_code_fences(response);

    serde_json::from_str(stripped).or_else(|first_err| {
        let object = find_json_object(stripped)
            .ok_or_else(|| MalformedResponse(format!("no JSON object found: {}", first_err)))?;
        serde_json::from_str(object).map_err(MalformedResponse::from)
    })
}
