//! Helpers for raw HTTP responses read outside Octocrab's typed decoding.

use serde::de::DeserializeOwned;

use crate::github::error::GitHubError;

pub(super) fn extract_github_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

pub(super) fn extract_documentation_url(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("documentation_url")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

/// Decodes a body that may legitimately carry no data.
///
/// An empty body or a JSON `null` both mean GitHub answered without a
/// payload, which callers report differently from a decode failure.
pub(super) fn decode_optional_body<T: DeserializeOwned>(
    operation: &str,
    body: &str,
) -> Result<Option<T>, GitHubError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    serde_json::from_str::<Option<T>>(trimmed).map_err(|error| GitHubError::Decode {
        message: format!("{operation}: {error}"),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;

    use super::{decode_optional_body, extract_documentation_url, extract_github_message};
    use crate::github::error::GitHubError;

    #[derive(Debug, Deserialize, PartialEq, Eq)]
    struct Payload {
        value: u32,
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("  \n")]
    #[case::null("null")]
    fn missing_payloads_decode_to_none(#[case] body: &str) {
        let decoded = decode_optional_body::<Payload>("pull request", body);

        assert_eq!(decoded, Ok(None));
    }

    #[test]
    fn present_payload_is_decoded() {
        let decoded = decode_optional_body::<Payload>("pull request", r#"{"value": 7}"#);

        assert_eq!(decoded, Ok(Some(Payload { value: 7 })));
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let decoded = decode_optional_body::<Payload>("pull request", "{not json");

        assert!(matches!(decoded, Err(GitHubError::Decode { .. })));
    }

    #[test]
    fn github_error_fields_are_extracted() {
        let body = r#"{"message":"API rate limit exceeded","documentation_url":"https://docs.github.com/rate-limit"}"#;

        assert_eq!(
            extract_github_message(body).as_deref(),
            Some("API rate limit exceeded")
        );
        assert_eq!(
            extract_documentation_url(body).as_deref(),
            Some("https://docs.github.com/rate-limit")
        );
        assert_eq!(extract_github_message("<html>"), None);
    }
}
