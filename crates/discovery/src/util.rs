//! Small shared helpers

/// Maximum length for error response body to log (prevents log flooding)
const MAX_ERROR_BODY_LOG_LENGTH: usize = 500;

/// Whether an optional field is absent, empty, or whitespace-only
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Sanitize a response body for logging - truncate and redact potential secrets
pub(crate) fn sanitize_response_for_logging(body: &str) -> String {
    let truncated = if body.len() > MAX_ERROR_BODY_LOG_LENGTH {
        let mut cut = MAX_ERROR_BODY_LOG_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} total bytes]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    if let Ok(mut json) = serde_json::from_str::<serde_json::Value>(&truncated) {
        for field in ["access_token", "refresh_token", "id_token", "token", "secret"] {
            if json.get(field).is_some() {
                json[field] = serde_json::json!("[REDACTED]");
            }
        }
        json.to_string()
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_handles_none_empty_and_whitespace() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some("   ")));
        assert!(!is_blank(Some("value")));
    }

    #[test]
    fn sanitize_redacts_token_fields() {
        let body = r#"{"access_token":"secret-value","expires_in":3600}"#;
        let sanitized = sanitize_response_for_logging(body);
        assert!(!sanitized.contains("secret-value"));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "x".repeat(2000);
        let sanitized = sanitize_response_for_logging(&body);
        assert!(sanitized.contains("truncated"));
        assert!(sanitized.len() < body.len());
    }
}
