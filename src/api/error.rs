use serde::Serialize;

/// One client-side validation failure, addressed by a dotted path into the
/// submitted draft (e.g. `questions.3.options`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("validation failed ({} issue(s))", .0.len())]
    Validation(Vec<ValidationIssue>),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Storage(format!("{e:#}"))
    }
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status: 401 | 403, .. })
    }

    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![ValidationIssue::new(path, message)])
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Pulls a human-readable message out of an error body, the way the UI used
/// to read `error.response?.data?.message`.
pub fn error_message(status: u16, body: &[u8]) -> String {
    if let Ok(v) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["message", "error", "msg"] {
            if let Some(s) = v.get(key).and_then(|m| m.as_str()) {
                if !s.trim().is_empty() {
                    return s.to_string();
                }
            }
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() && text.len() <= 200 && !text.starts_with('{') {
        return text.to_string();
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_body_message_field() {
        let body = br#"{"message":"Email ou mot de passe incorrect"}"#;
        assert_eq!(error_message(401, body), "Email ou mot de passe incorrect");
    }

    #[test]
    fn message_falls_back_to_status_reason() {
        assert_eq!(error_message(404, b""), "Not Found");
        assert_eq!(error_message(500, br#"{"stack":"x"}"#), "Internal Server Error");
    }
}
