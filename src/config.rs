use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_QUIZ_QUESTION_COUNT: usize = 20;
pub const QUIZ_QUESTION_RANGE: std::ops::RangeInclusive<usize> = 1..=200;

/// Workspace settings key holding config overrides.
pub const SETTINGS_KEY: &str = "client.config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    pub quiz_question_count: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: None,
            quiz_question_count: DEFAULT_QUIZ_QUESTION_COUNT,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `ELEARND_*` environment variables.
    pub fn load() -> Self {
        let mut cfg = Self::default();
        if let Some(url) = var("ELEARND_API_URL") {
            cfg.api_base_url = url;
        }
        if let Some(t) = parse_var::<u64>("ELEARND_TIMEOUT_SECS") {
            cfg.request_timeout_secs = Some(t);
        }
        if let Some(n) = parse_var::<usize>("ELEARND_QUIZ_QUESTIONS") {
            if QUIZ_QUESTION_RANGE.contains(&n) {
                cfg.quiz_question_count = n;
            } else {
                warn!("Ignoring ELEARND_QUIZ_QUESTIONS={n}: must be between 1 and 200");
            }
        }
        info!(api = %cfg.api_base_url, "client config loaded");
        cfg
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }

    /// Applies a camelCase JSON patch. Unknown keys and mistyped values are
    /// rejected as a whole.
    pub fn apply_patch(&mut self, patch: &serde_json::Value) -> Result<(), String> {
        let Some(obj) = patch.as_object() else {
            return Err("config patch must be an object".to_string());
        };
        let mut next = self.clone();
        for (k, v) in obj {
            match k.as_str() {
                "apiBaseUrl" => {
                    let Some(s) = v.as_str().map(str::trim).filter(|s| !s.is_empty()) else {
                        return Err("apiBaseUrl must be a non-empty string".to_string());
                    };
                    if !(s.starts_with("http://") || s.starts_with("https://")) {
                        return Err("apiBaseUrl must start with http:// or https://".to_string());
                    }
                    next.api_base_url = s.trim_end_matches('/').to_string();
                }
                "requestTimeoutSecs" => {
                    if v.is_null() {
                        next.request_timeout_secs = None;
                    } else {
                        let Some(n) = v.as_u64() else {
                            return Err("requestTimeoutSecs must be a non-negative integer or null"
                                .to_string());
                        };
                        next.request_timeout_secs = Some(n);
                    }
                }
                "quizQuestionCount" => {
                    let Some(n) = v
                        .as_u64()
                        .map(|n| n as usize)
                        .filter(|n| QUIZ_QUESTION_RANGE.contains(n))
                    else {
                        return Err("quizQuestionCount must be between 1 and 200".to_string());
                    };
                    next.quiz_question_count = n;
                }
                other => return Err(format!("unknown config key: {other}")),
            }
        }
        *self = next;
        Ok(())
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(key: &str) -> Option<T>
where
    T::Err: Display,
{
    let raw = var(key)?;
    raw.parse()
        .map_err(|e| {
            warn!("Invalid {key} value {raw:?}: {e}");
        })
        .ok()
}
