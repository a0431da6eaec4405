use super::error::{error_message, ApiError, ApiResult};
use super::transport::{ApiRequest, Body, Method, MultipartForm, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// One REST client bound to a base URL and, optionally, a bearer token.
/// Every call is exactly one request: no retries, no backoff.
pub struct ApiClient<'a> {
    transport: &'a dyn Transport,
    base_url: &'a str,
    bearer: Option<String>,
    timeout: Option<Duration>,
}

impl<'a> ApiClient<'a> {
    pub fn new(transport: &'a dyn Transport, base_url: &'a str) -> Self {
        Self {
            transport,
            base_url,
            bearer: None,
            timeout: None,
        }
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_bearer(&self) -> bool {
        self.bearer.is_some()
    }

    pub fn transport(&self) -> &'a dyn Transport {
        self.transport
    }

    pub fn base_url(&self) -> &'a str {
        self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn get(&self, path: &str) -> ApiResult<Value> {
        self.send(Method::Get, path, Body::Empty)
    }

    pub fn delete(&self, path: &str) -> ApiResult<Value> {
        self.send(Method::Delete, path, Body::Empty)
    }

    pub fn post<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.send(Method::Post, path, Body::Json(to_json(body)?))
    }

    pub fn put<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.send(Method::Put, path, Body::Json(to_json(body)?))
    }

    pub fn post_multipart(&self, path: &str, form: MultipartForm) -> ApiResult<Value> {
        self.send(Method::Post, path, Body::Multipart(form))
    }

    pub fn put_multipart(&self, path: &str, form: MultipartForm) -> ApiResult<Value> {
        self.send(Method::Put, path, Body::Multipart(form))
    }

    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        decode(self.get(path)?)
    }

    pub fn send(&self, method: Method, path: &str, body: Body) -> ApiResult<Value> {
        let req = ApiRequest {
            method,
            path: path.to_string(),
            bearer: self.bearer.clone(),
            body,
            timeout: self.timeout,
        };
        tracing::debug!(method = method.as_str(), path, "api request");

        let resp = match self.transport.send(self.base_url, &req) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(method = method.as_str(), path, error = %e, "api request failed");
                return Err(e);
            }
        };

        if !resp.is_success() {
            let message = error_message(resp.status, &resp.body);
            tracing::warn!(
                method = method.as_str(),
                path,
                status = resp.status,
                %message,
                "api error response"
            );
            return Err(ApiError::Http {
                status: resp.status,
                message,
            });
        }

        if resp.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&resp.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn to_json<B: Serialize>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(v: Value) -> ApiResult<T> {
    serde_json::from_value(v).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Decodes a list response. The server sometimes wraps the array
/// (`{"data": [...]}`, `{"courses": [...]}`); unwrap the first matching key.
pub fn decode_list<T: DeserializeOwned>(v: Value, keys: &[&str]) -> ApiResult<Vec<T>> {
    match v {
        Value::Array(_) => decode(v),
        Value::Null => Ok(Vec::new()),
        Value::Object(ref map) => {
            for key in keys.iter().copied().chain(["data"]) {
                if let Some(inner @ Value::Array(_)) = map.get(key) {
                    return decode(inner.clone());
                }
            }
            Err(ApiError::Decode(format!(
                "expected a list under one of {:?}",
                keys
            )))
        }
        other => Err(ApiError::Decode(format!(
            "expected a list, got {}",
            other
        ))),
    }
}

/// Decodes a single entity that may come wrapped under a resource key or a
/// generic `data` key. Returns `None` for bodies that carry only a message.
pub fn decode_entity<T: DeserializeOwned>(v: &Value, keys: &[&str]) -> Option<T> {
    let Value::Object(map) = v else {
        return None;
    };
    if map.contains_key("_id") {
        return serde_json::from_value(v.clone()).ok();
    }
    for key in keys.iter().copied().chain(["data"]) {
        if let Some(inner @ Value::Object(_)) = map.get(key) {
            if let Ok(t) = serde_json::from_value(inner.clone()) {
                return Some(t);
            }
        }
    }
    None
}
