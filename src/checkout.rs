use crate::api::{endpoints, ApiClient, ApiError, ApiResult};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Asks the backend for a hosted checkout session. Card collection happens
/// entirely on the processor's page.
pub fn create_checkout_session(client: &ApiClient<'_>, plan_id: &str) -> ApiResult<CheckoutSession> {
    let plan_id = plan_id.trim();
    if plan_id.is_empty() {
        return Err(ApiError::validation("planId", "planId is required"));
    }
    let resp = client.post(endpoints::CHECKOUT_SESSION, &json!({ "planId": plan_id }))?;

    let session_id = ["id", "sessionId"]
        .iter()
        .find_map(|k| resp.get(*k).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Decode("checkout response carries no session id".to_string()))?
        .to_string();
    let url = resp
        .get("url")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    tracing::info!(plan_id, "checkout session created");
    Ok(CheckoutSession { session_id, url })
}
