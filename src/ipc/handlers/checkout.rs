use crate::api::ApiClient;
use crate::checkout;
use crate::ipc::helpers::{ctx, required_str, respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::session::{self, Role};
use serde_json::json;

fn handle_create_session(state: &mut AppState, req: &Request) -> HandlerResult {
    let plan_id = required_str(req, "planId")?;
    let c = ctx(state)?;
    let Some(learner) = session::current(&c.storages, Role::Learner)? else {
        return Err(HandlerErr::new("unauthorized", "log in as a learner to subscribe"));
    };
    // Charge the learner even when an admin token is also present.
    let client = ApiClient::new(c.client.transport(), c.client.base_url())
        .with_bearer(Some(learner.token))
        .with_timeout(c.client.timeout());
    let s = checkout::create_checkout_session(&client, plan_id)?;
    Ok(json!({ "checkout": s }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "checkout.createSession" => Some(respond(&req.id, handle_create_session(state, req))),
        _ => None,
    }
}
