use crate::ipc::helpers::{required_str, respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::store::Resource;
use serde_json::json;

fn handle_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let name = required_str(req, "resource")?;
    let resource = Resource::parse(name).ok_or_else(|| {
        HandlerErr::bad_params("unknown resource").with_details(json!({
            "resource": name,
            "known": Resource::ALL.iter().map(|r| r.key()).collect::<Vec<_>>(),
        }))
    })?;
    Ok(json!({
        "resource": resource.key(),
        "items": state.store.snapshot(resource),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "store.get" => Some(respond(&req.id, handle_get(state, req))),
        _ => None,
    }
}
