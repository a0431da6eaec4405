use crate::api::{endpoints, ValidationIssue};
use crate::ipc::helpers::{
    apply_saved, ctx, refresh, required_str, respond, saved_result, validation_err, HandlerErr,
    HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};

const KEYS: &[&str] = &["plans", "plan", "planabonnement"];

fn plan_param(req: &Request) -> Result<Value, HandlerErr> {
    let plan = req
        .params
        .get("plan")
        .filter(|v| v.is_object())
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing plan object"))?;

    let mut issues = Vec::new();
    let name = plan.get("name").and_then(|v| v.as_str()).unwrap_or("");
    if name.trim().is_empty() {
        issues.push(ValidationIssue::new("name", "name is required"));
    }
    match plan.get("price").and_then(|v| v.as_f64()) {
        Some(p) if p >= 0.0 => {}
        _ => issues.push(ValidationIssue::new(
            "price",
            "price must be a non-negative number",
        )),
    }
    if !issues.is_empty() {
        return Err(validation_err(issues));
    }
    Ok(plan)
}

fn handle_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let mut c = ctx(state)?;
    let plans = refresh(&c.client, &mut c.store.plans, endpoints::PLANS, KEYS)?;
    Ok(json!({ "plans": plans }))
}

fn handle_save(state: &mut AppState, req: &Request, plan_id: Option<&str>) -> HandlerResult {
    let plan = plan_param(req)?;
    let mut c = ctx(state)?;
    let resp = match plan_id {
        Some(id) => c.client.put(&endpoints::item(endpoints::PLANS, id), &plan)?,
        None => c.client.post(endpoints::PLANS, &plan)?,
    };
    let item = apply_saved(&c.client, &mut c.store.plans, &resp, endpoints::PLANS, KEYS)?;
    Ok(saved_result(item, &c.store.plans))
}

fn handle_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let plan_id = required_str(req, "planId")?;
    let mut c = ctx(state)?;
    c.client.delete(&endpoints::item(endpoints::PLANS, plan_id))?;
    let removed = c.store.plans.remove(plan_id).is_some();
    Ok(json!({ "removed": removed, "items": c.store.plans.snapshot() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "plans.list" => handle_list(state, req),
        "plans.create" => handle_save(state, req, None),
        "plans.update" => {
            required_str(req, "planId").and_then(|id| handle_save(state, req, Some(id)))
        }
        "plans.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
