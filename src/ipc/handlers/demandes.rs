use crate::api::{decode_entity, endpoints, ValidationIssue};
use crate::ipc::helpers::{
    ctx, fetch_list, refresh, required_str, respond, saved_result, validation_err, HandlerErr,
    HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::models::{Demande, DemandeStatus};
use serde_json::{json, Value};

const KEYS: &[&str] = &["demandes", "demande"];

fn handle_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let mut c = ctx(state)?;
    let items = refresh(&c.client, &mut c.store.demandes, endpoints::DEMANDES, KEYS)?;
    // Drop a selection whose demande disappeared from the server list.
    let stale = c
        .store
        .selected_demande
        .as_deref()
        .is_some_and(|sel| !c.store.demandes.contains(sel));
    if stale {
        c.store.selected_demande = None;
    }
    Ok(json!({ "demandes": items }))
}

fn application_param(req: &Request) -> Result<Value, HandlerErr> {
    let app = req
        .params
        .get("application")
        .filter(|v| v.is_object())
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing application object"))?;
    let mut issues = Vec::new();
    for field in ["name", "email"] {
        let v = app.get(field).and_then(|v| v.as_str()).unwrap_or("");
        if v.trim().is_empty() {
            issues.push(ValidationIssue::new(field, format!("{field} is required")));
        }
    }
    if let Some(email) = app.get("email").and_then(|v| v.as_str()) {
        if !email.trim().is_empty() && !email.contains('@') {
            issues.push(ValidationIssue::new("email", "email must be a valid address"));
        }
    }
    if !issues.is_empty() {
        return Err(validation_err(issues));
    }
    Ok(app)
}

/// Instructor application from the public site.
fn handle_submit(state: &mut AppState, req: &Request) -> HandlerResult {
    let app = application_param(req)?;
    let mut c = ctx(state)?;
    let resp = c.client.post(endpoints::DEMANDES, &app)?;
    let item = match decode_entity::<Demande>(&resp, KEYS) {
        Some(d) => {
            c.store.demandes.upsert(d.clone());
            Some(d)
        }
        None => None,
    };
    Ok(json!({ "demande": item }))
}

fn handle_open(state: &mut AppState, req: &Request) -> HandlerResult {
    let demande_id = required_str(req, "demandeId")?;
    let Some(d) = state.store.demandes.get(demande_id) else {
        return Err(HandlerErr::new("not_found", "demande not found")
            .with_details(json!({ "demandeId": demande_id })));
    };
    let d = d.clone();
    state.store.selected_demande = Some(demande_id.to_string());
    Ok(json!({ "demande": d, "selected": demande_id }))
}

fn handle_close(state: &mut AppState, _req: &Request) -> HandlerResult {
    state.store.selected_demande = None;
    Ok(json!({ "selected": Value::Null }))
}

fn handle_decide(state: &mut AppState, req: &Request, action: &str) -> HandlerResult {
    let demande_id = required_str(req, "demandeId")?;
    let status = if action == endpoints::ACCEPT {
        DemandeStatus::Accepted
    } else {
        DemandeStatus::Refused
    };

    let mut c = ctx(state)?;
    let resp = c.client.put(
        &endpoints::action(endpoints::DEMANDES, demande_id, action),
        &json!({}),
    )?;

    // Whatever the server echoes, the decision just made is the status.
    if let Some(mut d) = decode_entity::<Demande>(&resp, KEYS) {
        if d.id == demande_id {
            d.status = Some(status.clone());
            c.store.demandes.upsert(d);
        }
    }
    let found = c
        .store
        .demandes
        .update_with(demande_id, |d| d.status = Some(status.clone()));
    if !found {
        // Not mirrored yet: pull the list so the decision shows up.
        let items: Vec<Demande> = fetch_list(&c.client, endpoints::DEMANDES, KEYS)?;
        c.store.demandes.set_all(items);
        c.store
            .demandes
            .update_with(demande_id, |d| d.status = Some(status.clone()));
    }
    if c.store.selected_demande.as_deref() == Some(demande_id) {
        c.store.selected_demande = None;
    }

    tracing::info!(demande_id, action, "demande decided");
    let mut out = saved_result(c.store.demandes.get(demande_id).cloned(), &c.store.demandes);
    out["selected"] = json!(c.store.selected_demande);
    Ok(out)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "demandes.list" => handle_list(state, req),
        "demandes.submit" => handle_submit(state, req),
        "demandes.open" => handle_open(state, req),
        "demandes.close" => handle_close(state, req),
        "demandes.accept" => handle_decide(state, req, endpoints::ACCEPT),
        "demandes.refuse" => handle_decide(state, req, endpoints::REFUSE),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
