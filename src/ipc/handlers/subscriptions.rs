use crate::api::endpoints;
use crate::ipc::helpers::{ctx, refresh, respond, HandlerResult};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_subscriptions_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let mut c = ctx(state)?;
    let items = refresh(
        &c.client,
        &mut c.store.subscriptions,
        endpoints::SUBSCRIPTIONS,
        &["subscriptions", "abonnements"],
    )?;
    let now = chrono::Utc::now();
    let active = c
        .store
        .subscriptions
        .iter()
        .filter(|s| s.is_active_at(now))
        .count();
    Ok(json!({ "subscriptions": items, "activeCount": active }))
}

fn handle_payments_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let mut c = ctx(state)?;
    let items = refresh(
        &c.client,
        &mut c.store.payments,
        endpoints::PAYMENTS,
        &["payments", "paiements"],
    )?;
    let total: f64 = c.store.payments.iter().map(|p| p.amount()).sum();
    Ok(json!({ "payments": items, "totalAmount": total }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "subscriptions.list" => handle_subscriptions_list(state, req),
        "payments.list" => handle_payments_list(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
