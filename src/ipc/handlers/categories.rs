use crate::api::endpoints;
use crate::ipc::helpers::{
    apply_saved, ctx, fetch_list, optional_bool, required_str, respond, saved_result,
    validation_err, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::models::Category;
use crate::storage::{KeyValueStore, Scope};
use crate::upload::{self, CategoryDraft};
use serde_json::json;

const KEYS: &[&str] = &["categories", "categorie"];

/// Local storage key of the homepage's read-through cache.
pub const CACHE_KEY: &str = "categories";

fn handle_list(state: &mut AppState, req: &Request) -> HandlerResult {
    let prefer_cache = optional_bool(req, "preferCache");
    let mut c = ctx(state)?;

    if prefer_cache {
        if let Some(raw) = c.storages.get(Scope::Local, CACHE_KEY)? {
            match serde_json::from_str::<Vec<Category>>(&raw) {
                Ok(items) => {
                    c.store.categories.set_all(items);
                    return Ok(json!({
                        "categories": c.store.categories.snapshot(),
                        "fromCache": true,
                    }));
                }
                Err(e) => tracing::warn!(error = %e, "discarding unreadable categories cache"),
            }
        }
    }

    let items: Vec<Category> = fetch_list(&c.client, endpoints::CATEGORIES, KEYS)?;
    let raw = serde_json::to_string(&items)
        .map_err(|e| HandlerErr::new("storage_failed", e.to_string()))?;
    c.storages.scope(Scope::Local).set(CACHE_KEY, &raw)?;
    c.store.categories.set_all(items);
    Ok(json!({
        "categories": c.store.categories.snapshot(),
        "fromCache": false,
    }))
}

fn draft_param(req: &Request) -> Result<CategoryDraft, HandlerErr> {
    let draft = req
        .params
        .get("draft")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing draft"))?;
    serde_json::from_value(draft).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

fn handle_save(state: &mut AppState, req: &Request, category_id: Option<&str>) -> HandlerResult {
    let draft = draft_param(req)?;
    let issues = upload::validate_category(&draft);
    if !issues.is_empty() {
        return Err(validation_err(issues));
    }
    let form = upload::build_category_form(&draft)?;

    let mut c = ctx(state)?;
    let resp = match category_id {
        Some(id) => c
            .client
            .put_multipart(&endpoints::item(endpoints::CATEGORIES, id), form)?,
        None => c.client.post_multipart(endpoints::CATEGORIES, form)?,
    };
    let item = apply_saved(
        &c.client,
        &mut c.store.categories,
        &resp,
        endpoints::CATEGORIES,
        KEYS,
    )?;
    // The homepage cache would now be stale.
    c.storages.scope(Scope::Local).remove(CACHE_KEY)?;
    Ok(saved_result(item, &c.store.categories))
}

fn handle_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let category_id = required_str(req, "categoryId")?;
    let mut c = ctx(state)?;
    c.client
        .delete(&endpoints::item(endpoints::CATEGORIES, category_id))?;
    let removed = c.store.categories.remove(category_id).is_some();
    c.storages.scope(Scope::Local).remove(CACHE_KEY)?;
    Ok(json!({ "removed": removed, "items": c.store.categories.snapshot() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "categories.list" => handle_list(state, req),
        "categories.create" => handle_save(state, req, None),
        "categories.update" => {
            required_str(req, "categoryId").and_then(|id| handle_save(state, req, Some(id)))
        }
        "categories.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
