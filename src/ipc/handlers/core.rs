use crate::config::{ClientConfig, SETTINGS_KEY};
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "apiBaseUrl": state.config.api_base_url,
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match db::open_db(&path) {
        Ok(conn) => {
            // Best-effort: a stored override that no longer parses must not
            // prevent the workspace from opening.
            match db::settings_get_json(&conn, SETTINGS_KEY) {
                Ok(Some(saved)) => {
                    if let Err(e) = state.config.apply_patch(&saved) {
                        tracing::warn!(error = %e, "ignoring saved client config");
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "failed to read saved client config"),
            }

            if let Err(e) = state.storage.attach_db(conn) {
                return err(&req.id, "storage_failed", format!("{e:#}"), None);
            }
            tracing::info!(path = %path.to_string_lossy(), "workspace selected");
            state.workspace = Some(path.clone());
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "config": state.config,
                }),
            )
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

fn handle_config_get(state: &mut AppState, _req: &Request) -> HandlerResult {
    Ok(json!({ "config": state.config }))
}

fn handle_config_set(state: &mut AppState, req: &Request) -> HandlerResult {
    let patch = req
        .params
        .get("patch")
        .ok_or_else(|| HandlerErr::bad_params("missing patch"))?;
    let mut next: ClientConfig = state.config.clone();
    next.apply_patch(patch).map_err(HandlerErr::bad_params)?;

    let persisted = match state.storage.db.as_ref() {
        Some(conn) => {
            let value = serde_json::to_value(&next)
                .map_err(|e| HandlerErr::new("storage_failed", e.to_string()))?;
            db::settings_set_json(conn, SETTINGS_KEY, &value)?;
            true
        }
        None => false,
    };
    state.config = next;
    Ok(json!({ "config": state.config, "persisted": persisted }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "config.get" => Some(respond(&req.id, handle_config_get(state, req))),
        "config.set" => Some(respond(&req.id, handle_config_set(state, req))),
        _ => None,
    }
}
