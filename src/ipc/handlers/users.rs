use crate::api::endpoints;
use crate::ipc::helpers::{
    apply_saved, ctx, refresh, required_str, respond, saved_result, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

const PROF_KEYS: &[&str] = &["professeurs", "professeur", "professors"];
const LEARNER_KEYS: &[&str] = &["apprenants", "apprenant", "users"];

fn handle_professors_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let mut c = ctx(state)?;
    let items = refresh(
        &c.client,
        &mut c.store.professors,
        endpoints::PROFESSORS,
        PROF_KEYS,
    )?;
    Ok(json!({ "professors": items }))
}

fn handle_professors_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let professor_id = required_str(req, "professorId")?;
    let patch = req
        .params
        .get("patch")
        .filter(|v| v.is_object())
        .ok_or_else(|| HandlerErr::bad_params("missing patch object"))?;
    let mut c = ctx(state)?;
    let resp = c
        .client
        .put(&endpoints::item(endpoints::PROFESSORS, professor_id), patch)?;
    let item = apply_saved(
        &c.client,
        &mut c.store.professors,
        &resp,
        endpoints::PROFESSORS,
        PROF_KEYS,
    )?;
    Ok(saved_result(item, &c.store.professors))
}

fn handle_professors_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let professor_id = required_str(req, "professorId")?;
    let mut c = ctx(state)?;
    c.client
        .delete(&endpoints::item(endpoints::PROFESSORS, professor_id))?;
    let removed = c.store.professors.remove(professor_id).is_some();
    Ok(json!({ "removed": removed, "items": c.store.professors.snapshot() }))
}

fn handle_learners_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let mut c = ctx(state)?;
    let items = refresh(
        &c.client,
        &mut c.store.learners,
        endpoints::LEARNERS,
        LEARNER_KEYS,
    )?;
    Ok(json!({ "learners": items }))
}

fn handle_learners_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let learner_id = required_str(req, "learnerId")?;
    let mut c = ctx(state)?;
    c.client
        .delete(&endpoints::item(endpoints::LEARNERS, learner_id))?;
    let removed = c.store.learners.remove(learner_id).is_some();
    Ok(json!({ "removed": removed, "items": c.store.learners.snapshot() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "professors.list" => handle_professors_list(state, req),
        "professors.update" => handle_professors_update(state, req),
        "professors.delete" => handle_professors_delete(state, req),
        "learners.list" => handle_learners_list(state, req),
        "learners.delete" => handle_learners_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
