use crate::ipc::helpers::{ctx, optional_bool, params, respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::session::{self, Credentials, Registration, Role};
use serde_json::json;

fn role_param(req: &Request) -> Result<Role, HandlerErr> {
    let raw = req
        .params
        .get("role")
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::bad_params("missing role"))?;
    Role::parse(raw).ok_or_else(|| {
        HandlerErr::bad_params("role must be one of: learner, instructor, admin")
            .with_details(json!({ "role": raw }))
    })
}

fn handle_login(state: &mut AppState, req: &Request) -> HandlerResult {
    let role = role_param(req)?;
    let credentials: Credentials = params(req)?;
    let remember = optional_bool(req, "remember");

    let mut c = ctx(state)?;
    let s = session::login(&c.client, &mut c.storages, role, &credentials, remember)?;
    Ok(json!({
        "session": s,
        "route": role.spec().home_route,
    }))
}

fn handle_logout(state: &mut AppState, req: &Request) -> HandlerResult {
    let role = role_param(req)?;
    let mut c = ctx(state)?;
    let outcome = session::logout(&c.client, &mut c.storages, role)?;
    Ok(json!({
        "outcome": outcome,
        "route": role.spec().login_route,
    }))
}

fn handle_current(state: &mut AppState, req: &Request) -> HandlerResult {
    let role = role_param(req)?;
    let storages = state.storage.storages();
    let s = session::current(&storages, role)?;
    Ok(json!({ "session": s }))
}

fn handle_check(state: &mut AppState, req: &Request) -> HandlerResult {
    let role = role_param(req)?;
    let storages = state.storage.storages();
    let check = session::check(&storages, role)?;
    Ok(json!({ "access": check }))
}

fn handle_register(state: &mut AppState, req: &Request) -> HandlerResult {
    let reg: Registration = params(req)?;
    let c = ctx(state)?;
    let user = session::register(&c.client, &reg)?;
    Ok(json!({ "user": user }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "session.login" => handle_login(state, req),
        "session.logout" => handle_logout(state, req),
        "session.current" => handle_current(state, req),
        "session.check" => handle_check(state, req),
        "session.register" => handle_register(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
