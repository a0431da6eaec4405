mod test_support;

use elearnd::api::Method;
use serde_json::json;
use test_support::{call, call_ok, error_code, scripted_state, Reply, ScriptedTransport};

fn pending() -> serde_json::Value {
    json!([
        { "_id": "d1", "name": "Grace", "email": "grace@navy.mil", "status": "en attente" },
        { "_id": "d2", "name": "Linus", "email": "linus@kernel.org", "status": "en attente" }
    ])
}

fn admin_backend(t: &ScriptedTransport) {
    t.route(
        Method::Post,
        "/admin/login",
        Reply::Json(200, json!({ "token": "admin-token", "admin": { "_id": "ad1", "name": "Root" } })),
    )
    .route(Method::Get, "/demandes", Reply::Json(200, pending()));
}

fn login_admin(state: &mut elearnd::ipc::AppState) {
    let out = call_ok(
        state,
        "login",
        "session.login",
        json!({ "role": "admin", "email": "root@site.test", "password": "hunter22" }),
    );
    assert_eq!(out["route"], "/admin");
}

fn status_of<'a>(items: &'a serde_json::Value, id: &str) -> Option<&'a str> {
    items
        .as_array()?
        .iter()
        .find(|d| d["_id"] == id)
        .and_then(|d| d["status"].as_str())
}

#[test]
fn admin_refuses_pending_application() {
    let (mut state, t) = scripted_state();
    admin_backend(&t);
    t.route(
        Method::Put,
        "/demandes/d1/refuser",
        Reply::Json(200, json!({ "message": "Demande refusée" })),
    );
    login_admin(&mut state);

    let listed = call_ok(&mut state, "1", "demandes.list", json!({}));
    assert_eq!(status_of(&listed["demandes"], "d1"), Some("en attente"));

    let opened = call_ok(&mut state, "2", "demandes.open", json!({ "demandeId": "d1" }));
    assert_eq!(opened["selected"], "d1");

    let out = call_ok(&mut state, "3", "demandes.refuse", json!({ "demandeId": "d1" }));
    assert_eq!(out["item"]["status"], "refusée");
    assert!(out["selected"].is_null());
    assert_eq!(status_of(&out["items"], "d2"), Some("en attente"));

    let sent = t.last(Method::Put, "/demandes/d1/refuser").expect("refusal sent");
    assert_eq!(sent.bearer.as_deref(), Some("admin-token"));
    // The entry was already mirrored, so no second list fetch.
    assert_eq!(t.count(Method::Get, "/demandes"), 1);

    let stored = call_ok(&mut state, "4", "store.get", json!({ "resource": "demandes" }));
    assert_eq!(status_of(&stored["items"], "d1"), Some("refusée"));
}

#[test]
fn accepting_keeps_other_selection_open() {
    let (mut state, t) = scripted_state();
    admin_backend(&t);
    t.route(
        Method::Put,
        "/demandes/d2/accepter",
        Reply::Json(200, json!({ "demande": { "_id": "d2", "name": "Linus", "status": "en attente" } })),
    );
    login_admin(&mut state);
    call_ok(&mut state, "1", "demandes.list", json!({}));
    call_ok(&mut state, "2", "demandes.open", json!({ "demandeId": "d1" }));

    let out = call_ok(&mut state, "3", "demandes.accept", json!({ "demandeId": "d2" }));
    // The decision wins over a stale echo from the server.
    assert_eq!(out["item"]["status"], "acceptée");
    assert_eq!(out["selected"], "d1");
}

#[test]
fn decision_on_unmirrored_entry_refetches_list() {
    let (mut state, t) = scripted_state();
    admin_backend(&t);
    t.route(
        Method::Put,
        "/demandes/d2/accepter",
        Reply::Json(200, json!({ "message": "ok" })),
    );
    login_admin(&mut state);

    let out = call_ok(&mut state, "1", "demandes.accept", json!({ "demandeId": "d2" }));
    assert_eq!(t.count(Method::Get, "/demandes"), 1);
    assert_eq!(status_of(&out["items"], "d2"), Some("acceptée"));
    assert_eq!(status_of(&out["items"], "d1"), Some("en attente"));
}

#[test]
fn failed_refusal_leaves_state_alone() {
    let (mut state, t) = scripted_state();
    admin_backend(&t);
    t.route(
        Method::Put,
        "/demandes/d1/refuser",
        Reply::Json(500, json!({ "message": "database unavailable" })),
    );
    login_admin(&mut state);
    call_ok(&mut state, "1", "demandes.list", json!({}));
    call_ok(&mut state, "2", "demandes.open", json!({ "demandeId": "d1" }));

    let resp = call(&mut state, "3", "demandes.refuse", json!({ "demandeId": "d1" }));
    assert_eq!(error_code(&resp), Some("http_error"));
    assert_eq!(resp["error"]["message"], "database unavailable");

    let stored = call_ok(&mut state, "4", "store.get", json!({ "resource": "demandes" }));
    assert_eq!(status_of(&stored["items"], "d1"), Some("en attente"));
    let again = call_ok(&mut state, "5", "demandes.open", json!({ "demandeId": "d1" }));
    assert_eq!(again["selected"], "d1");
}

#[test]
fn opening_unknown_application_is_not_found() {
    let (mut state, _t) = scripted_state();
    let resp = call(&mut state, "1", "demandes.open", json!({ "demandeId": "nope" }));
    assert_eq!(error_code(&resp), Some("not_found"));
}

#[test]
fn list_drops_selection_that_vanished() {
    let (mut state, t) = scripted_state();
    admin_backend(&t);
    login_admin(&mut state);
    call_ok(&mut state, "1", "demandes.list", json!({}));
    call_ok(&mut state, "2", "demandes.open", json!({ "demandeId": "d2" }));

    t.route(
        Method::Get,
        "/demandes",
        Reply::Json(200, json!({ "demandes": [{ "_id": "d1", "status": "en attente" }] })),
    );
    call_ok(&mut state, "3", "demandes.list", json!({}));
    let resp = call(&mut state, "4", "demandes.open", json!({ "demandeId": "d2" }));
    assert_eq!(error_code(&resp), Some("not_found"));
}

#[test]
fn application_submission_is_validated() {
    let (mut state, t) = scripted_state();
    let resp = call(
        &mut state,
        "1",
        "demandes.submit",
        json!({ "application": { "name": "Grace", "email": "not-an-address" } }),
    );
    assert_eq!(error_code(&resp), Some("validation_failed"));
    assert!(t.requests().is_empty());
}
