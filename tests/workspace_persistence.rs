mod test_support;

use elearnd::api::Method;
use serde_json::json;
use test_support::{call, call_ok, error_code, scripted_state, temp_dir, Reply, ScriptedTransport};

fn login_route(t: &ScriptedTransport) {
    t.route(
        Method::Post,
        "/login",
        Reply::Json(200, json!({ "token": "learner-token", "user": { "_id": "u1", "name": "Ada" } })),
    );
}

fn open(state: &mut elearnd::ipc::AppState, dir: &std::path::Path) -> serde_json::Value {
    call_ok(
        state,
        "ws",
        "workspace.select",
        json!({ "path": dir.to_string_lossy() }),
    )
}

#[test]
fn remembered_session_survives_restart() {
    let dir = temp_dir("elearn-ws-remember");
    {
        let (mut state, t) = scripted_state();
        login_route(&t);
        open(&mut state, &dir);
        let out = call_ok(
            &mut state,
            "1",
            "session.login",
            json!({ "role": "learner", "email": "a@b.com", "password": "secret1", "remember": true }),
        );
        assert_eq!(out["session"]["scope"], "local");
    }

    let (mut state, _t) = scripted_state();
    open(&mut state, &dir);
    let current = call_ok(&mut state, "2", "session.current", json!({ "role": "learner" }));
    assert_eq!(current["session"]["token"], "learner-token");
    assert_eq!(current["session"]["user"]["name"], "Ada");

    let check = call_ok(&mut state, "3", "session.check", json!({ "role": "learner" }));
    assert_eq!(check["access"]["authenticated"], true);
    assert_eq!(check["access"]["route"], "/");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn tab_session_ends_with_the_process() {
    let dir = temp_dir("elearn-ws-tab");
    {
        let (mut state, t) = scripted_state();
        login_route(&t);
        open(&mut state, &dir);
        let out = call_ok(
            &mut state,
            "1",
            "session.login",
            json!({ "role": "learner", "email": "a@b.com", "password": "secret1" }),
        );
        assert_eq!(out["session"]["scope"], "tab");
    }

    let (mut state, _t) = scripted_state();
    open(&mut state, &dir);
    let current = call_ok(&mut state, "2", "session.current", json!({ "role": "learner" }));
    assert!(current["session"].is_null());
    let check = call_ok(&mut state, "3", "session.check", json!({ "role": "learner" }));
    assert_eq!(check["access"]["route"], "/login");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn categories_cache_reads_through_local_storage() {
    let dir = temp_dir("elearn-ws-categories");
    {
        let (mut state, t) = scripted_state();
        t.route(
            Method::Get,
            "/categorie",
            Reply::Json(200, json!([{ "_id": "k1", "title": "Web" }, { "_id": "k2", "title": "Systems" }])),
        );
        open(&mut state, &dir);
        let first = call_ok(&mut state, "1", "categories.list", json!({ "preferCache": true }));
        assert_eq!(first["fromCache"], false);
        let second = call_ok(&mut state, "2", "categories.list", json!({ "preferCache": true }));
        assert_eq!(second["fromCache"], true);
        assert_eq!(t.count(Method::Get, "/categorie"), 1);
    }

    let (mut state, t) = scripted_state();
    open(&mut state, &dir);
    let cached = call_ok(&mut state, "3", "categories.list", json!({ "preferCache": true }));
    assert_eq!(cached["fromCache"], true);
    assert_eq!(cached["categories"][1]["title"], "Systems");
    assert!(t.requests().is_empty());

    // Without preferCache the server is asked again.
    let resp = call(&mut state, "4", "categories.list", json!({}));
    assert_eq!(error_code(&resp), Some("http_error"));
    assert_eq!(t.count(Method::Get, "/categorie"), 1);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn deleting_a_category_invalidates_cache() {
    let (mut state, t) = scripted_state();
    t.route(
        Method::Get,
        "/categorie",
        Reply::Json(200, json!([{ "_id": "k1", "title": "Web" }])),
    )
    .route(Method::Delete, "/categorie/k1", Reply::Json(200, json!({ "message": "deleted" })));

    call_ok(&mut state, "1", "categories.list", json!({ "preferCache": true }));
    let out = call_ok(&mut state, "2", "categories.delete", json!({ "categoryId": "k1" }));
    assert_eq!(out["removed"], true);

    let again = call_ok(&mut state, "3", "categories.list", json!({ "preferCache": true }));
    assert_eq!(again["fromCache"], false);
    assert_eq!(t.count(Method::Get, "/categorie"), 2);
}

#[test]
fn config_overrides_persist_per_workspace() {
    let dir = temp_dir("elearn-ws-config");
    {
        let (mut state, _t) = scripted_state();
        let unsaved = call_ok(&mut state, "1", "config.set", json!({ "patch": { "quizQuestionCount": 5 } }));
        assert_eq!(unsaved["persisted"], false);

        open(&mut state, &dir);
        let saved = call_ok(
            &mut state,
            "2",
            "config.set",
            json!({ "patch": { "quizQuestionCount": 10, "apiBaseUrl": "https://api.school.test/" } }),
        );
        assert_eq!(saved["persisted"], true);
        assert_eq!(saved["config"]["apiBaseUrl"], "https://api.school.test");
    }

    let (mut state, _t) = scripted_state();
    let selected = open(&mut state, &dir);
    assert_eq!(selected["config"]["quizQuestionCount"], 10);
    let got = call_ok(&mut state, "3", "config.get", json!({}));
    assert_eq!(got["config"]["apiBaseUrl"], "https://api.school.test");

    let bad = call(&mut state, "4", "config.set", json!({ "patch": { "theme": "dark" } }));
    assert_eq!(error_code(&bad), Some("bad_params"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn remembered_login_before_workspace_moves_into_it() {
    let dir = temp_dir("elearn-ws-early-login");
    {
        let (mut state, t) = scripted_state();
        login_route(&t);
        call_ok(
            &mut state,
            "1",
            "session.login",
            json!({ "role": "learner", "email": "a@b.com", "password": "secret1", "remember": true }),
        );
        open(&mut state, &dir);

        let current = call_ok(&mut state, "2", "session.current", json!({ "role": "learner" }));
        assert_eq!(current["session"]["token"], "learner-token");
        assert_eq!(current["session"]["scope"], "local");

        // Logging out after the switch leaves nothing behind.
        call_ok(&mut state, "3", "session.logout", json!({ "role": "learner" }));
        let gone = call_ok(&mut state, "4", "session.current", json!({ "role": "learner" }));
        assert!(gone["session"].is_null());
        call_ok(
            &mut state,
            "5",
            "session.login",
            json!({ "role": "learner", "email": "a@b.com", "password": "secret1", "remember": true }),
        );
    }

    let (mut state, _t) = scripted_state();
    open(&mut state, &dir);
    let current = call_ok(&mut state, "6", "session.current", json!({ "role": "learner" }));
    assert_eq!(current["session"]["token"], "learner-token");
    let _ = std::fs::remove_dir_all(dir);
}
