#![allow(dead_code)]

use elearnd::api::{ApiError, ApiRequest, ApiResponse, ApiResult, Method, Transport};
use elearnd::config::ClientConfig;
use elearnd::ipc::{self, AppState, Request};
use serde_json::json;
use std::cell::RefCell;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

/// Spawns the daemon pointed at a port nothing listens on, so every backend
/// call fails at the network level.
pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    spawn_sidecar_with_env(&[])
}

pub fn spawn_sidecar_with_env(
    vars: &[(&str, &str)],
) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_elearnd");
    let mut cmd = Command::new(exe);
    cmd.env("ELEARND_API_URL", "http://127.0.0.1:9")
        .env("ELEARND_TIMEOUT_SECS", "5")
        .env("ELEARND_LOG", "off")
        .env_remove("ELEARND_QUIZ_QUESTIONS");
    for (k, v) in vars {
        cmd.env(k, v);
    }
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn elearnd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

pub fn error_code(resp: &serde_json::Value) -> Option<&str> {
    resp.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

#[derive(Clone)]
pub enum Reply {
    Json(u16, serde_json::Value),
    Down,
}

struct Route {
    method: Method,
    path: String,
    reply: Reply,
}

#[derive(Default)]
struct Script {
    routes: Vec<Route>,
    seen: Vec<ApiRequest>,
}

/// In-process backend double. Unrouted requests answer 404.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later routes for the same method and path take precedence.
    pub fn route(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.inner.borrow_mut().routes.push(Route {
            method,
            path: path.to_string(),
            reply,
        });
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.borrow().seen.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.inner
            .borrow()
            .seen
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last(&self, method: Method, path: &str) -> Option<ApiRequest> {
        self.inner
            .borrow()
            .seen
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, _base_url: &str, req: &ApiRequest) -> ApiResult<ApiResponse> {
        let mut script = self.inner.borrow_mut();
        script.seen.push(req.clone());
        let reply = script
            .routes
            .iter()
            .rev()
            .find(|r| r.method == req.method && r.path == req.path)
            .map(|r| r.reply.clone());
        match reply {
            Some(Reply::Json(status, body)) => Ok(ApiResponse {
                status,
                body: serde_json::to_vec(&body).expect("encode body"),
            }),
            Some(Reply::Down) => Err(ApiError::Network("connection refused".to_string())),
            None => Ok(ApiResponse {
                status: 404,
                body: br#"{"message":"route not scripted"}"#.to_vec(),
            }),
        }
    }
}

pub fn scripted_state() -> (AppState, ScriptedTransport) {
    let transport = ScriptedTransport::new();
    let state = AppState::new(ClientConfig::default(), Box::new(transport.clone()));
    (state, transport)
}

pub fn call(
    state: &mut AppState,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let resp = ipc::handle_request(
        state,
        Request {
            id: id.to_string(),
            method: method.to_string(),
            params,
        },
    );
    assert_eq!(resp.get("id").and_then(|v| v.as_str()), Some(id));
    resp
}

pub fn call_ok(
    state: &mut AppState,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let resp = call(state, id, method, params);
    assert!(
        resp.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        resp
    );
    resp.get("result").cloned().unwrap_or_else(|| json!({}))
}

pub fn quiz_question(i: usize) -> serde_json::Value {
    json!({
        "question": format!("Question {}?", i + 1),
        "options": ["Ownership", "Garbage collection"],
        "correctAnswer": "Ownership"
    })
}

pub fn quiz_draft(count: usize) -> serde_json::Value {
    json!({
        "course": "course-1",
        "duration": 30,
        "questions": (0..count).map(quiz_question).collect::<Vec<_>>(),
    })
}
