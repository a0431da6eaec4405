use crate::api::{decode_entity, decode_list, ApiClient, ApiError};
use crate::config::ClientConfig;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session;
use crate::storage::Storages;
use crate::store::{Collection, Entity, Store};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<ApiError> for HandlerErr {
    fn from(e: ApiError) -> Self {
        let message = e.to_string();
        match e {
            ApiError::Network(_) => HandlerErr::new("network_error", message),
            ApiError::Http { status, message } if status == 401 || status == 403 => {
                HandlerErr::new("unauthorized", message).with_details(json!({ "status": status }))
            }
            ApiError::Http { status, message } => {
                HandlerErr::new("http_error", message).with_details(json!({ "status": status }))
            }
            ApiError::Decode(_) => HandlerErr::new("bad_response", message),
            ApiError::Validation(issues) => HandlerErr::new("validation_failed", message)
                .with_details(json!({ "issues": issues })),
            ApiError::Storage(_) => HandlerErr::new("storage_failed", message),
        }
    }
}

impl From<anyhow::Error> for HandlerErr {
    fn from(e: anyhow::Error) -> Self {
        HandlerErr::new("storage_failed", format!("{e:#}"))
    }
}

pub type HandlerResult = Result<Value, HandlerErr>;

pub fn respond(id: &str, result: HandlerResult) -> Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => e.response(id),
    }
}

/// Everything one request needs, borrowed from the daemon state. The client
/// carries whichever bearer token storage currently yields.
pub struct Ctx<'a> {
    pub client: ApiClient<'a>,
    pub storages: Storages<'a>,
    pub store: &'a mut Store,
    pub config: &'a ClientConfig,
}

pub fn ctx(state: &mut AppState) -> Result<Ctx<'_>, HandlerErr> {
    let storages = state.storage.storages();
    let token = session::bearer_token(&storages)?;
    let client = ApiClient::new(state.transport.as_ref(), &state.config.api_base_url)
        .with_bearer(token)
        .with_timeout(state.config.timeout());
    Ok(Ctx {
        client,
        storages,
        store: &mut state.store,
        config: &state.config,
    })
}

pub fn params<T: DeserializeOwned>(req: &Request) -> Result<T, HandlerErr> {
    let raw = if req.params.is_null() {
        json!({})
    } else {
        req.params.clone()
    };
    serde_json::from_value(raw).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

pub fn required_str<'r>(req: &'r Request, key: &str) -> Result<&'r str, HandlerErr> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {key}")))
}

pub fn optional_bool(req: &Request, key: &str) -> bool {
    req.params
        .get(key)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

pub fn fetch_list<T: Entity + DeserializeOwned>(
    client: &ApiClient<'_>,
    path: &str,
    keys: &[&str],
) -> Result<Vec<T>, HandlerErr> {
    let v = client.get(path)?;
    Ok(decode_list(v, keys)?)
}

/// Replaces a collection wholesale from one GET and returns its snapshot.
pub fn refresh<T: Entity + DeserializeOwned>(
    client: &ApiClient<'_>,
    coll: &mut Collection<T>,
    path: &str,
    keys: &[&str],
) -> HandlerResult {
    let items = fetch_list(client, path, keys)?;
    coll.set_all(items);
    Ok(coll.snapshot())
}

/// Applies the entity a create/update returned. When the body carries none,
/// the collection is re-fetched once instead.
pub fn apply_saved<T: Entity + DeserializeOwned>(
    client: &ApiClient<'_>,
    coll: &mut Collection<T>,
    resp: &Value,
    path: &str,
    keys: &[&str],
) -> Result<Option<T>, HandlerErr> {
    match decode_entity::<T>(resp, keys) {
        Some(item) => {
            coll.upsert(item.clone());
            Ok(Some(item))
        }
        None => {
            tracing::debug!(path, "mutation returned no entity; re-fetching collection");
            let items = fetch_list(client, path, keys)?;
            coll.set_all(items);
            Ok(None)
        }
    }
}

pub fn saved_result<T: Entity>(item: Option<T>, coll: &Collection<T>) -> Value {
    json!({
        "item": item,
        "items": coll.snapshot(),
    })
}

pub fn validation_err(issues: Vec<crate::api::ValidationIssue>) -> HandlerErr {
    ApiError::Validation(issues).into()
}
