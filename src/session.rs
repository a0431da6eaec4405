//! Token sessions for the three platform roles.
//!
//! One implementation serves learners, instructors and admins; a role only
//! contributes its storage keys, endpoints and the name of the user field in
//! its login response. Storage is the sole source of truth: nothing here
//! caches a session in memory.

use crate::api::{endpoints, ApiClient, ApiError, ApiResult};
use crate::storage::{KeyValueStore, Scope, Storages};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Learner,
    Instructor,
    Admin,
}

pub struct RoleSpec {
    pub token_key: &'static str,
    pub user_key: &'static str,
    /// Older keys that still get cleared on logout.
    pub extra_keys: &'static [&'static str],
    pub login_path: &'static str,
    pub logout_path: &'static str,
    pub user_fields: &'static [&'static str],
    pub home_route: &'static str,
    pub login_route: &'static str,
}

const LEARNER: RoleSpec = RoleSpec {
    token_key: "userToken",
    user_key: "currentUser",
    extra_keys: &["token"],
    login_path: endpoints::LOGIN,
    logout_path: endpoints::LOGOUT,
    user_fields: &["user", "apprenant"],
    home_route: "/",
    login_route: "/login",
};

const INSTRUCTOR: RoleSpec = RoleSpec {
    token_key: "profToken",
    user_key: "currentprof",
    extra_keys: &[],
    login_path: endpoints::PROF_LOGIN,
    logout_path: endpoints::PROF_LOGOUT,
    user_fields: &["professeur", "prof", "user"],
    home_route: "/instructor",
    login_route: "/instructor/login",
};

const ADMIN: RoleSpec = RoleSpec {
    token_key: "adminToken",
    user_key: "currentadmin",
    extra_keys: &[],
    login_path: endpoints::ADMIN_LOGIN,
    logout_path: endpoints::ADMIN_LOGOUT,
    user_fields: &["admin", "user"],
    home_route: "/admin",
    login_route: "/admin/login",
};

impl Role {
    /// Bearer precedence: the first role holding a token wins.
    pub const BEARER_ORDER: [Role; 3] = [Role::Admin, Role::Learner, Role::Instructor];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "learner" | "user" | "apprenant" | "student" => Some(Role::Learner),
            "instructor" | "prof" | "professeur" | "professor" => Some(Role::Instructor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Learner => "learner",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }

    pub fn spec(self) -> &'static RoleSpec {
        match self {
            Role::Learner => &LEARNER,
            Role::Instructor => &INSTRUCTOR,
            Role::Admin => &ADMIN,
        }
    }

    /// Every storage key owned by this role.
    pub fn keys(self) -> Vec<&'static str> {
        let spec = self.spec();
        let mut keys = vec![spec.token_key, spec.user_key];
        keys.extend_from_slice(spec.extra_keys);
        keys
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub role: Role,
    pub token: String,
    pub user: Value,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutOutcome {
    pub role: Role,
    pub server_notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCheck {
    pub role: Role,
    pub authenticated: bool,
    pub route: &'static str,
}

pub fn login(
    client: &ApiClient<'_>,
    storages: &mut Storages<'_>,
    role: Role,
    credentials: &Credentials,
    remember: bool,
) -> ApiResult<Session> {
    let email = credentials.email.trim();
    if email.is_empty() {
        return Err(ApiError::validation("email", "email is required"));
    }
    if credentials.password.is_empty() {
        return Err(ApiError::validation("password", "password is required"));
    }

    let spec = role.spec();
    let resp = client.post(
        spec.login_path,
        &json!({ "email": email, "password": credentials.password }),
    )?;

    let token = resp
        .get("token")
        .or_else(|| resp.get("accessToken"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Decode("login response carries no token".to_string()))?
        .to_string();
    let user = spec
        .user_fields
        .iter()
        .find_map(|f| resp.get(*f).filter(|v| v.is_object()))
        .cloned()
        .ok_or_else(|| ApiError::Decode("login response carries no user".to_string()))?;

    let scope = if remember { Scope::Local } else { Scope::Tab };
    clear_role(storages, role)?;
    let user_raw = serde_json::to_string(&user).map_err(|e| ApiError::Decode(e.to_string()))?;
    let target = storages.scope(scope);
    target.set(spec.token_key, &token)?;
    target.set(spec.user_key, &user_raw)?;

    tracing::info!(role = role.as_str(), scope = scope.as_str(), "logged in");
    Ok(Session {
        role,
        token,
        user,
        scope,
    })
}

/// Best-effort server notification, then an unconditional local clear.
pub fn logout(
    client: &ApiClient<'_>,
    storages: &mut Storages<'_>,
    role: Role,
) -> ApiResult<LogoutOutcome> {
    let spec = role.spec();
    let token = storages.get_any(spec.token_key)?.map(|(_, t)| t);

    let mut outcome = LogoutOutcome {
        role,
        server_notified: false,
        server_error: None,
    };
    if let Some(token) = token {
        let role_client = ApiClient::new(client.transport(), client.base_url())
            .with_bearer(Some(token))
            .with_timeout(client.timeout());
        match role_client.post(spec.logout_path, &json!({})) {
            Ok(_) => outcome.server_notified = true,
            Err(e) => {
                tracing::warn!(role = role.as_str(), error = %e, "logout notification failed");
                outcome.server_error = Some(e.to_string());
            }
        }
    }

    clear_role(storages, role)?;
    tracing::info!(role = role.as_str(), "logged out");
    Ok(outcome)
}

pub fn current(storages: &Storages<'_>, role: Role) -> anyhow::Result<Option<Session>> {
    let spec = role.spec();
    for scope in [Scope::Local, Scope::Tab] {
        let token = storages.get(scope, spec.token_key)?;
        let user = storages.get(scope, spec.user_key)?;
        if let (Some(token), Some(user_raw)) = (token, user) {
            if token.is_empty() {
                continue;
            }
            let Ok(user) = serde_json::from_str::<Value>(&user_raw) else {
                tracing::warn!(role = role.as_str(), "stored user object is not valid JSON");
                continue;
            };
            return Ok(Some(Session {
                role,
                token,
                user,
                scope,
            }));
        }
    }
    Ok(None)
}

pub fn check(storages: &Storages<'_>, role: Role) -> anyhow::Result<AccessCheck> {
    let authenticated = current(storages, role)?.is_some();
    let spec = role.spec();
    Ok(AccessCheck {
        role,
        authenticated,
        route: if authenticated {
            spec.home_route
        } else {
            spec.login_route
        },
    })
}

pub fn bearer_token(storages: &Storages<'_>) -> anyhow::Result<Option<String>> {
    for role in Role::BEARER_ORDER {
        if let Some((_, token)) = storages.get_any(role.spec().token_key)? {
            if !token.is_empty() {
                return Ok(Some(token));
            }
        }
    }
    Ok(None)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn register(client: &ApiClient<'_>, reg: &Registration) -> ApiResult<Value> {
    let mut issues = Vec::new();
    if reg.name.trim().is_empty() {
        issues.push(crate::api::ValidationIssue::new("name", "name is required"));
    }
    if !reg.email.contains('@') {
        issues.push(crate::api::ValidationIssue::new(
            "email",
            "email must be a valid address",
        ));
    }
    if reg.password.chars().count() < 6 {
        issues.push(crate::api::ValidationIssue::new(
            "password",
            "password must be at least 6 characters",
        ));
    }
    if !issues.is_empty() {
        return Err(ApiError::Validation(issues));
    }
    client.post(
        endpoints::REGISTER,
        &json!({ "name": reg.name.trim(), "email": reg.email.trim(), "password": reg.password }),
    )
}

fn clear_role(storages: &mut Storages<'_>, role: Role) -> anyhow::Result<()> {
    for key in role.keys() {
        storages.remove_everywhere(key)?;
    }
    Ok(())
}
