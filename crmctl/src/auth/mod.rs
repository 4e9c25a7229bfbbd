//! Session state machine: login, logout, expiry, hydration.
//!
//! A [`Session`] is either *Anonymous* (no token) or *Authenticated* (token,
//! user record and permission set populated). State lives in memory and is
//! mirrored to the durable [`SessionStore`] so a fresh process picks the
//! session back up; [`Session::init_user_info`] re-hydrates the in-memory
//! copy from storage and is safe to call on every guarded navigation.
//!
//! The permission set is the capability list of the role whose `code`
//! matches the user's `role` field. It is resolved once at login and cached
//! until logout; a failed or empty lookup yields an empty set rather than a
//! login failure.

pub mod password;

use crate::api::endpoints::{roles, users};
use crate::api::models::users::{User, UserCreate};
use crate::errors::{Error, Result};
use crate::notify::Notify;
use crate::storage::{PERMISSIONS_KEY, SessionStore, TOKEN_KEY, USER_INFO_KEY};
use crate::transport::Transport;
use crate::types::{Permission, PermissionSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Credentials supplied to [`Session::login`].
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Input for [`Session::register`].
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub role: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
}

pub struct Session {
    user_info: Option<User>,
    token: String,
    permissions: PermissionSet,
    transport: Transport,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notify>,
}

impl Session {
    /// Build a session, hydrating token and user record from storage.
    pub fn new(transport: Transport, store: Arc<dyn SessionStore>, notifier: Arc<dyn Notify>) -> Self {
        let token = store.get(TOKEN_KEY).ok().flatten().unwrap_or_default();

        let mut session = Self {
            user_info: None,
            token,
            permissions: PermissionSet::new(),
            transport,
            store,
            notifier,
        };
        session.init_user_info();
        session
    }

    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn user_info(&self) -> Option<&User> {
        self.user_info.as_ref()
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Authenticate against the user-lookup endpoint.
    ///
    /// The username is trimmed and must match exactly one record; the
    /// supplied password is verified against that record's stored
    /// credential. Each failure cause surfaces its own notice and maps to a
    /// distinct error variant, so callers can treat `is_ok()` as the
    /// success flag.
    pub async fn login(&mut self, form: &LoginForm) -> Result<()> {
        let username = form.username.trim();

        let mut matches = match users::find_by_username(&self.transport, username).await {
            Ok(matches) => matches,
            Err(e) => {
                self.notifier.error("Login failed, please try again later");
                return Err(e);
            }
        };

        let user = match matches.len() {
            0 => {
                self.notifier.error("Username not found");
                return Err(Error::UsernameNotFound {
                    username: username.to_string(),
                });
            }
            1 => matches.remove(0),
            _ => {
                warn!(username, count = matches.len(), "Ambiguous username in credential lookup");
                self.notifier.error("More than one account matches this username");
                return Err(Error::AmbiguousUsername {
                    username: username.to_string(),
                });
            }
        };

        if !password::verify_password(&form.password, &user.password) {
            self.notifier.error("Wrong password");
            return Err(Error::WrongPassword);
        }

        // Persist identity first, then the resolved capability set
        self.store.set(TOKEN_KEY, &user.token)?;
        self.store.set(USER_INFO_KEY, &serde_json::to_string(&user)?)?;
        self.token = user.token.clone();

        let permissions = resolve_role_permissions(&self.transport, &user.role).await;
        self.store.set(PERMISSIONS_KEY, &serde_json::to_string(&permissions)?)?;

        debug!(username = %user.username, role = %user.role, permissions = permissions.len(), "Login succeeded");
        self.user_info = Some(user);
        self.permissions = permissions;
        self.notifier.success("Logged in");
        Ok(())
    }

    /// Register a new account, hashing the password before it leaves the
    /// process and attaching a fresh bearer token.
    pub async fn register(&self, form: &RegisterForm) -> Result<User> {
        let user = UserCreate {
            username: form.username.trim().to_string(),
            password: password::hash_password(form.password.trim())?,
            token: password::generate_session_token(),
            role: form.role.clone(),
            nickname: form.nickname.clone(),
            email: form.email.clone(),
        };

        users::register(&self.transport, &user).await
    }

    /// Clear in-memory and persisted session state.
    pub fn logout(&mut self) -> Result<()> {
        self.user_info = None;
        self.token.clear();
        self.permissions.clear();
        self.store.clear_session()?;
        self.notifier.success("Logged out");
        Ok(())
    }

    /// Tear down in-memory state after the transport reported an expired
    /// session (the transport already cleared storage).
    pub fn handle_expiry(&mut self) {
        self.user_info = None;
        self.token.clear();
        self.permissions.clear();
    }

    /// Idempotent hydration from durable storage.
    ///
    /// Overwrites the in-memory user record and permission set with the
    /// persisted copies, if present. Called by the navigation guard on
    /// every authenticated transition.
    pub fn init_user_info(&mut self) {
        if let Ok(Some(raw)) = self.store.get(USER_INFO_KEY) {
            match serde_json::from_str(&raw) {
                Ok(user) => self.user_info = Some(user),
                Err(e) => warn!(error = %e, "Ignoring unparseable persisted user record"),
            }
        }

        if let Ok(Some(raw)) = self.store.get(PERMISSIONS_KEY) {
            match serde_json::from_str(&raw) {
                Ok(permissions) => self.permissions = permissions,
                Err(e) => warn!(error = %e, "Ignoring unparseable persisted permission set"),
            }
        }
    }
}

/// Look up the permission set for a role code.
///
/// No match or a failed lookup yields an empty set; authorization then
/// denies everything permission-tagged without failing the login.
async fn resolve_role_permissions(transport: &Transport, role_code: &str) -> PermissionSet {
    match roles::list(transport).await {
        Ok(all_roles) => all_roles
            .into_iter()
            .find(|role| role.code == role_code)
            .map(|role| role.permissions.into_iter().collect())
            .unwrap_or_default(),
        Err(e) => {
            warn!(role_code, error = %e, "Role lookup failed, using empty permission set");
            PermissionSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_session(server_uri: &str) -> (Session, Arc<MemoryStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let config = ApiConfig {
            base_url: server_uri.parse().unwrap(),
            timeout: Duration::from_secs(2),
        };
        let transport = Transport::new(&config, store.clone(), notifier.clone()).unwrap();
        let session = Session::new(transport, store.clone(), notifier.clone());
        (session, store, notifier)
    }

    fn user_record(password_hash: &str) -> serde_json::Value {
        json!({
            "id": 1,
            "username": "admin",
            "password": password_hash,
            "token": "tok-admin",
            "role": "admin",
            "nickname": "Admin"
        })
    }

    async fn mount_user_lookup(server: &MockServer, username: &str, records: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("username", username))
            .respond_with(ResponseTemplate::new(200).set_body_json(records))
            .mount(server)
            .await;
    }

    async fn mount_roles(server: &MockServer, roles: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/roles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(roles))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_success_persists_session_and_resolves_permissions() {
        let server = MockServer::start().await;
        let hash = password::hash_password("secret123").unwrap();
        mount_user_lookup(&server, "admin", json!([user_record(&hash)])).await;
        mount_roles(
            &server,
            json!([
                {"id": 1, "code": "admin", "name": "Administrator",
                 "permissions": ["customer:view", "user:manage", "role:manage"]},
                {"id": 2, "code": "sales", "name": "Sales", "permissions": ["customer:view"]}
            ]),
        )
        .await;

        let (mut session, store, notifier) = test_session(&server.uri());
        assert!(!session.is_logged_in());

        session
            .login(&LoginForm {
                // Leading/trailing whitespace is trimmed before lookup
                username: "  admin  ".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert!(session.is_logged_in());
        assert_eq!(session.user_info().unwrap().username, "admin");
        assert!(session.has_permission(&Permission::from("user:manage")));
        assert!(!session.has_permission(&Permission::from("billing:manage")));

        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-admin"));
        assert!(store.get(USER_INFO_KEY).unwrap().is_some());
        let persisted: PermissionSet = serde_json::from_str(&store.get(PERMISSIONS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted.len(), 3);

        assert!(notifier.notices().iter().any(|(_, m)| m == "Logged in"));
    }

    #[tokio::test]
    async fn test_login_wrong_password_leaves_storage_untouched() {
        let server = MockServer::start().await;
        let hash = password::hash_password("right-password").unwrap();
        mount_user_lookup(&server, "admin", json!([user_record(&hash)])).await;

        let (mut session, store, notifier) = test_session(&server.uri());
        let result = session
            .login(&LoginForm {
                username: "admin".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(Error::WrongPassword)));
        assert!(!session.is_logged_in());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USER_INFO_KEY).unwrap(), None);
        assert_eq!(notifier.errors(), vec!["Wrong password".to_string()]);
    }

    #[tokio::test]
    async fn test_login_unknown_username() {
        let server = MockServer::start().await;
        mount_user_lookup(&server, "ghost", json!([])).await;

        let (mut session, store, notifier) = test_session(&server.uri());
        let result = session
            .login(&LoginForm {
                username: "ghost".to_string(),
                password: "whatever".to_string(),
            })
            .await;

        assert!(matches!(result, Err(Error::UsernameNotFound { .. })));
        assert!(!session.is_logged_in());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(notifier.errors(), vec!["Username not found".to_string()]);
    }

    #[tokio::test]
    async fn test_login_ambiguous_username() {
        let server = MockServer::start().await;
        let hash = password::hash_password("secret123").unwrap();
        mount_user_lookup(&server, "admin", json!([user_record(&hash), user_record(&hash)])).await;

        let (mut session, _, _) = test_session(&server.uri());
        let result = session
            .login(&LoginForm {
                username: "admin".to_string(),
                password: "secret123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(Error::AmbiguousUsername { .. })));
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_login_transport_failure_surfaces_generic_notice() {
        // Nothing listening on this port
        let (mut session, _, notifier) = test_session("http://127.0.0.1:1");
        let result = session
            .login(&LoginForm {
                username: "admin".to_string(),
                password: "secret123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(Error::Http(_))));
        assert!(!session.is_logged_in());
        assert!(notifier.errors().iter().any(|m| m == "Login failed, please try again later"));
    }

    #[tokio::test]
    async fn test_login_with_unmatched_role_code_yields_empty_permissions() {
        let server = MockServer::start().await;
        let hash = password::hash_password("secret123").unwrap();
        mount_user_lookup(&server, "admin", json!([user_record(&hash)])).await;
        mount_roles(&server, json!([{"id": 2, "code": "sales", "name": "Sales", "permissions": ["customer:view"]}])).await;

        let (mut session, store, _) = test_session(&server.uri());
        session
            .login(&LoginForm {
                username: "admin".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert!(session.is_logged_in());
        assert!(session.permissions().is_empty());
        let persisted: PermissionSet = serde_json::from_str(&store.get(PERMISSIONS_KEY).unwrap().unwrap()).unwrap();
        assert!(persisted.is_empty());
    }

    #[tokio::test]
    async fn test_login_with_failed_role_lookup_still_succeeds() {
        let server = MockServer::start().await;
        let hash = password::hash_password("secret123").unwrap();
        mount_user_lookup(&server, "admin", json!([user_record(&hash)])).await;
        Mock::given(method("GET"))
            .and(path("/roles"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (mut session, _, _) = test_session(&server.uri());
        session
            .login(&LoginForm {
                username: "admin".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert!(session.is_logged_in());
        assert!(session.permissions().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_memory_and_storage() {
        let server = MockServer::start().await;
        let hash = password::hash_password("secret123").unwrap();
        mount_user_lookup(&server, "admin", json!([user_record(&hash)])).await;
        mount_roles(&server, json!([{"id": 1, "code": "admin", "name": "Administrator", "permissions": ["user:manage"]}])).await;

        let (mut session, store, _) = test_session(&server.uri());
        session
            .login(&LoginForm {
                username: "admin".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        session.logout().unwrap();

        assert!(!session.is_logged_in());
        assert!(session.user_info().is_none());
        assert!(session.permissions().is_empty());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USER_INFO_KEY).unwrap(), None);
        assert_eq!(store.get(PERMISSIONS_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_hydration_restores_persisted_session() {
        let store = Arc::new(MemoryStore::default());
        store.set(TOKEN_KEY, "tok-admin").unwrap();
        store
            .set(
                USER_INFO_KEY,
                &user_record(&password::hash_password("x").unwrap()).to_string(),
            )
            .unwrap();
        store.set(PERMISSIONS_KEY, r#"["user:manage"]"#).unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let config = ApiConfig {
            base_url: "http://localhost:3000".parse().unwrap(),
            timeout: Duration::from_secs(2),
        };
        let transport = Transport::new(&config, store.clone(), notifier.clone()).unwrap();

        // Simulates a full reload: a brand-new session picks the state up
        let session = Session::new(transport, store, notifier);
        assert!(session.is_logged_in());
        assert_eq!(session.user_info().unwrap().username, "admin");
        assert!(session.has_permission(&Permission::from("user:manage")));
    }

    #[tokio::test]
    async fn test_init_user_info_is_idempotent() {
        let server = MockServer::start().await;
        let (mut session, store, _) = test_session(&server.uri());
        store
            .set(
                USER_INFO_KEY,
                &user_record(&password::hash_password("x").unwrap()).to_string(),
            )
            .unwrap();

        session.init_user_info();
        session.init_user_info();
        assert_eq!(session.user_info().unwrap().username, "admin");
    }

    #[tokio::test]
    async fn test_handle_expiry_clears_memory() {
        let store = Arc::new(MemoryStore::default());
        store.set(TOKEN_KEY, "tok").unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let config = ApiConfig {
            base_url: "http://localhost:3000".parse().unwrap(),
            timeout: Duration::from_secs(2),
        };
        let transport = Transport::new(&config, store.clone(), notifier.clone()).unwrap();
        let mut session = Session::new(transport, store, notifier);

        assert!(session.is_logged_in());
        session.handle_expiry();
        assert!(!session.is_logged_in());
        assert!(session.permissions().is_empty());
    }
}
