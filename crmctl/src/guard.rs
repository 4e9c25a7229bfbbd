//! Navigation guard: the decision function run before every transition.
//!
//! Policy, in evaluation order:
//!
//! 1. the login entry point is reachable by anyone — except that an
//!    already-authenticated visitor is bounced back to the page they came
//!    from (or the root),
//! 2. every other route requires an authenticated session,
//! 3. a route carrying a permission tag additionally requires that tag in
//!    the session's permission set; a miss redirects to the forbidden page.
//!
//! On every authenticated transition the guard re-hydrates the session from
//! durable storage first, so permission checks see the latest persisted
//! state even when the in-memory session was just created.

use crate::auth::Session;
use crate::routes::{LOGIN_PATH, FORBIDDEN_PATH, ROOT_PATH, RouteDescriptor};
use crate::types::PermissionSet;
use tracing::debug;

/// Outcome of evaluating a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Proceed to the target route.
    Allow,
    /// Anonymous session on a protected route.
    RedirectToLogin,
    /// Authenticated visit to the login page; go back where we came from.
    RedirectTo(String),
    /// Permission missing; redirect and surface a notice.
    Forbidden { redirect: String },
}

/// Evaluate a transition with hydration (see module docs).
pub fn check(session: &mut Session, target: &RouteDescriptor, last_visited: Option<&str>) -> GuardOutcome {
    if session.is_logged_in() && target.path != LOGIN_PATH {
        session.init_user_info();
    }

    let outcome = decide(session.is_logged_in(), session.permissions(), target, last_visited);
    debug!(route = target.name, ?outcome, "Evaluated navigation");
    outcome
}

/// Pure decision table over (session state, target, last visited page).
pub fn decide(
    is_logged_in: bool,
    permissions: &PermissionSet,
    target: &RouteDescriptor,
    last_visited: Option<&str>,
) -> GuardOutcome {
    if target.path == LOGIN_PATH {
        if is_logged_in {
            let back = match last_visited {
                Some(path) if path != LOGIN_PATH => path.to_string(),
                _ => ROOT_PATH.to_string(),
            };
            return GuardOutcome::RedirectTo(back);
        }
        return GuardOutcome::Allow;
    }

    if !is_logged_in {
        return GuardOutcome::RedirectToLogin;
    }

    match &target.permission {
        None => GuardOutcome::Allow,
        Some(required) if permissions.contains(required) => GuardOutcome::Allow,
        Some(_) => GuardOutcome::Forbidden {
            redirect: FORBIDDEN_PATH.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::notify::RecordingNotifier;
    use crate::routes;
    use crate::storage::{MemoryStore, PERMISSIONS_KEY, SessionStore, TOKEN_KEY, USER_INFO_KEY};
    use crate::transport::Transport;
    use crate::types::Permission;
    use std::sync::Arc;
    use std::time::Duration;

    fn permissions(tags: &[&str]) -> PermissionSet {
        tags.iter().map(|t| Permission::from(*t)).collect()
    }

    fn route(path: &str) -> &'static RouteDescriptor {
        routes::match_route(path).unwrap()
    }

    fn session_with_store(store: Arc<MemoryStore>) -> Session {
        let notifier = Arc::new(RecordingNotifier::default());
        let config = ApiConfig {
            base_url: "http://localhost:3000".parse().unwrap(),
            timeout: Duration::from_secs(2),
        };
        let transport = Transport::new(&config, store.clone(), notifier.clone()).unwrap();
        Session::new(transport, store, notifier)
    }

    #[test]
    fn test_anonymous_login_page_allowed() {
        assert_eq!(
            decide(false, &PermissionSet::new(), route(LOGIN_PATH), None),
            GuardOutcome::Allow
        );
    }

    #[test]
    fn test_anonymous_protected_route_redirects_to_login() {
        assert_eq!(
            decide(false, &PermissionSet::new(), route("/customers"), None),
            GuardOutcome::RedirectToLogin
        );
        // Routes without a permission tag still require a session
        assert_eq!(
            decide(false, &PermissionSet::new(), route("/"), None),
            GuardOutcome::RedirectToLogin
        );
    }

    #[test]
    fn test_authenticated_untagged_route_allowed() {
        assert_eq!(
            decide(true, &PermissionSet::new(), route("/profile"), None),
            GuardOutcome::Allow
        );
    }

    #[test]
    fn test_permission_gate() {
        let held = permissions(&["customer:view"]);
        assert_eq!(decide(true, &held, route("/customers"), None), GuardOutcome::Allow);
        assert_eq!(
            decide(true, &held, route("/users"), None),
            GuardOutcome::Forbidden {
                redirect: FORBIDDEN_PATH.to_string()
            }
        );
    }

    #[test]
    fn test_authenticated_login_redirects_back() {
        let held = permissions(&[]);
        assert_eq!(
            decide(true, &held, route(LOGIN_PATH), Some("/customers")),
            GuardOutcome::RedirectTo("/customers".to_string())
        );
        // No previous page (or the login page itself): fall back to root
        assert_eq!(
            decide(true, &held, route(LOGIN_PATH), None),
            GuardOutcome::RedirectTo(ROOT_PATH.to_string())
        );
        assert_eq!(
            decide(true, &held, route(LOGIN_PATH), Some(LOGIN_PATH)),
            GuardOutcome::RedirectTo(ROOT_PATH.to_string())
        );
    }

    #[test]
    fn test_check_hydrates_before_permission_evaluation() {
        // Persisted session exists, but the in-memory session was created
        // before the permissions landed in storage (a "reload" mid-write).
        let store = Arc::new(MemoryStore::default());
        store.set(TOKEN_KEY, "tok").unwrap();
        let mut session = session_with_store(store.clone());

        store
            .set(
                USER_INFO_KEY,
                r#"{"id":1,"username":"admin","password":"x","token":"tok","role":"admin"}"#,
            )
            .unwrap();
        store.set(PERMISSIONS_KEY, r#"["user:manage"]"#).unwrap();

        let outcome = check(&mut session, route("/users"), None);
        assert_eq!(outcome, GuardOutcome::Allow);
        assert_eq!(session.user_info().unwrap().username, "admin");
    }

    #[test]
    fn test_forbidden_leaves_session_unchanged() {
        let store = Arc::new(MemoryStore::default());
        store.set(TOKEN_KEY, "tok").unwrap();
        store.set(PERMISSIONS_KEY, r#"["customer:view"]"#).unwrap();
        let mut session = session_with_store(store);

        let outcome = check(&mut session, route("/roles"), Some("/customers"));
        assert_eq!(
            outcome,
            GuardOutcome::Forbidden {
                redirect: FORBIDDEN_PATH.to_string()
            }
        );
        assert!(session.is_logged_in());
        assert!(session.has_permission(&Permission::from("customer:view")));
    }
}
