//! Route registry and path matching.
//!
//! Mirrors the console's page tree: a login entry point, a layout of
//! management pages, a forbidden page and a catch-all. Each descriptor may
//! carry a permission tag; absence means the route only requires an
//! authenticated session.

use crate::types::Permission;
use once_cell::sync::Lazy;

/// The login entry point, always reachable.
pub const LOGIN_PATH: &str = "/login";
/// Dashboard / default landing page.
pub const ROOT_PATH: &str = "/";
/// Target of permission-denied redirects.
pub const FORBIDDEN_PATH: &str = "/403";

#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub name: &'static str,
    /// Path pattern; `:segment` matches any single segment
    pub path: &'static str,
    /// Permission required to enter; `None` means any authenticated session
    pub permission: Option<Permission>,
}

/// Every registered route, in matching order (static segments before
/// `:param` patterns that share a prefix).
pub static ROUTES: Lazy<Vec<RouteDescriptor>> = Lazy::new(|| {
    vec![
        RouteDescriptor {
            name: "login",
            path: LOGIN_PATH,
            permission: None,
        },
        RouteDescriptor {
            name: "dashboard",
            path: ROOT_PATH,
            permission: None,
        },
        RouteDescriptor {
            name: "customer-list",
            path: "/customers",
            permission: Some(Permission::from("customer:view")),
        },
        RouteDescriptor {
            name: "customer-form",
            path: "/customers/form",
            permission: Some(Permission::from("customer:view")),
        },
        RouteDescriptor {
            name: "customer-detail",
            path: "/customers/:id",
            permission: Some(Permission::from("customer:view")),
        },
        RouteDescriptor {
            name: "user-manage",
            path: "/users",
            permission: Some(Permission::from("user:manage")),
        },
        RouteDescriptor {
            name: "role-manage",
            path: "/roles",
            permission: Some(Permission::from("role:manage")),
        },
        RouteDescriptor {
            name: "profile",
            path: "/profile",
            permission: None,
        },
        RouteDescriptor {
            name: "forbidden",
            path: FORBIDDEN_PATH,
            permission: None,
        },
    ]
});

/// Fallback descriptor for paths no registered route matches.
pub static NOT_FOUND: Lazy<RouteDescriptor> = Lazy::new(|| RouteDescriptor {
    name: "not-found",
    path: "/:pathMatch",
    permission: None,
});

/// Find the first registered route whose pattern matches `path`.
pub fn match_route(path: &str) -> Option<&'static RouteDescriptor> {
    ROUTES.iter().find(|route| path_matches(route.path, path))
}

fn path_matches(pattern: &str, path: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();

    pattern_segments.len() == path_segments.len()
        && pattern_segments
            .iter()
            .zip(&path_segments)
            .all(|(p, s)| p.starts_with(':') || p == s)
}
