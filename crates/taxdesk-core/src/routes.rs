//! Route table and authentication guard.

use std::fmt;

use crate::auth::AuthState;
use crate::navigation::{normalize_path, NavigationStore};

/// Every page the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Returns,
    Documents,
    ActivityLogs,
    Payments,
    Settings,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Returns,
        Route::Documents,
        Route::ActivityLogs,
        Route::Payments,
        Route::Settings,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Returns => "/dashboard/returns",
            Route::Documents => "/dashboard/documents",
            Route::ActivityLogs => "/dashboard/activity-logs",
            Route::Payments => "/dashboard/payments",
            Route::Settings => "/dashboard/settings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Register => "Register",
            Route::Dashboard => "Dashboard",
            Route::Returns => "Returns",
            Route::Documents => "Documents",
            Route::ActivityLogs => "Activity Logs",
            Route::Payments => "Payments",
            Route::Settings => "Settings",
        }
    }

    /// Match a path against the table. Unknown paths render the dashboard.
    ///
    /// A single trailing slash is ignored.
    pub fn from_path(path: &str) -> Route {
        Self::lookup(path).unwrap_or(Route::Dashboard)
    }

    /// Exact table lookup, `None` for unknown paths.
    pub fn lookup(path: &str) -> Option<Route> {
        let normalized = normalize_path(path);
        let trimmed = match normalized.strip_suffix('/') {
            Some(rest) if !rest.is_empty() => rest,
            _ => normalized.as_str(),
        };
        Route::ALL.iter().copied().find(|route| route.path() == trimmed)
    }

    /// Login and register are reachable without a session.
    pub fn is_auth_page(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of guarding a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session not resolved yet; show a spinner.
    Loading,
    Render(Route),
    Redirect(Route),
}

/// Apply the authentication rules to `path`.
///
/// - unauthenticated on anything but `/login` or `/register` goes to `/login`
/// - authenticated on `/`, `/login`, or `/register` goes to `/dashboard`
pub fn guard(path: &str, auth: &AuthState) -> RouteDecision {
    if auth.is_loading() {
        return RouteDecision::Loading;
    }

    let normalized = normalize_path(path);
    let route = Route::lookup(&normalized);
    let is_auth_page = route.map(|r| r.is_auth_page()).unwrap_or(false);

    match auth.user() {
        None if !is_auth_page => RouteDecision::Redirect(Route::Login),
        Some(_) if is_auth_page || normalized == "/" => RouteDecision::Redirect(Route::Dashboard),
        _ => RouteDecision::Render(route.unwrap_or(Route::Dashboard)),
    }
}

/// Result of [`Router::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Loading,
    Page {
        route: Route,
        /// Path that was requested before a redirect, if one happened.
        redirected_from: Option<String>,
    },
}

/// Keeps the navigation store on a page the session may see.
pub struct Router;

impl Router {
    /// Guard the store's current path, navigating on redirect.
    pub fn resolve(nav: &NavigationStore, auth: &AuthState) -> Resolved {
        let requested = nav.current_path();
        match guard(&requested, auth) {
            RouteDecision::Loading => Resolved::Loading,
            RouteDecision::Render(route) => Resolved::Page {
                route,
                redirected_from: None,
            },
            RouteDecision::Redirect(target) => {
                nav.navigate(target.path());
                Resolved::Page {
                    route: target,
                    redirected_from: Some(requested),
                }
            }
        }
    }
}

/// An entry in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub name: &'static str,
    /// Relative href; normalized when rendered.
    pub href: &'static str,
    pub description: &'static str,
}

pub const NAV_ITEMS: [NavItem; 5] = [
    NavItem {
        name: "Returns",
        href: "dashboard/returns",
        description: "Manage tax returns",
    },
    NavItem {
        name: "Documents",
        href: "dashboard/documents",
        description: "Document library",
    },
    NavItem {
        name: "Activity Logs",
        href: "dashboard/activity-logs",
        description: "View activity history",
    },
    NavItem {
        name: "Payments",
        href: "dashboard/payments",
        description: "Invoices & payments",
    },
    NavItem {
        name: "Settings",
        href: "dashboard/settings",
        description: "Account settings",
    },
];

impl NavItem {
    pub fn path(&self) -> String {
        normalize_path(self.href)
    }

    pub fn is_active(&self, pathname: &str) -> bool {
        self.path() == normalize_path(pathname)
    }
}
