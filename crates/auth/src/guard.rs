//! Navigation guard.
//!
//! Every requested path goes through [`resolve`], which decides whether the
//! view renders or where the client is sent instead. The route table below is
//! the single source for both `role -> home path` and `path -> required role`.

use crate::{Role, Session};

pub const LOGIN_PATH: &str = "/login";

const DASHBOARDS: [(Role, &str); 4] = [
    (Role::Admin, "/dashboard/admin"),
    (Role::DataCollector, "/dashboard/collector"),
    (Role::Transcriber, "/dashboard/transcriber"),
    (Role::Validator, "/dashboard/validator"),
];

/// A view the client can render.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    /// Dashboard that only the given role may see.
    Dashboard(Role),
}

impl Route {
    /// Look up a known route. Query strings, fragments and trailing slashes
    /// are ignored; everything else must match exactly.
    pub fn parse(path: &str) -> Option<Route> {
        let path = normalize(path);
        if path == LOGIN_PATH {
            return Some(Route::Login);
        }
        DASHBOARDS
            .iter()
            .find(|(_, p)| *p == path)
            .map(|(role, _)| Route::Dashboard(*role))
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => LOGIN_PATH,
            Route::Dashboard(role) => DASHBOARDS
                .iter()
                .find(|(r, _)| r == role)
                .map(|(_, p)| *p)
                // DASHBOARDS covers every role.
                .unwrap_or(LOGIN_PATH),
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::Login => None,
            Route::Dashboard(role) => Some(*role),
        }
    }
}

fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Guard outcome for one navigation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Render(Route),
    RedirectToLogin,
    RedirectToRoleHome(Role),
}

impl Decision {
    /// Path the client ends up showing.
    pub fn location(&self) -> &'static str {
        match self {
            Decision::Render(route) => route.path(),
            Decision::RedirectToLogin => LOGIN_PATH,
            Decision::RedirectToRoleHome(role) => role.home_path(),
        }
    }

    pub fn is_redirect(&self) -> bool {
        !matches!(self, Decision::Render(_))
    }

    /// True when the requested view was withheld for lack of authority
    /// (no session, or a dashboard belonging to another role).
    ///
    /// Redirecting an authenticated user away from the login form or from an
    /// unknown path is routing, not a refusal.
    pub fn is_unauthorized(&self, requested: &str) -> bool {
        match (self, Route::parse(requested)) {
            (Decision::RedirectToLogin, Some(Route::Dashboard(_))) => true,
            (Decision::RedirectToRoleHome(_), Some(Route::Dashboard(_))) => true,
            _ => false,
        }
    }
}

/// Decide what happens when `requested` is opened with `session`.
pub fn resolve(requested: &str, session: &Session) -> Decision {
    let route = Route::parse(requested);

    // A token without a role is not a usable session.
    let role = match (session.token(), session.role()) {
        (Some(_), Some(role)) => role,
        _ => {
            return match route {
                Some(Route::Login) => Decision::Render(Route::Login),
                _ => Decision::RedirectToLogin,
            };
        }
    };

    match route {
        Some(Route::Login) => Decision::RedirectToRoleHome(role),
        Some(Route::Dashboard(required)) if required == role => {
            Decision::Render(Route::Dashboard(required))
        }
        Some(Route::Dashboard(_)) | None => Decision::RedirectToRoleHome(role),
    }
}

/// Resolve `requested` and follow the redirect, if any, to the rendered view.
pub fn settle(requested: &str, session: &Session) -> Route {
    match resolve(requested, session) {
        Decision::Render(route) => route,
        redirect => match resolve(redirect.location(), session) {
            Decision::Render(route) => route,
            // Redirect targets always render; fall back to the login form.
            _ => Route::Login,
        },
    }
}
