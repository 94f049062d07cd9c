//! Page routing and the signed-in guard.

use crate::session::Viewer;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Landing,
    SignIn,
    SignUp,
    CompleteProfile,
    Dashboard,
    Admin,
    NotFound(String),
}

impl Route {
    /// Parses a path. The sign-in and sign-up pages own every sub-path.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        let owns = |prefix: &str| trimmed == prefix || trimmed.starts_with(&format!("{prefix}/"));

        match trimmed {
            "" => Route::Landing,
            "/complete-profile" => Route::CompleteProfile,
            "/dashboard" => Route::Dashboard,
            "/admin" => Route::Admin,
            _ if owns("/sign-in") => Route::SignIn,
            _ if owns("/sign-up") => Route::SignUp,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Landing => "/",
            Route::SignIn => "/sign-in",
            Route::SignUp => "/sign-up",
            Route::CompleteProfile => "/complete-profile",
            Route::Dashboard => "/dashboard",
            Route::Admin => "/admin",
            Route::NotFound(path) => path,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Landing | Route::SignIn | Route::SignUp)
    }

    /// Where the identity provider sends the user after finishing this page.
    pub fn completion_target(&self) -> Option<Route> {
        match self {
            Route::SignIn => Some(Route::Dashboard),
            Route::SignUp => Some(Route::CompleteProfile),
            _ => None,
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(Viewer),
}

impl AuthState {
    pub fn viewer(&self) -> Option<&Viewer> {
        match self {
            AuthState::SignedIn(viewer) => Some(viewer),
            AuthState::SignedOut => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Render(Route),
    Redirect { to: Route, return_to: String },
}

/// Decides what to show for `route` given the session.
pub fn resolve(route: &Route, auth: &AuthState) -> Resolution {
    match (route, auth) {
        (Route::NotFound(_), _) => Resolution::Redirect {
            to: Route::SignIn,
            return_to: Route::Landing.path().to_string(),
        },
        (route, _) if route.is_public() => Resolution::Render(route.clone()),
        (route, AuthState::SignedIn(_)) => Resolution::Render(route.clone()),
        (route, AuthState::SignedOut) => Resolution::Redirect {
            to: Route::SignIn,
            return_to: route.path().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Landing);
        assert_eq!(Route::parse(""), Route::Landing);
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::parse("/admin?tab=users"), Route::Admin);
        assert_eq!(Route::parse("/sign-in/factor-one"), Route::SignIn);
        assert_eq!(Route::parse("/sign-up"), Route::SignUp);
        assert_eq!(Route::parse("/complete-profile"), Route::CompleteProfile);
        assert_eq!(
            Route::parse("/sign-inx"),
            Route::NotFound("/sign-inx".to_string())
        );
    }

    #[test]
    fn test_public_routes_render_signed_out() {
        for route in [Route::Landing, Route::SignIn, Route::SignUp] {
            assert_eq!(
                resolve(&route, &AuthState::SignedOut),
                Resolution::Render(route.clone())
            );
        }
    }

    #[test]
    fn test_protected_routes_redirect_with_return_path() {
        for route in [Route::CompleteProfile, Route::Dashboard, Route::Admin] {
            assert_eq!(
                resolve(&route, &AuthState::SignedOut),
                Resolution::Redirect {
                    to: Route::SignIn,
                    return_to: route.path().to_string(),
                }
            );
            assert_eq!(
                resolve(&route, &AuthState::SignedIn(Viewer::new("u1"))),
                Resolution::Render(route.clone())
            );
        }
    }

    #[test]
    fn test_unknown_route_goes_to_sign_in() {
        let signed_in = AuthState::SignedIn(Viewer::new("u1"));
        assert_eq!(
            resolve(&Route::parse("/nowhere"), &signed_in),
            Resolution::Redirect {
                to: Route::SignIn,
                return_to: "/".to_string(),
            }
        );
    }

    #[test]
    fn test_completion_targets() {
        assert_eq!(Route::SignIn.completion_target(), Some(Route::Dashboard));
        assert_eq!(
            Route::SignUp.completion_target(),
            Some(Route::CompleteProfile)
        );
        assert_eq!(Route::Dashboard.completion_target(), None);
    }
}
