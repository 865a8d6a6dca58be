//! Role-gated navigation decisions.
//!
//! The guard is a pure function over declarative route metadata and a
//! session snapshot; it never suspends and never talks to the network.
//! Whatever routing mechanism hosts it calls [`can_enter`] before
//! committing to a protected route and acts on the returned decision.

use crate::session::SessionSnapshot;

/// Access requirement declared on a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Anyone may enter.
    Public,
    /// Any authenticated session may enter.
    Authenticated,
    /// Only sessions holding the given role may enter.
    Role(String),
}

impl RouteAccess {
    /// Convenience constructor for a role requirement.
    pub fn role(label: impl Into<String>) -> Self {
        RouteAccess::Role(label.into())
    }
}

/// Where to send a denied navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    /// The login view: the user is not authenticated.
    Login,
    /// The home view: the user is authenticated but lacks the role.
    Home,
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect {
        target: RedirectTarget,
        /// The originally requested location, remembered so the login
        /// flow can return there afterwards. Only set on redirects to
        /// the login view.
        return_to: Option<String>,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn to_login(requested: Option<&str>) -> Self {
        Decision::Redirect {
            target: RedirectTarget::Login,
            return_to: requested.map(ToOwned::to_owned),
        }
    }

    fn to_home() -> Self {
        Decision::Redirect {
            target: RedirectTarget::Home,
            return_to: None,
        }
    }
}

/// Decides whether navigation into a route may proceed.
///
/// - No requirement: allowed.
/// - Requirement present but the session is not authenticated:
///   redirect to login, remembering the requested location if given.
/// - Role requirement not satisfied by an authenticated session:
///   redirect to home (the user is signed in, just not authorized).
/// - Requirement satisfied: allowed.
pub fn can_enter(
    access: &RouteAccess,
    snapshot: &SessionSnapshot,
    requested: Option<&str>,
) -> Decision {
    match access {
        RouteAccess::Public => Decision::Allow,
        RouteAccess::Authenticated => {
            if snapshot.is_authenticated() {
                Decision::Allow
            } else {
                Decision::to_login(requested)
            }
        }
        RouteAccess::Role(role) => {
            if !snapshot.is_authenticated() {
                Decision::to_login(requested)
            } else if snapshot.has_role(role) {
                Decision::Allow
            } else {
                Decision::to_home()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::mock_identity;

    fn admin() -> SessionSnapshot {
        SessionSnapshot::authenticated(mock_identity("amalia", &["ADMIN"]))
    }

    fn user() -> SessionSnapshot {
        SessionSnapshot::authenticated(mock_identity("bruno", &["USER"]))
    }

    #[test]
    fn test_public_route_is_always_allowed() {
        assert!(can_enter(&RouteAccess::Public, &SessionSnapshot::anonymous(), None).is_allowed());
        assert!(can_enter(&RouteAccess::Public, &admin(), None).is_allowed());
    }

    #[test]
    fn test_anonymous_is_sent_to_login() {
        let decision = can_enter(
            &RouteAccess::Authenticated,
            &SessionSnapshot::anonymous(),
            Some("/notas"),
        );

        assert_eq!(
            decision,
            Decision::Redirect {
                target: RedirectTarget::Login,
                return_to: Some("/notas".to_owned()),
            }
        );
    }

    #[test]
    fn test_anonymous_on_role_route_is_sent_to_login() {
        let decision = can_enter(
            &RouteAccess::role("ADMIN"),
            &SessionSnapshot::anonymous(),
            None,
        );

        assert_eq!(
            decision,
            Decision::Redirect {
                target: RedirectTarget::Login,
                return_to: None,
            }
        );
    }

    #[test]
    fn test_authenticated_user_enters_authenticated_route() {
        assert!(can_enter(&RouteAccess::Authenticated, &user(), None).is_allowed());
    }

    #[test]
    fn test_admin_enters_admin_route() {
        assert!(can_enter(&RouteAccess::role("ADMIN"), &admin(), Some("/admin")).is_allowed());
    }

    #[test]
    fn test_wrong_role_is_sent_home_not_to_login() {
        let decision = can_enter(&RouteAccess::role("ADMIN"), &user(), Some("/admin/usuarios"));

        // authenticated but unauthorized: home, and no return location
        assert_eq!(
            decision,
            Decision::Redirect {
                target: RedirectTarget::Home,
                return_to: None,
            }
        );
    }

    #[test]
    fn test_role_requirement_is_case_sensitive() {
        let lowercase_admin = SessionSnapshot::authenticated(mock_identity("carla", &["admin"]));
        let decision = can_enter(&RouteAccess::role("ADMIN"), &lowercase_admin, None);

        assert_eq!(
            decision,
            Decision::Redirect {
                target: RedirectTarget::Home,
                return_to: None,
            }
        );
    }
}
