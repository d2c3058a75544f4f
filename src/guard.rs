//! Role-gated navigation guard: a pure decision over (session state,
//! requested view). It reads session state and never mutates it; exactly one
//! view is rendered per navigation request.

use crate::session::{Claims, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Dashboard,
    Admin,
}

impl View {
    pub fn required_capability(self) -> Capability {
        match self {
            View::Login | View::Register => Capability::Public,
            View::Dashboard => Capability::Authenticated,
            View::Admin => Capability::AdminOnly,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            View::Login => "login",
            View::Register => "register",
            View::Dashboard => "dashboard",
            View::Admin => "admin",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(View::Login),
            "register" => Ok(View::Register),
            "dashboard" => Ok(View::Dashboard),
            "admin" => Ok(View::Admin),
            other => Err(format!("unknown view '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Public,
    Authenticated,
    AdminOnly,
}

/// Coarse session state the guard decides on. Moderators and power users
/// share one elevated state: the backend differentiates them, the client's
/// views do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Unauthenticated,
    Viewer,
    Elevated,
    Admin,
}

impl AccessState {
    pub fn of(claims: Option<&Claims>) -> Self {
        match claims.map(|c| c.role) {
            None => AccessState::Unauthenticated,
            Some(Role::Viewer) => AccessState::Viewer,
            Some(Role::Moderator) | Some(Role::PowerUser) => AccessState::Elevated,
            Some(Role::Admin) => AccessState::Admin,
        }
    }

    pub fn is_authenticated(self) -> bool {
        self != AccessState::Unauthenticated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Render(View),
    Redirect(View),
}

/// Decide whether `requested` may be rendered for `state`. A denied request
/// redirects to login when unauthenticated, otherwise to the default
/// authenticated view; the requested view is never rendered on denial.
pub fn resolve(state: AccessState, requested: View) -> NavOutcome {
    let allowed = match requested.required_capability() {
        Capability::Public => true,
        Capability::Authenticated => state.is_authenticated(),
        Capability::AdminOnly => state == AccessState::Admin,
    };
    if allowed {
        NavOutcome::Render(requested)
    } else if state.is_authenticated() {
        NavOutcome::Redirect(View::Dashboard)
    } else {
        NavOutcome::Redirect(View::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [AccessState; 4] = [
        AccessState::Unauthenticated,
        AccessState::Viewer,
        AccessState::Elevated,
        AccessState::Admin,
    ];

    #[test]
    fn public_views_render_for_everyone() {
        for state in STATES {
            assert_eq!(resolve(state, View::Login), NavOutcome::Render(View::Login));
            assert_eq!(resolve(state, View::Register), NavOutcome::Render(View::Register));
        }
    }

    #[test]
    fn dashboard_requires_authentication() {
        assert_eq!(
            resolve(AccessState::Unauthenticated, View::Dashboard),
            NavOutcome::Redirect(View::Login)
        );
        for state in [AccessState::Viewer, AccessState::Elevated, AccessState::Admin] {
            assert_eq!(resolve(state, View::Dashboard), NavOutcome::Render(View::Dashboard));
        }
    }

    #[test]
    fn admin_view_is_admin_only() {
        assert_eq!(
            resolve(AccessState::Unauthenticated, View::Admin),
            NavOutcome::Redirect(View::Login)
        );
        // authenticated non-admins bounce to the default authenticated view,
        // never rendering the admin view
        for state in [AccessState::Viewer, AccessState::Elevated] {
            assert_eq!(resolve(state, View::Admin), NavOutcome::Redirect(View::Dashboard));
        }
        assert_eq!(resolve(AccessState::Admin, View::Admin), NavOutcome::Render(View::Admin));
    }

    #[test]
    fn access_state_from_claims() {
        use crate::session::Role;
        let claims = |role: Role| crate::session::Claims {
            sub: "1".into(),
            username: "u".into(),
            role,
            is_active: true,
            exp: 0,
        };
        assert_eq!(AccessState::of(None), AccessState::Unauthenticated);
        assert_eq!(AccessState::of(Some(&claims(Role::Viewer))), AccessState::Viewer);
        assert_eq!(AccessState::of(Some(&claims(Role::PowerUser))), AccessState::Elevated);
        assert_eq!(AccessState::of(Some(&claims(Role::Moderator))), AccessState::Elevated);
        assert_eq!(AccessState::of(Some(&claims(Role::Admin))), AccessState::Admin);
    }
}
