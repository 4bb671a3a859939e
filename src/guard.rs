//! Access Guard
//!
//! Pre-navigation access decisions over the session state. The check is
//! pure and synchronous: it reads the session manager and answers before
//! navigation proceeds, with no retries and no suspension. Denial always
//! resolves to a redirect target, never an error.

use crate::session::SessionManager;

/// Route surface consumed by the guard and the request pipeline
pub mod routes {
    /// Sign-in view, fallback for denied protected routes
    pub const LOGIN: &str = "/login";
    /// Registration view
    pub const REGISTER: &str = "/register";
    /// Protected landing view, fallback for denied auth-only routes
    pub const HOME: &str = "/hello";
    /// Password recovery view
    pub const RECOVERY: &str = "/recovery";
    /// Password reset view; the token is carried in the path
    pub const RESET_PREFIX: &str = "/reset";
}

/// Kind of access restriction a route carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Requires an authenticated session
    Protected,
    /// Only reachable while signed out (login/register)
    AuthOnly,
}

/// Outcome of a guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Navigation may proceed
    Allow,
    /// Navigation is denied; go to the fallback view instead
    Redirect(&'static str),
}

/// Whether the current session state admits entering a route of `kind`
pub fn can_enter(kind: RouteKind, session: &SessionManager) -> bool {
    match kind {
        RouteKind::Protected => session.is_authenticated(),
        RouteKind::AuthOnly => !session.is_authenticated(),
    }
}

/// Decide entry for a route of `kind`, with the fallback on denial
pub fn check(kind: RouteKind, session: &SessionManager) -> GuardOutcome {
    if can_enter(kind, session) {
        GuardOutcome::Allow
    } else {
        GuardOutcome::Redirect(match kind {
            RouteKind::Protected => routes::LOGIN,
            RouteKind::AuthOnly => routes::HOME,
        })
    }
}

/// Navigation sink implemented by the embedding shell
///
/// The request pipeline drives it on forced expiry; guard callers drive it
/// on a `Redirect` outcome.
pub trait Navigator: Send + Sync {
    /// Move the UI to `route`
    fn navigate(&self, route: &str);
}
