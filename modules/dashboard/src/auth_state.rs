//! Reactive authentication state.
//!
//! [`AuthStore`] owns a `watch` channel of [`AuthState`]. Views subscribe and map each
//! state to a [`Navigation`] with [`navigate`]; dropping the receiver is the only
//! unsubscribe step.

use std::sync::Arc;

use platform_sdk::{IdentityClient, Session};
use tokio::sync::watch;

use crate::error::DashboardError;
use crate::gate::{DashboardRoute, GateDecision, RedirectTarget, authorize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated(Session),
    /// Last sign-in attempt failed with this error code.
    Error(String),
}

impl AuthState {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// What a guarded view should do in the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Loading,
    Render(DashboardRoute),
    Redirect(RedirectTarget),
}

/// Map an auth state to a navigation for `route`.
///
/// There is no grace period: without a session the view goes straight to login.
#[must_use]
pub fn navigate(state: &AuthState, route: &DashboardRoute) -> Navigation {
    match state {
        AuthState::Authenticating => Navigation::Loading,
        AuthState::Unauthenticated | AuthState::Error(_) => {
            Navigation::Redirect(RedirectTarget::Login)
        }
        AuthState::Authenticated(session) => match authorize(Some(&session.claims), route) {
            GateDecision::Allow => Navigation::Render(route.clone()),
            GateDecision::Redirect(target) => Navigation::Redirect(target),
        },
    }
}

pub struct AuthStore<I: IdentityClient + ?Sized> {
    identity: Arc<I>,
    state: watch::Sender<AuthState>,
}

impl<I: IdentityClient + ?Sized> AuthStore<I> {
    pub fn new(identity: Arc<I>) -> Self {
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        Self { identity, state }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Sign in and refresh claims from the verified token.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, DashboardError> {
        self.state.send_replace(AuthState::Authenticating);

        let result = match self.identity.sign_in(email, password).await {
            Ok(session) => self
                .identity
                .verify_id_token(&session.id_token)
                .await
                .map(|verified| Session {
                    claims: verified.user_claims(),
                    id_token: session.id_token,
                }),
            Err(e) => Err(e),
        };

        match result {
            Ok(session) => {
                tracing::info!(uid = %session.uid(), role = ?session.claims.role, "signed in");
                self.state
                    .send_replace(AuthState::Authenticated(session.clone()));
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(email, code = e.code(), "sign-in failed");
                self.state.send_replace(AuthState::Error(e.code().to_owned()));
                Err(DashboardError::SignIn(e))
            }
        }
    }

    pub fn sign_out(&self) {
        self.state.send_replace(AuthState::Unauthenticated);
    }
}

/// Follows auth state changes for one route.
pub struct RouteWatcher {
    state: watch::Receiver<AuthState>,
    route: DashboardRoute,
}

impl RouteWatcher {
    #[must_use]
    pub fn new(state: watch::Receiver<AuthState>, route: DashboardRoute) -> Self {
        Self { state, route }
    }

    /// Navigation for the latest state, marking it seen.
    pub fn current(&mut self) -> Navigation {
        let state = self.state.borrow_and_update().clone();
        navigate(&state, &self.route)
    }

    /// Wait for the next state change. `None` once the store is dropped.
    pub async fn next(&mut self) -> Option<Navigation> {
        self.state.changed().await.ok()?;
        Some(self.current())
    }
}
