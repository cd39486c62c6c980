//! Route guard evaluated before every navigation.
//!
//! Reads the persisted token, resynchronises the session flag from it, then
//! allows the transition or cancels it in favour of a redirect.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::navigation::{Navigator, ResolvedRoute, RouteName, RouteTable};
use crate::session::Session;
use crate::store::TokenStore;

/// The outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow(ResolvedRoute),
    Redirect(RouteName),
}

/// The decision table, first match wins:
/// 1. unknown page -> not-found
/// 2. token and login page -> home
/// 3. no token and a page other than login/not-found -> login
/// 4. otherwise allow
pub fn decide(token_present: bool, target: Option<&ResolvedRoute>) -> GuardDecision {
    let Some(target) = target else {
        return GuardDecision::Redirect(RouteName::NotFound);
    };
    if token_present && target.is(RouteName::Login) {
        return GuardDecision::Redirect(RouteName::Index);
    }
    if !token_present && !target.is(RouteName::Login) && !target.is(RouteName::NotFound) {
        return GuardDecision::Redirect(RouteName::Login);
    }
    GuardDecision::Allow(target.clone())
}

pub struct RouteGuard {
    routes: RouteTable,
    tokens: Arc<dyn TokenStore>,
    session: Arc<Session>,
    navigator: Arc<dyn Navigator>,
}

impl RouteGuard {
    pub fn new(
        routes: RouteTable,
        tokens: Arc<dyn TokenStore>,
        session: Arc<Session>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            routes,
            tokens,
            session,
            navigator,
        }
    }

    /// Runs the guard for a transition to `path`.
    ///
    /// A redirect cancels the pending navigation and starts a new one on
    /// the navigator before returning.
    pub async fn before_each(&self, path: &str) -> GuardDecision {
        let epoch = self.session.epoch();
        let token_present = match self.tokens.get().await {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!("Could not read persisted token, treating as absent: {}", e);
                false
            }
        };
        self.session.sync_with_token(token_present, epoch);

        let target = self.routes.resolve(path);
        let decision = decide(token_present, target.as_ref());
        match &decision {
            GuardDecision::Allow(route) => {
                debug!(path, route = route.name.as_str(), "Navigation allowed.");
            }
            GuardDecision::Redirect(to) => {
                info!(path, redirect = to.to_path(), "Navigation redirected.");
                self.navigator.cancel();
                self.navigator.redirect(*to);
            }
        }
        decision
    }
}
