use std::sync::{Mutex, PoisonError};

use tracing::info;

use super::route::RouteName;

/// The navigation capability the guard and the session store drive.
///
/// `cancel` aborts the transition in progress; `redirect` starts a new one.
pub trait Navigator: Send + Sync {
    fn redirect(&self, to: RouteName);
    fn cancel(&self);
}

/// One recorded navigation side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Cancelled,
    Redirected(RouteName),
}

/// A navigator that keeps the history of what it was asked to do.
///
/// Used by the command-line driver and by tests; a UI runtime would
/// implement [`Navigator`] on top of its own router instead.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    events: Mutex<Vec<NavEvent>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NavEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent redirect target, if any.
    pub fn current(&self) -> Option<RouteName> {
        self.events().iter().rev().find_map(|e| match e {
            NavEvent::Redirected(to) => Some(*to),
            NavEvent::Cancelled => None,
        })
    }

    fn push(&self, event: NavEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Navigator for HistoryNavigator {
    fn redirect(&self, to: RouteName) {
        info!(route = to.to_path(), "Navigating.");
        self.push(NavEvent::Redirected(to));
    }

    fn cancel(&self) {
        info!("Navigation cancelled.");
        self.push(NavEvent::Cancelled);
    }
}
