//! In-memory session flags.
//!
//! One `Session` is created at startup (anonymous) and shared by reference
//! with the fetch helper, the guard and the session store. Every mutation is
//! idempotent so overlapping requests can finish in any order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use crate::models::Credentials;

/// A point-in-time copy of the session flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub is_submitting: bool,
    /// Only populated while a login submission is in flight.
    pub current_user: Option<Credentials>,
}

#[derive(Debug, Default)]
struct Inner {
    authenticated: bool,
    submitting: usize,
    current_user: Option<Credentials>,
}

/// Process-wide session flags.
#[derive(Debug, Default)]
pub struct Session {
    inner: RwLock<Inner>,
    /// Bumped by every logout; a login only commits if it is unchanged.
    epoch: AtomicU64,
}

impl Session {
    /// A fresh, anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SessionState {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        SessionState {
            authenticated: inner.authenticated,
            is_submitting: inner.submitting > 0,
            current_user: inner.current_user.clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().authenticated
    }

    pub fn is_submitting(&self) -> bool {
        self.snapshot().is_submitting
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.write().authenticated = authenticated;
    }

    /// Re-derives the flag from the presence of a persisted token that was
    /// read while `epoch` was current. A token read before a logout cannot
    /// raise the flag again.
    pub fn sync_with_token(&self, token_present: bool, epoch: u64) {
        if token_present {
            self.authenticate_if_current(epoch);
        } else {
            self.set_authenticated(false);
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Ends the current session generation; logins started before this
    /// call can no longer commit.
    pub fn invalidate(&self) {
        let mut inner = self.write();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        inner.authenticated = false;
        inner.current_user = None;
    }

    /// True if no logout happened since `epoch` was read.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch() == epoch
    }

    /// Marks the session authenticated unless a logout happened since
    /// `epoch` was read. Returns whether the flag was set.
    pub fn authenticate_if_current(&self, epoch: u64) -> bool {
        let mut inner = self.write();
        if self.epoch() != epoch {
            return false;
        }
        inner.authenticated = true;
        true
    }

    /// Raises the busy flag until the returned guard is dropped.
    pub fn begin_submit(&self) -> SubmitGuard<'_> {
        self.write().submitting += 1;
        SubmitGuard {
            session: self,
            clears_user: false,
        }
    }

    /// Like [`Session::begin_submit`], and also holds `credentials` as the
    /// current user until the guard is dropped.
    pub fn begin_login(&self, credentials: Credentials) -> SubmitGuard<'_> {
        {
            let mut inner = self.write();
            inner.submitting += 1;
            inner.current_user = Some(credentials);
        }
        SubmitGuard {
            session: self,
            clears_user: true,
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps `is_submitting` raised; lowers it on drop, on every exit path.
#[must_use = "the busy flag is lowered as soon as the guard is dropped"]
pub struct SubmitGuard<'a> {
    session: &'a Session,
    clears_user: bool,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.session.write();
        inner.submitting = inner.submitting.saturating_sub(1);
        if self.clears_user {
            inner.current_user = None;
        }
    }
}
