//! Cancellation and deadline handling for configuration loads.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Why a load stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    /// The caller cancelled the load.
    #[error("load cancelled")]
    Cancelled,

    /// The load ran past its deadline.
    #[error("load deadline exceeded")]
    DeadlineExceeded,
}

/// A cancellable, optionally time-bounded context handed to every source.
///
/// Sources are expected to call [`LoadContext::check`] around blocking work.
/// Nothing forcibly stops a source that never checks.
///
/// # Examples
///
/// ```rust
/// use layered_config::core::LoadContext;
/// use std::time::Duration;
///
/// let ctx = LoadContext::with_timeout(Duration::from_secs(5));
/// assert!(ctx.check().is_ok());
///
/// ctx.cancel();
/// assert!(ctx.check().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct LoadContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl LoadContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(deadline_after(timeout))
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A context cancelled through an existing token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a child bounded by `timeout` from now.
    ///
    /// The child keeps the earlier of the two deadlines and is cancelled when
    /// the parent is. Cancelling the child leaves the parent untouched.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let own = deadline_after(timeout);
        let deadline = match self.deadline {
            Some(parent) if parent < own => parent,
            _ => own,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The cancellation token backing this context.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` means unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns true once the context is cancelled or past its deadline.
    pub fn is_done(&self) -> bool {
        self.check().is_err()
    }

    /// Fail if the context is cancelled or past its deadline.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted::Cancelled`] or [`Interrupted::DeadlineExceeded`].
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.token.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for LoadContext {
    fn default() -> Self {
        Self::background()
    }
}

// Durations too large to add to `now` are treated as "far future".
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(60 * 60 * 24 * 365 * 100))
}
