//! Presence port - is a user reachable over a live connection right now?

use crate::domain::foundation::UserId;

/// Answers live-presence questions.
///
/// Implemented by the in-process session registry. Answers must reflect the
/// state at call time; implementations must not cache them.
pub trait PresenceChecker: Send + Sync {
    /// True iff `user` currently has at least one open session.
    fn is_online(&self, user: &UserId) -> bool;
}
