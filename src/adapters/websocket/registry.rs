//! Session registry: which users are connected, and through which sessions.
//!
//! # Architecture
//!
//! ```text
//! shard 0                      shard 1
//! ├── user 4                   └── user 7
//! │   ├── session a → outbox       └── session d → outbox
//! │   └── session b → outbox
//! └── user 12
//!     └── session c → outbox
//! ```
//!
//! A message for user 4 is copied into the outboxes of sessions a and b.
//! Each outbox is drained by that connection's writer task.
//!
//! Every operation is synchronous. Locks are taken, used, and released
//! without awaiting, so callers on any task can use the registry freely.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;

use crate::domain::foundation::{SessionId, UserId};
use crate::ports::PresenceChecker;

use super::messages::ServerMessage;

type SessionMap = HashMap<UserId, HashMap<SessionId, SessionHandle>>;

/// Registry-side handle of one live session.
///
/// Holds the sending half of the session's outbound queue and the signal used
/// to tell the session to close.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    outbox: mpsc::Sender<ServerMessage>,
    closer: Arc<Notify>,
}

/// Connection-side half of a session: the queue its writer drains and the
/// signal it waits on for forced closure.
#[derive(Debug)]
pub struct SessionOutbox {
    pub messages: mpsc::Receiver<ServerMessage>,
    pub closer: Arc<Notify>,
}

impl SessionHandle {
    /// Create a session with an outbound queue of `capacity` messages.
    pub fn channel(capacity: usize) -> (Self, SessionOutbox) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let closer = Arc::new(Notify::new());
        let handle = Self {
            id: SessionId::new(),
            outbox: tx,
            closer: closer.clone(),
        };
        (
            handle,
            SessionOutbox {
                messages: rx,
                closer,
            },
        )
    }

    /// The session's id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Another sender onto this session's outbound queue.
    pub fn sender(&self) -> mpsc::Sender<ServerMessage> {
        self.outbox.clone()
    }

    /// Queue a message for this session only. Never waits.
    pub fn try_send(&self, message: ServerMessage) -> Result<(), TrySendError<ServerMessage>> {
        self.outbox.try_send(message)
    }

    /// Ask the session to close.
    ///
    /// The permit is stored, so a session that is not currently waiting
    /// still sees it on its next wait.
    pub fn close(&self) {
        self.closer.notify_one();
    }
}

/// Process-wide registry of live sessions, keyed by user.
///
/// Users hash into a fixed number of shards, each behind its own `RwLock`.
/// Deliveries (reads) to users in different shards never contend, and
/// register/deregister only lock the owning user's shard.
pub struct SessionRegistry {
    shards: Vec<RwLock<SessionMap>>,
    outbound_buffer: usize,
}

impl SessionRegistry {
    /// Create a registry with `shard_count` shards whose sessions get
    /// outbound queues of `outbound_buffer` messages.
    pub fn new(shard_count: usize, outbound_buffer: usize) -> Self {
        let shard_count = shard_count.max(1);
        Self {
            shards: (0..shard_count).map(|_| RwLock::new(HashMap::new())).collect(),
            outbound_buffer,
        }
    }

    /// Create with 16 shards and 64-message queues.
    pub fn with_defaults() -> Self {
        Self::new(16, 64)
    }

    /// Open a new session handle sized by this registry's settings.
    ///
    /// The handle is not registered yet; see [`register`](Self::register).
    pub fn open_session(&self) -> (SessionHandle, SessionOutbox) {
        SessionHandle::channel(self.outbound_buffer)
    }

    /// Add a session to the user's set. The user is online afterwards.
    pub fn register(&self, user: UserId, handle: SessionHandle) {
        let session_id = handle.id;
        let count = {
            let mut shard = self.write_shard(&user);
            let sessions = shard.entry(user).or_default();
            sessions.insert(session_id, handle);
            sessions.len()
        };

        tracing::debug!(
            user_id = %user,
            session_id = %session_id,
            sessions = count,
            "Session registered"
        );
    }

    /// Remove a session from the user's set.
    ///
    /// Removes the user entirely once the set is empty. Returns whether the
    /// session was present; removing an absent session changes nothing.
    pub fn deregister(&self, user: &UserId, session: &SessionId) -> bool {
        let (removed, remaining) = {
            let mut shard = self.write_shard(user);
            let Some(sessions) = shard.get_mut(user) else {
                return false;
            };
            let removed = sessions.remove(session).is_some();
            let remaining = sessions.len();
            if remaining == 0 {
                shard.remove(user);
            }
            (removed, remaining)
        };

        if removed {
            tracing::debug!(
                user_id = %user,
                session_id = %session,
                remaining,
                "Session deregistered"
            );
        }
        removed
    }

    /// Deliver `payload` to every session of `user`.
    ///
    /// An offline user gets nothing and nothing is queued for later. A
    /// session whose queue is closed or full is evicted and told to close;
    /// the other sessions still receive the payload. Returns the number of
    /// sessions the payload was queued on.
    pub fn send_to_user(&self, user: &UserId, payload: &ServerMessage) -> usize {
        let mut delivered = 0;
        let mut failed = Vec::new();

        {
            let shard = self.read_shard(user);
            let Some(sessions) = shard.get(user) else {
                return 0;
            };
            for (session_id, handle) in sessions {
                match handle.try_send(payload.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(
                            user_id = %user,
                            session_id = %session_id,
                            "Outbound queue full, evicting session"
                        );
                        failed.push(*session_id);
                    }
                    Err(TrySendError::Closed(_)) => {
                        tracing::debug!(
                            user_id = %user,
                            session_id = %session_id,
                            "Outbound queue closed, evicting session"
                        );
                        failed.push(*session_id);
                    }
                }
            }
        }

        if !failed.is_empty() {
            self.evict(user, &failed);
        }
        delivered
    }

    /// True iff `user` has at least one registered session.
    pub fn is_online(&self, user: &UserId) -> bool {
        self.read_shard(user)
            .get(user)
            .map_or(false, |sessions| !sessions.is_empty())
    }

    /// Number of sessions registered for `user`.
    pub fn session_count(&self, user: &UserId) -> usize {
        self.read_shard(user).get(user).map_or(0, HashMap::len)
    }

    /// Number of sessions across all users.
    pub fn total_sessions(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                read(shard)
                    .values()
                    .map(HashMap::len)
                    .sum::<usize>()
            })
            .sum()
    }

    /// All users with at least one session, in ascending id order.
    pub fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .shards
            .iter()
            .flat_map(|shard| read(shard).keys().copied().collect::<Vec<_>>())
            .collect();
        users.sort();
        users
    }

    /// Remove every session and tell each to close. Returns how many were
    /// closed.
    pub fn close_all(&self) -> usize {
        let mut closed = 0;
        for shard in &self.shards {
            let drained: Vec<SessionHandle> = write(shard)
                .drain()
                .flat_map(|(_, sessions)| sessions.into_values())
                .collect();
            for handle in drained {
                handle.close();
                closed += 1;
            }
        }

        tracing::info!(sessions = closed, "Closed all sessions");
        closed
    }

    fn evict(&self, user: &UserId, sessions: &[SessionId]) {
        let evicted: Vec<SessionHandle> = {
            let mut shard = self.write_shard(user);
            let Some(set) = shard.get_mut(user) else {
                return;
            };
            let evicted = sessions.iter().filter_map(|id| set.remove(id)).collect();
            if set.is_empty() {
                shard.remove(user);
            }
            evicted
        };

        for handle in evicted {
            handle.close();
        }
    }

    fn shard_index(&self, user: &UserId) -> usize {
        let mut hasher = DefaultHasher::new();
        user.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    fn read_shard(&self, user: &UserId) -> RwLockReadGuard<'_, SessionMap> {
        read(&self.shards[self.shard_index(user)])
    }

    fn write_shard(&self, user: &UserId) -> RwLockWriteGuard<'_, SessionMap> {
        write(&self.shards[self.shard_index(user)])
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PresenceChecker for SessionRegistry {
    fn is_online(&self, user: &UserId) -> bool {
        SessionRegistry::is_online(self, user)
    }
}

// A panic while holding a shard lock cannot leave a half-applied map edit
// behind (every edit is a single insert or remove), so poisoned locks are
// still safe to use.
fn read(shard: &RwLock<SessionMap>) -> RwLockReadGuard<'_, SessionMap> {
    shard.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(shard: &RwLock<SessionMap>) -> RwLockWriteGuard<'_, SessionMap> {
    shard.write().unwrap_or_else(PoisonError::into_inner)
}
