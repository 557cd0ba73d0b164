//! Session bindings: cookie token to "current thread" mapping.
//!
//! This is ephemeral per-client convenience state used only to default the
//! thread when a chat request omits one. It is never part of the durable
//! conversation record; restarting the process clears all bindings.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

struct Binding {
    thread_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// Server-side map from opaque session tokens to current thread ids.
///
/// Entries expire after a fixed TTL; expired entries are dropped lazily on
/// lookup and can be swept with [`prune_expired`](Self::prune_expired).
pub struct SessionBindings {
    ttl: Duration,
    bindings: DashMap<Uuid, Binding>,
}

impl SessionBindings {
    /// Create a binding map whose entries live for `ttl_minutes`.
    pub fn new(ttl_minutes: u64) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes as i64),
            bindings: DashMap::new(),
        }
    }

    /// Bind `token` to `thread_id`, resetting the entry's expiry.
    pub fn bind(&self, token: Uuid, thread_id: Uuid) {
        self.bindings.insert(
            token,
            Binding {
                thread_id,
                expires_at: Utc::now() + self.ttl,
            },
        );
    }

    /// The current thread for `token`, if a live binding exists.
    ///
    /// An expired binding is removed and treated as absent.
    pub fn current(&self, token: &Uuid) -> Option<Uuid> {
        let expired = match self.bindings.get(token) {
            Some(binding) if binding.expires_at > Utc::now() => {
                return Some(binding.thread_id);
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.bindings.remove(token);
        }
        None
    }

    /// Drop every expired binding; returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.bindings.len();
        self.bindings.retain(|_, binding| binding.expires_at > now);
        before - self.bindings.len()
    }

    /// Number of live-or-expired bindings currently held.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no bindings are held.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_current() {
        let sessions = SessionBindings::new(60);
        let token = Uuid::new_v4();
        let thread_id = Uuid::new_v4();

        assert_eq!(sessions.current(&token), None);
        sessions.bind(token, thread_id);
        assert_eq!(sessions.current(&token), Some(thread_id));
    }

    #[test]
    fn test_rebind_replaces_thread() {
        let sessions = SessionBindings::new(60);
        let token = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        sessions.bind(token, first);
        sessions.bind(token, second);
        assert_eq!(sessions.current(&token), Some(second));
    }

    #[test]
    fn test_expired_binding_is_absent_and_removed() {
        let sessions = SessionBindings::new(0);
        let token = Uuid::new_v4();
        sessions.bind(token, Uuid::new_v4());

        assert_eq!(sessions.current(&token), None);
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_prune_expired() {
        let sessions = SessionBindings::new(0);
        sessions.bind(Uuid::new_v4(), Uuid::new_v4());
        sessions.bind(Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions.prune_expired(), 2);
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_tokens_are_independent() {
        let sessions = SessionBindings::new(60);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let thread_a = Uuid::new_v4();

        sessions.bind(a, thread_a);
        assert_eq!(sessions.current(&a), Some(thread_a));
        assert_eq!(sessions.current(&b), None);
    }
}
