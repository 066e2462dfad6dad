use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::models::{ChatMessage, ChatRole};

/// Bounds applied to every session. `max_history_messages == 0` disables the
/// cap and `idle_ttl == None` disables eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub max_history_messages: usize,
    pub idle_ttl: Option<Duration>,
}

impl SessionPolicy {
    pub fn unbounded() -> Self {
        Self {
            max_history_messages: 0,
            idle_ttl: None,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    history: Vec<ChatMessage>,
    last_activity: Instant,
}

impl Session {
    fn new(now: Instant) -> Self {
        Self {
            history: Vec::new(),
            last_activity: now,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
        self.last_activity = Instant::now();
    }

    /// Drops the oldest messages so one more user/assistant turn fits under
    /// `max_messages`. Returns how many messages were dropped.
    pub fn make_room_for_turn(&mut self, max_messages: usize) -> usize {
        if max_messages == 0 {
            return 0;
        }

        let max_messages = max_messages.max(2);
        let mut drop_count = (self.history.len() + 2).saturating_sub(max_messages);
        // history must not open on an orphaned assistant reply
        while self
            .history
            .get(drop_count)
            .is_some_and(|message| message.role == ChatRole::Assistant)
        {
            drop_count += 1;
        }

        let drop_count = drop_count.min(self.history.len());
        self.history.drain(..drop_count);
        drop_count
    }
}

pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// Process-wide map from client-supplied session id to its history.
///
/// Each session sits behind its own async mutex; holding it across the
/// completion call keeps at most one round trip in flight per session.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<Mutex<HashMap<String, SessionHandle>>>,
    policy: SessionPolicy,
}

impl SessionStore {
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            policy,
        }
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn get_or_create(&self, session_id: &str) -> SessionHandle {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = entries.get(session_id) {
            return Arc::clone(handle);
        }

        let handle = Arc::new(tokio::sync::Mutex::new(Session::new(Instant::now())));
        entries.insert(session_id.to_string(), Arc::clone(&handle));
        handle
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(session_id)
    }

    /// Copy of a session's history; waits for any in-flight turn to finish.
    pub async fn snapshot(&self, session_id: &str) -> Option<Vec<ChatMessage>> {
        let handle = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()?;
        let session = handle.lock().await;
        Some(session.history().to_vec())
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn spawn_pruner(&self, interval: Duration) -> Option<tokio::task::JoinHandle<()>> {
        self.policy.idle_ttl?;

        let store = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = store.prune_idle_at(Instant::now());
                if evicted > 0 {
                    debug!(evicted, remaining = store.len(), "pruned idle sessions");
                }
            }
        }))
    }

    /// Evicts sessions idle for longer than the policy TTL. Sessions that are
    /// locked or referenced outside the store are kept.
    pub fn prune_idle_at(&self, now: Instant) -> usize {
        let Some(idle_ttl) = self.policy.idle_ttl else {
            return 0;
        };
        let Some(cutoff) = now.checked_sub(idle_ttl) else {
            return 0;
        };

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => session.last_activity > cutoff,
                Err(_) => true,
            }
        });
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(store: &SessionStore, id: &str, prompt: &str, reply: &str) -> SessionHandle {
        let handle = store.get_or_create(id);
        {
            let mut session = handle.try_lock().expect("fresh session should be unlocked");
            session.push(ChatMessage::user(prompt));
            session.push(ChatMessage::assistant(reply));
        }
        handle
    }

    #[tokio::test]
    async fn get_or_create_returns_same_storage_for_same_id() {
        let store = SessionStore::new(SessionPolicy::unbounded());
        let first = store.get_or_create("u1");
        first.lock().await.push(ChatMessage::user("hello"));

        let second = store.get_or_create("u1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.history(), &[ChatMessage::user("hello")]);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn different_ids_do_not_share_history() {
        let store = SessionStore::new(SessionPolicy::unbounded());
        drop(turn(&store, "u1", "a", "b"));
        drop(turn(&store, "u2", "c", "d"));

        assert_eq!(
            store.snapshot("u1").await,
            Some(vec![ChatMessage::user("a"), ChatMessage::assistant("b")])
        );
        assert_eq!(
            store.snapshot("u2").await,
            Some(vec![ChatMessage::user("c"), ChatMessage::assistant("d")])
        );
        assert!(store.snapshot("u3").await.is_none());
        assert!(!store.contains("u3"));
    }

    #[test]
    fn make_room_drops_oldest_whole_turns() {
        let mut session = Session::new(Instant::now());
        for index in 0..3 {
            session.push(ChatMessage::user(format!("q{index}")));
            session.push(ChatMessage::assistant(format!("a{index}")));
        }

        let dropped = session.make_room_for_turn(6);

        assert_eq!(dropped, 2);
        assert_eq!(
            session.history(),
            &[
                ChatMessage::user("q1"),
                ChatMessage::assistant("a1"),
                ChatMessage::user("q2"),
                ChatMessage::assistant("a2"),
            ]
        );
    }

    #[test]
    fn make_room_never_leaves_leading_assistant_message() {
        let mut session = Session::new(Instant::now());
        session.push(ChatMessage::user("failed turn"));
        session.push(ChatMessage::user("q1"));
        session.push(ChatMessage::assistant("a1"));

        let dropped = session.make_room_for_turn(4);

        assert_eq!(dropped, 1);
        assert_eq!(
            session.history(),
            &[ChatMessage::user("q1"), ChatMessage::assistant("a1")]
        );

        assert_eq!(session.make_room_for_turn(3), 2);
        assert!(session.history().is_empty());
    }

    #[test]
    fn zero_cap_keeps_everything() {
        let mut session = Session::new(Instant::now());
        for index in 0..50 {
            session.push(ChatMessage::user(format!("q{index}")));
        }
        assert_eq!(session.make_room_for_turn(0), 0);
        assert_eq!(session.history().len(), 50);
    }

    #[test]
    fn idle_sessions_are_pruned_but_referenced_ones_are_kept() {
        let store = SessionStore::new(SessionPolicy {
            max_history_messages: 0,
            idle_ttl: Some(Duration::from_secs(60)),
        });
        drop(turn(&store, "idle", "a", "b"));
        let held = turn(&store, "held", "c", "d");

        let later = Instant::now() + Duration::from_secs(120);
        assert_eq!(store.prune_idle_at(later), 1);
        assert!(!store.contains("idle"));
        assert!(store.contains("held"));

        drop(held);
        assert_eq!(store.prune_idle_at(later), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn recent_sessions_survive_pruning_and_disabled_ttl_prunes_nothing() {
        let store = SessionStore::new(SessionPolicy {
            max_history_messages: 200,
            idle_ttl: Some(Duration::from_secs(86_400)),
        });
        drop(turn(&store, "recent", "a", "b"));
        assert_eq!(store.prune_idle_at(Instant::now()), 0);

        let unbounded = SessionStore::new(SessionPolicy::unbounded());
        drop(turn(&unbounded, "u1", "a", "b"));
        assert_eq!(
            unbounded.prune_idle_at(Instant::now() + Duration::from_secs(10_000_000)),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pruner_task_evicts_sessions_once_they_go_idle() {
        let store = SessionStore::new(SessionPolicy {
            max_history_messages: 0,
            idle_ttl: Some(Duration::from_secs(60)),
        });
        drop(turn(&store, "idle", "a", "b"));
        let pruner = store
            .spawn_pruner(Duration::from_secs(10))
            .expect("ttl policy should spawn a pruner");

        tokio::time::sleep(Duration::from_secs(55)).await;
        assert!(store.contains("idle"));

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!store.contains("idle"));

        pruner.abort();
    }

    #[tokio::test]
    async fn pruner_is_not_spawned_without_a_ttl() {
        let store = SessionStore::new(SessionPolicy::unbounded());
        assert!(store.spawn_pruner(Duration::from_secs(1)).is_none());
    }
}
