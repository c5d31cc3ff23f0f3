//! Sliding reward window over decision listeners
//!
//! Listeners are stored once in a [`ListenerArena`] and referred to by
//! [`ListenerId`] from every registry that tracks them, so a reward added
//! through one registry is visible through all of them.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

use crate::config::RewardConfig;
use crate::error::Result;
use crate::record::RewardedDecision;

/// Handle to a listener stored in a [`ListenerArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Listener {
    timestamp: DateTime<Utc>,
    decision: RewardedDecision,
}

/// Owns every listener created during a batch
#[derive(Debug, Clone, Default)]
pub struct ListenerArena {
    listeners: Vec<Listener>,
}

impl ListenerArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a decision that listens from `timestamp` onwards
    pub fn insert(&mut self, timestamp: DateTime<Utc>, decision: RewardedDecision) -> ListenerId {
        let id = ListenerId(self.listeners.len());
        self.listeners.push(Listener {
            timestamp,
            decision,
        });
        id
    }

    pub fn get(&self, id: ListenerId) -> Option<&RewardedDecision> {
        self.listeners.get(id.0).map(|l| &l.decision)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Consume the arena, yielding decisions in insertion order
    pub fn into_decisions(self) -> Vec<RewardedDecision> {
        self.listeners.into_iter().map(|l| l.decision).collect()
    }
}

/// Expires listeners outside the reward window and rewards the rest
#[derive(Debug, Clone)]
pub struct ListenerWindow {
    window: TimeDelta,
    default_reward_value: f64,
}

impl ListenerWindow {
    /// Create a window of `window` length
    ///
    /// Windows too large for a [`TimeDelta`] saturate, so nothing ever expires.
    pub fn new(window: Duration, default_reward_value: f64) -> Self {
        Self {
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
            default_reward_value,
        }
    }

    pub fn from_config(config: &RewardConfig) -> Self {
        Self::new(config.reward_window, config.default_reward_value)
    }

    /// True when a listener from `listener_timestamp` can no longer be rewarded at `at`
    pub fn is_expired(&self, listener_timestamp: DateTime<Utc>, at: DateTime<Utc>) -> bool {
        match listener_timestamp.checked_add_signed(self.window) {
            Some(deadline) => deadline < at,
            None => false,
        }
    }

    /// Apply a reward arriving at `record_timestamp` to `listeners`
    ///
    /// Expired listeners are removed from `listeners` for good; every other
    /// listener has `reward` added to its accumulator. The first listener
    /// that cannot accept the reward stops accumulation and its error is
    /// returned; expiry still applies to the whole list.
    pub fn update_listeners(
        &self,
        arena: &mut ListenerArena,
        listeners: &mut Vec<ListenerId>,
        record_timestamp: DateTime<Utc>,
        reward: f64,
    ) -> Result<()> {
        let mut outcome = Ok(());
        listeners.retain(|id| {
            let Some(listener) = arena.listeners.get_mut(id.0) else {
                return false;
            };
            if self.is_expired(listener.timestamp, record_timestamp) {
                trace!(listener = id.0, "Listener expired");
                return false;
            }
            if outcome.is_ok() {
                outcome = listener
                    .decision
                    .add_reward(reward, self.default_reward_value);
            }
            true
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoinError;
    use crate::record::Record;
    use chrono::TimeZone;
    use serde_json::json;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::seconds(secs)
    }

    fn listen(arena: &mut ListenerArena, at: DateTime<Utc>) -> ListenerId {
        arena.insert(at, RewardedDecision::from_decision(&Record::decision("m", at)))
    }

    fn window() -> ListenerWindow {
        ListenerWindow::new(Duration::from_secs(60), 0.0)
    }

    #[test]
    fn test_reward_reaches_listener_inside_window() {
        let mut arena = ListenerArena::new();
        let id = listen(&mut arena, t(0));
        let mut listeners = vec![id];

        window().update_listeners(&mut arena, &mut listeners, t(30), 2.0).unwrap();

        assert_eq!(listeners, vec![id]);
        assert_eq!(arena.get(id).unwrap().reward, Some(2.0));
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let mut arena = ListenerArena::new();
        let id = listen(&mut arena, t(0));
        let mut listeners = vec![id];

        window().update_listeners(&mut arena, &mut listeners, t(60), 1.0).unwrap();

        assert_eq!(arena.get(id).unwrap().reward, Some(1.0));
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_expired_listener_is_removed_and_unrewarded() {
        let mut arena = ListenerArena::new();
        let id = listen(&mut arena, t(0));
        let mut listeners = vec![id];

        window().update_listeners(&mut arena, &mut listeners, t(61), 1.0).unwrap();

        assert!(listeners.is_empty());
        assert_eq!(arena.get(id).unwrap().reward, None);
    }

    #[test]
    fn test_mixed_listeners_keep_order() {
        let mut arena = ListenerArena::new();
        let old = listen(&mut arena, t(0));
        let a = listen(&mut arena, t(50));
        let older = listen(&mut arena, t(-10));
        let b = listen(&mut arena, t(70));
        let mut listeners = vec![old, a, older, b];

        window().update_listeners(&mut arena, &mut listeners, t(100), 3.0).unwrap();

        assert_eq!(listeners, vec![a, b]);
        assert_eq!(arena.get(a).unwrap().reward, Some(3.0));
        assert_eq!(arena.get(b).unwrap().reward, Some(3.0));
        assert_eq!(arena.get(old).unwrap().reward, None);
    }

    #[test]
    fn test_rewards_accumulate() {
        let mut arena = ListenerArena::new();
        let id = listen(&mut arena, t(0));
        let mut listeners = vec![id];
        let window = window();

        window.update_listeners(&mut arena, &mut listeners, t(1), 2.0).unwrap();
        window.update_listeners(&mut arena, &mut listeners, t(2), -0.5).unwrap();

        assert_eq!(arena.get(id).unwrap().reward, Some(1.5));
    }

    #[test]
    fn test_default_base_applied_once() {
        let mut arena = ListenerArena::new();
        let id = listen(&mut arena, t(0));
        let mut listeners = vec![id];
        let window = ListenerWindow::new(Duration::from_secs(60), 10.0);

        window.update_listeners(&mut arena, &mut listeners, t(1), 1.0).unwrap();
        window.update_listeners(&mut arena, &mut listeners, t(2), 1.0).unwrap();

        assert_eq!(arena.get(id).unwrap().reward, Some(12.0));
    }

    #[test]
    fn test_arena_hands_out_sequential_ids() {
        let mut arena = ListenerArena::new();
        assert!(arena.is_empty());

        let first = listen(&mut arena, t(0));
        let second = listen(&mut arena, t(1));

        assert_eq!(arena.len(), 2);
        assert_eq!((first.index(), second.index()), (0, 1));
        assert!(arena.get(ListenerId(2)).is_none());
    }

    #[test]
    fn test_non_numeric_existing_reward_is_an_error() {
        let mut record = Record::decision("m", t(0));
        record.extra.insert("reward".into(), json!("pending"));
        let mut arena = ListenerArena::new();
        let ok = listen(&mut arena, t(0));
        let bad = arena.insert(t(0), RewardedDecision::from_decision(&record));
        let mut listeners = vec![ok, bad];

        let err = window()
            .update_listeners(&mut arena, &mut listeners, t(1), 1.0)
            .unwrap_err();

        assert!(matches!(err, JoinError::NonNumericReward { ref field, .. } if field == "reward"));
        assert_eq!(arena.get(ok).unwrap().reward, Some(1.0));
    }

    #[test]
    fn test_huge_window_never_expires() {
        let window = ListenerWindow::new(Duration::from_secs(u64::MAX), 0.0);
        assert!(!window.is_expired(t(0), DateTime::<Utc>::MAX_UTC));
    }
}
