//! Badge-state ingestion: stale-version rejection and throttled dispatch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::error::Result;
use crate::protocol::{Action, Dispatch};
use crate::throttle::Throttle;

/// Window used to coalesce non-zero badge updates
pub const DEFAULT_BADGE_THROTTLE: Duration = Duration::from_millis(1000);

/// `badgeCounts` key for mobile devices
pub const MOBILE_DEVICE_TYPE: &str = "1";

/// Unread counters for one conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationBadge {
    #[serde(default)]
    pub unread_messages: i64,
    #[serde(default)]
    pub badge_counts: Option<HashMap<String, i64>>,
}

/// Aggregate badge counters pushed by the notification channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeState {
    pub inbox_vers: i64,
    #[serde(default)]
    pub conversations: Option<Vec<ConversationBadge>>,
}

impl BadgeState {
    fn conversations(&self) -> &[ConversationBadge] {
        self.conversations.as_deref().unwrap_or_default()
    }

    /// Unread messages across all conversations. Saturates rather than
    /// wrapping, so a huge count never reads as zero.
    pub fn total_unread(&self) -> i64 {
        self.conversations()
            .iter()
            .fold(0i64, |total, c| total.saturating_add(c.unread_messages))
    }

    /// Badge count to show on a mobile app icon.
    pub fn mobile_badge_count(&self) -> i64 {
        self.conversations()
            .iter()
            .filter_map(|c| c.badge_counts.as_ref())
            .map(|counts| counts.get(MOBILE_DEVICE_TYPE).copied().unwrap_or(0))
            .fold(0i64, i64::saturating_add)
    }
}

/// What the ingester did with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Older than a version already seen; dropped.
    Stale { received: i64, last_seen: i64 },
    /// Queued on the throttle.
    Deferred,
    /// Unread count hit zero; pending update cancelled and this one sent.
    Flushed,
}

type MobileCountCallback = Box<dyn Fn(i64) + Send + Sync>;

/// Long-lived per-session ingester. Each instance tracks its own
/// "last seen" version, so independent sessions never interfere.
///
/// Dispatch happens under the throttle's lock; a `Dispatch` impl must not
/// call back into `ingest`.
pub struct BadgeIngester {
    last_version: i64,
    throttle: Throttle<Action>,
    on_mobile_count: Option<MobileCountCallback>,
}

impl BadgeIngester {
    /// Create an ingester on the current tokio runtime.
    pub fn new<D>(dispatch: D, window: Duration) -> Result<Self>
    where
        D: Dispatch + Send + Sync + 'static,
    {
        let runtime = Handle::try_current()?;
        Ok(Self::with_runtime(dispatch, window, runtime))
    }

    pub fn with_runtime<D>(dispatch: D, window: Duration, runtime: Handle) -> Self
    where
        D: Dispatch + Send + Sync + 'static,
    {
        Self {
            last_version: -1,
            throttle: Throttle::new(window, runtime, move |action| dispatch.dispatch(action)),
            on_mobile_count: None,
        }
    }

    /// Install a callback that receives the mobile badge count for every
    /// accepted update.
    pub fn on_mobile_count(mut self, callback: impl Fn(i64) + Send + Sync + 'static) -> Self {
        self.on_mobile_count = Some(Box::new(callback));
        self
    }

    pub fn last_version(&self) -> i64 {
        self.last_version
    }

    pub fn ingest(&mut self, badge_state: BadgeState) -> IngestOutcome {
        if badge_state.inbox_vers < self.last_version {
            info!(
                "Ignoring older badgeState, got {} but have seen {}",
                badge_state.inbox_vers, self.last_version
            );
            return IngestOutcome::Stale {
                received: badge_state.inbox_vers,
                last_seen: self.last_version,
            };
        }

        self.last_version = badge_state.inbox_vers;
        let total_chats = badge_state.total_unread();
        let mobile_count = badge_state.mobile_badge_count();
        let action = Action::ReceivedBadgeState { badge_state };

        let outcome = if total_chats > 0 {
            // Defer so quick receive-then-read bursts don't flash the badge
            self.throttle.submit(action);
            IngestOutcome::Deferred
        } else {
            self.throttle.cancel_and_send(action);
            IngestOutcome::Flushed
        };
        debug!(total_chats, ?outcome, "badge state accepted");

        if let Some(callback) = &self.on_mobile_count {
            callback(mobile_count);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Receiver};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    fn state(vers: i64, unread: &[i64]) -> BadgeState {
        BadgeState {
            inbox_vers: vers,
            conversations: Some(
                unread
                    .iter()
                    .map(|&n| ConversationBadge {
                        unread_messages: n,
                        badge_counts: None,
                    })
                    .collect(),
            ),
        }
    }

    fn received_version(rx: &Receiver<Action>) -> Option<i64> {
        match rx.try_recv().ok()? {
            Action::ReceivedBadgeState { badge_state } => Some(badge_state.inbox_vers),
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_totals() {
        let mut s = state(1, &[2, 3]);
        assert_eq!(s.total_unread(), 5);
        assert_eq!(s.mobile_badge_count(), 0);

        let mut counts = HashMap::new();
        counts.insert(MOBILE_DEVICE_TYPE.to_string(), 4);
        counts.insert("0".to_string(), 9);
        if let Some(convs) = s.conversations.as_mut() {
            convs[0].badge_counts = Some(counts);
            convs[1].badge_counts = Some(HashMap::new());
        }
        assert_eq!(s.mobile_badge_count(), 4);

        assert_eq!(BadgeState::default().total_unread(), 0);
    }

    #[test]
    fn test_totals_saturate() {
        let mut s = state(1, &[i64::MAX, 1]);
        assert_eq!(s.total_unread(), i64::MAX);

        if let Some(convs) = s.conversations.as_mut() {
            for c in convs.iter_mut() {
                let mut counts = HashMap::new();
                counts.insert(MOBILE_DEVICE_TYPE.to_string(), i64::MAX);
                c.badge_counts = Some(counts);
            }
        }
        assert_eq!(s.mobile_badge_count(), i64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_unread_stays_throttled() {
        let (tx, rx) = unbounded::<Action>();
        let mut ingester = BadgeIngester::new(tx, DEFAULT_BADGE_THROTTLE).unwrap();

        ingester.ingest(state(1, &[2]));
        assert_eq!(ingester.ingest(state(2, &[i64::MAX, 1])), IngestOutcome::Deferred);
        assert_eq!(received_version(&rx), None);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(received_version(&rx), Some(2));
    }

    #[test]
    fn test_deserialize_payload() {
        let json = r#"{
            "inboxVers": 12,
            "conversations": [
                {"unreadMessages": 2, "badgeCounts": {"0": 1, "1": 3}},
                {"unreadMessages": 1}
            ]
        }"#;
        let s: BadgeState = serde_json::from_str(json).unwrap();
        assert_eq!(s.inbox_vers, 12);
        assert_eq!(s.total_unread(), 3);
        assert_eq!(s.mobile_badge_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_versions_rejected() {
        let (tx, rx) = unbounded::<Action>();
        let mut ingester = BadgeIngester::new(tx, DEFAULT_BADGE_THROTTLE).unwrap();

        assert_eq!(ingester.ingest(state(5, &[1])), IngestOutcome::Deferred);
        assert_eq!(
            ingester.ingest(state(3, &[1])),
            IngestOutcome::Stale {
                received: 3,
                last_seen: 5
            }
        );
        assert_eq!(ingester.ingest(state(7, &[1])), IngestOutcome::Deferred);
        assert_eq!(ingester.last_version(), 7);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(received_version(&rx), Some(7));
        assert_eq!(received_version(&rx), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_equal_version_accepted() {
        let (tx, _rx) = unbounded::<Action>();
        let mut ingester = BadgeIngester::new(tx, DEFAULT_BADGE_THROTTLE).unwrap();
        ingester.ingest(state(4, &[1]));
        assert_eq!(ingester.ingest(state(4, &[2])), IngestOutcome::Deferred);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_flushes_immediately() {
        let (tx, rx) = unbounded::<Action>();
        let mut ingester = BadgeIngester::new(tx, DEFAULT_BADGE_THROTTLE).unwrap();

        ingester.ingest(state(1, &[3]));
        assert_eq!(ingester.ingest(state(2, &[0, 0])), IngestOutcome::Flushed);
        assert_eq!(received_version(&rx), Some(2));

        // The cancelled update never arrives
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(received_version(&rx), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_conversations_counts_as_zero() {
        let (tx, rx) = unbounded::<Action>();
        let mut ingester = BadgeIngester::new(tx, DEFAULT_BADGE_THROTTLE).unwrap();
        let outcome = ingester.ingest(BadgeState {
            inbox_vers: 1,
            conversations: None,
        });
        assert_eq!(outcome, IngestOutcome::Flushed);
        assert_eq!(received_version(&rx), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_are_independent() {
        let (tx, _rx) = unbounded::<Action>();
        let mut first = BadgeIngester::new(tx.clone(), DEFAULT_BADGE_THROTTLE).unwrap();
        let mut second = BadgeIngester::new(tx, DEFAULT_BADGE_THROTTLE).unwrap();
        first.ingest(state(10, &[0]));
        assert_eq!(second.ingest(state(2, &[0])), IngestOutcome::Flushed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mobile_count_callback() {
        let (tx, _rx) = unbounded::<Action>();
        let seen = Arc::new(AtomicI64::new(-1));
        let seen_cb = Arc::clone(&seen);
        let mut ingester = BadgeIngester::new(tx, DEFAULT_BADGE_THROTTLE)
            .unwrap()
            .on_mobile_count(move |n| seen_cb.store(n, Ordering::SeqCst));

        let mut s = state(1, &[1]);
        let mut counts = HashMap::new();
        counts.insert(MOBILE_DEVICE_TYPE.to_string(), 6);
        if let Some(convs) = s.conversations.as_mut() {
            convs[0].badge_counts = Some(counts);
        }
        ingester.ingest(s);
        assert_eq!(seen.load(Ordering::SeqCst), 6);

        // Stale updates do not reach the callback
        ingester.ingest(state(0, &[1]));
        assert_eq!(seen.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_new_without_runtime_fails() {
        let (tx, _rx) = unbounded::<Action>();
        assert!(BadgeIngester::new(tx, DEFAULT_BADGE_THROTTLE).is_err());
    }
}
