//! Timeline annotation: sender headers, timestamp dividers and the
//! load-more affordance derived from adjacent messages.

use serde::Serialize;
use std::collections::HashMap;

use crate::message::{Message, Ordinal};
use crate::timestamp::TimeFormatter;

/// Gap between two messages (in milliseconds) after which a new timestamp
/// divider is shown.
pub const HOW_LONG_BETWEEN_TIMESTAMPS_MS: i64 = 1000 * 60 * 15;

/// Affordance shown above the first loaded message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadMoreState {
    #[default]
    None,
    MoreToLoad,
    NoMoreToLoad,
}

/// Derived view properties for one message row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationResult {
    pub include_header: bool,
    pub timestamp_label: Option<String>,
    pub load_more: LoadMoreState,
}

/// Answers whether an ordinal is the first message ever sent in its
/// conversation.
pub trait OldestOrdinalOracle {
    fn is_oldest_ordinal(&self, ordinal: Ordinal) -> bool;
}

impl<F> OldestOrdinalOracle for F
where
    F: Fn(Ordinal) -> bool,
{
    fn is_oldest_ordinal(&self, ordinal: Ordinal) -> bool {
        self(ordinal)
    }
}

/// Ordinals start at 1; nothing precedes the first one.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstOrdinal;

impl OldestOrdinalOracle for FirstOrdinal {
    fn is_oldest_ordinal(&self, ordinal: Ordinal) -> bool {
        ordinal.0 <= 1
    }
}

/// Whether `message` continues the sender block that `previous` belongs to.
fn continues_block(message: &Message, previous: Option<&Message>) -> bool {
    previous.is_some_and(|prev| prev.author == message.author && prev.msg_type.continues_block())
}

/// Whether enough time passed since `previous` to warrant a new divider.
///
/// The difference is not clamped: under clock skew it goes negative and
/// never exceeds the threshold. An epoch of 0 is a real timestamp.
fn old_enough(message: &Message, previous: Option<&Message>) -> bool {
    match (previous.and_then(|p| p.timestamp), message.timestamp) {
        (Some(prev_ts), Some(ts)) => ts.saturating_sub(prev_ts) > HOW_LONG_BETWEEN_TIMESTAMPS_MS,
        _ => false,
    }
}

/// Annotate `message` given its predecessor in display order.
///
/// `is_oldest_loaded` only matters when `previous` is `None`.
pub fn annotate(
    message: &Message,
    previous: Option<&Message>,
    is_oldest_loaded: bool,
    formatter: &impl TimeFormatter,
) -> AnnotationResult {
    let timestamp_label = if previous.is_none() || old_enough(message, previous) {
        message.timestamp.and_then(|ts| formatter.format(ts))
    } else {
        None
    };

    let include_header =
        previous.is_none() || !continues_block(message, previous) || timestamp_label.is_some();

    let load_more = match (previous, is_oldest_loaded) {
        (Some(_), _) => LoadMoreState::None,
        (None, true) => LoadMoreState::NoMoreToLoad,
        (None, false) => LoadMoreState::MoreToLoad,
    };

    AnnotationResult {
        include_header,
        timestamp_label,
        load_more,
    }
}

/// Like [`annotate`], asking `oracle` whether a first-loaded message is the
/// oldest in the conversation.
pub fn annotate_with_oracle(
    message: &Message,
    previous: Option<&Message>,
    oracle: &impl OldestOrdinalOracle,
    formatter: &impl TimeFormatter,
) -> AnnotationResult {
    let is_oldest_loaded = previous.is_none() && oracle.is_oldest_ordinal(message.ordinal);
    annotate(message, previous, is_oldest_loaded, formatter)
}

/// Annotate a whole loaded window, oldest first.
pub fn annotate_timeline(
    messages: &[Message],
    oracle: &impl OldestOrdinalOracle,
    formatter: &impl TimeFormatter,
) -> Vec<AnnotationResult> {
    messages
        .iter()
        .enumerate()
        .map(|(i, msg)| {
            let previous = i.checked_sub(1).map(|p| &messages[p]);
            annotate_with_oracle(msg, previous, oracle, formatter)
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct AnnotationKey {
    ordinal: Ordinal,
    previous: Option<Ordinal>,
    is_oldest_loaded: bool,
}

/// Memoizing annotator for repeated render passes over the same window.
///
/// Use one annotator per conversation. Ordinals are only unique within a
/// conversation and the memo is keyed on them alone, so
/// [`clear`](Self::clear) before reusing an annotator for another one.
/// Labels are relative to the formatter's notion of "now", so callers
/// should also clear when the day rolls over.
pub struct TimelineAnnotator<F: TimeFormatter> {
    formatter: F,
    memo: HashMap<AnnotationKey, AnnotationResult>,
}

impl<F: TimeFormatter> TimelineAnnotator<F> {
    pub fn new(formatter: F) -> Self {
        Self {
            formatter,
            memo: HashMap::new(),
        }
    }

    pub fn annotate(
        &mut self,
        message: &Message,
        previous: Option<&Message>,
        is_oldest_loaded: bool,
    ) -> AnnotationResult {
        let key = AnnotationKey {
            ordinal: message.ordinal,
            previous: previous.map(|p| p.ordinal),
            is_oldest_loaded,
        };
        if let Some(hit) = self.memo.get(&key) {
            return hit.clone();
        }
        let result = annotate(message, previous, is_oldest_loaded, &self.formatter);
        self.memo.insert(key, result.clone());
        result
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    pub fn clear(&mut self) {
        self.memo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;

    const MIN: i64 = 60 * 1000;

    fn fmt(ms: i64) -> Option<String> {
        Some(format!("t{}", ms))
    }

    #[test]
    fn test_first_message_always_has_header() {
        let msg = Message::new(5, "alice", 1_000);
        let result = annotate(&msg, None, false, &fmt);
        assert!(result.include_header);
        assert_eq!(result.timestamp_label.as_deref(), Some("t1000"));
        assert_eq!(result.load_more, LoadMoreState::MoreToLoad);

        let result = annotate(&msg, None, true, &fmt);
        assert_eq!(result.load_more, LoadMoreState::NoMoreToLoad);
    }

    #[test]
    fn test_continuation_within_window() {
        let prev = Message::new(1, "alice", 0);
        let msg = Message::new(2, "alice", 15 * MIN);
        let result = annotate(&msg, Some(&prev), true, &fmt);
        assert!(!result.include_header);
        assert_eq!(result.timestamp_label, None);
        assert_eq!(result.load_more, LoadMoreState::None);
    }

    #[test]
    fn test_continuation_after_deleted() {
        let prev = Message::new(1, "alice", 0).with_type(MessageType::Deleted);
        let msg = Message::new(2, "alice", MIN);
        assert!(!annotate(&msg, Some(&prev), false, &fmt).include_header);
    }

    #[test]
    fn test_gap_forces_divider_and_header() {
        let prev = Message::new(1, "alice", 0);
        let msg = Message::new(2, "alice", 15 * MIN + 1);
        let result = annotate(&msg, Some(&prev), false, &fmt);
        assert!(result.include_header);
        assert_eq!(result.timestamp_label, Some(format!("t{}", 15 * MIN + 1)));
    }

    #[test]
    fn test_different_author_has_header() {
        let prev = Message::new(1, "alice", 0);
        let msg = Message::new(2, "bob", MIN);
        let result = annotate(&msg, Some(&prev), false, &fmt);
        assert!(result.include_header);
        assert_eq!(result.timestamp_label, None);
    }

    #[test]
    fn test_non_text_previous_breaks_block() {
        for kind in [MessageType::Attachment, MessageType::System, MessageType::Placeholder] {
            let prev = Message::new(1, "alice", 0).with_type(kind);
            let msg = Message::new(2, "alice", MIN);
            assert!(annotate(&msg, Some(&prev), false, &fmt).include_header);
        }
    }

    #[test]
    fn test_clock_skew_never_forces_divider() {
        let prev = Message::new(1, "alice", 60 * MIN);
        let msg = Message::new(2, "alice", 0);
        let result = annotate(&msg, Some(&prev), false, &fmt);
        assert_eq!(result.timestamp_label, None);
        assert!(!result.include_header);
    }

    #[test]
    fn test_missing_timestamps_degrade() {
        let prev = Message::new(1, "alice", 0).without_timestamp();
        let msg = Message::new(2, "alice", 60 * MIN);
        assert_eq!(annotate(&msg, Some(&prev), false, &fmt).timestamp_label, None);

        let first = Message::new(1, "alice", 0).without_timestamp();
        let result = annotate(&first, None, false, &fmt);
        assert!(result.include_header);
        assert_eq!(result.timestamp_label, None);
    }

    #[test]
    fn test_epoch_zero_is_a_timestamp() {
        let prev = Message::new(1, "alice", 0);
        let msg = Message::new(2, "alice", 16 * MIN);
        let result = annotate(&msg, Some(&prev), false, &fmt);
        assert_eq!(result.timestamp_label, Some(format!("t{}", 16 * MIN)));
        assert!(result.include_header);

        let first = Message::new(1, "alice", 0);
        assert_eq!(annotate(&first, None, false, &fmt).timestamp_label.as_deref(), Some("t0"));
    }

    #[test]
    fn test_formatter_failure_yields_no_label() {
        let never = |_: i64| -> Option<String> { None };
        let prev = Message::new(1, "alice", 0);
        let msg = Message::new(2, "alice", 60 * MIN);
        let result = annotate(&msg, Some(&prev), false, &never);
        assert_eq!(result.timestamp_label, None);
        assert!(!result.include_header);
    }

    #[test]
    fn test_annotate_timeline_with_oracle() {
        let messages = vec![
            Message::new(1, "alice", 0),
            Message::new(2, "alice", MIN),
            Message::new(3, "bob", 2 * MIN),
            Message::new(4, "bob", 40 * MIN),
        ];
        let results = annotate_timeline(&messages, &FirstOrdinal, &fmt);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].load_more, LoadMoreState::NoMoreToLoad);
        assert!(results[0].include_header);
        assert!(!results[1].include_header);
        assert!(results[2].include_header);
        assert!(results[3].include_header);
        assert!(results[3].timestamp_label.is_some());

        let results = annotate_timeline(&messages[1..], &FirstOrdinal, &fmt);
        assert_eq!(results[0].load_more, LoadMoreState::MoreToLoad);
    }

    #[test]
    fn test_closure_oracle() {
        let msg = Message::new(10, "alice", 0);
        let oracle = |o: Ordinal| o == Ordinal(10);
        let result = annotate_with_oracle(&msg, None, &oracle, &fmt);
        assert_eq!(result.load_more, LoadMoreState::NoMoreToLoad);
    }

    #[test]
    fn test_memoized_annotator() {
        let mut annotator = TimelineAnnotator::new(fmt);
        let prev = Message::new(1, "alice", 0);
        let msg = Message::new(2, "alice", MIN);

        let first = annotator.annotate(&msg, Some(&prev), false);
        let second = annotator.annotate(&msg, Some(&prev), false);
        assert_eq!(first, second);
        assert_eq!(annotator.len(), 1);

        annotator.annotate(&msg, None, false);
        assert_eq!(annotator.len(), 2);

        annotator.clear();
        assert!(annotator.is_empty());
    }

    #[test]
    fn test_annotator_reused_across_conversations() {
        let mut annotator = TimelineAnnotator::new(fmt);

        // Same ordinals, different authors and gaps
        let general = [Message::new(1, "alice", 0), Message::new(2, "alice", MIN)];
        let random = [Message::new(1, "bob", 0), Message::new(2, "carol", 60 * MIN)];

        let in_general = annotator.annotate(&general[1], Some(&general[0]), false);
        assert!(!in_general.include_header);

        annotator.clear();
        let in_random = annotator.annotate(&random[1], Some(&random[0]), false);
        assert_eq!(in_random, annotate(&random[1], Some(&random[0]), false, &fmt));
        assert!(in_random.include_header);
        assert!(in_random.timestamp_label.is_some());
    }
}
