//! Change notifications for book and word mutations.
//!
//! The store itself is passive; route handlers publish a [`ChangeEvent`]
//! after every successful mutation and the realtime SSE route fans them out
//! to subscribed clients. Clients re-render from these pushes rather than
//! from mutation responses, so a second device converges on the same view.
//! Active quiz sessions never consume them: the pool is a snapshot taken at
//! quiz start.

use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub user_id: String,
    pub kind: ChangeKind,
    pub book_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    BookCreated,
    BookRenamed,
    BookDeleted,
    WordAdded,
    WordRemoved,
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Lossy by design: with no subscribers the event is dropped, and slow
    /// subscribers observe `RecvError::Lagged` and resync with a full fetch.
    pub fn publish(&self, event: ChangeEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!(error = %e, "No realtime subscribers, event dropped");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: ChangeKind) -> ChangeEvent {
        ChangeEvent {
            user_id: "u1".to_string(),
            kind,
            book_id: "b1".to_string(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(sample(ChangeKind::WordAdded));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::WordAdded);
        assert_eq!(event.book_id, "b1");
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new(8);
        bus.publish(sample(ChangeKind::BookDeleted));
    }

    #[test]
    fn kind_serializes_camel_case() {
        let json = serde_json::to_string(&ChangeKind::BookRenamed).unwrap();
        assert_eq!(json, "\"bookRenamed\"");
    }
}
