//! New-user event fan-out.
//!
//! One bounded `broadcast` channel backs every feed. Each feed keeps its own
//! cursor, so a slow feed only loses its own oldest events and the publisher
//! never waits.

use std::sync::{Arc, RwLock};

use futures::stream::{self, Stream};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use common::FeedConfig;
use domain::{UserRecord, TOPIC_NEW_USER};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    #[error("broadcaster has been shut down")]
    Closed,
}

/// Publishes registered users to every open subscription feed.
///
/// Cloning is cheap and every clone shares the same feeds. Construct once
/// at start-up and call [`EventBroadcaster::shutdown`] when draining.
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: Arc<RwLock<Option<broadcast::Sender<UserRecord>>>>,
    buffer_size: usize,
}

impl EventBroadcaster {
    /// Create a broadcaster whose feeds buffer `config.buffer_size` events.
    ///
    /// A zero buffer size is raised to one.
    pub fn new(config: FeedConfig) -> Self {
        let buffer_size = config.buffer_size.max(1);
        let (sender, _) = broadcast::channel(buffer_size);
        Self {
            sender: Arc::new(RwLock::new(Some(sender))),
            buffer_size,
        }
    }

    /// Events each feed may fall behind before losing the oldest
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn current_sender(&self) -> Option<broadcast::Sender<UserRecord>> {
        match self.sender.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Fan `user` out to every open feed.
    ///
    /// Returns the number of feeds reached; zero feeds is not an error.
    pub fn publish(&self, user: UserRecord) -> Result<usize, BroadcastError> {
        let sender = self.current_sender().ok_or(BroadcastError::Closed)?;

        // send only fails when there are no receivers
        let delivered = sender.send(user).unwrap_or(0);
        debug!(topic = TOPIC_NEW_USER, feeds = delivered, "Event published");
        Ok(delivered)
    }

    /// Open a new feed that sees every event published from now on.
    ///
    /// After shutdown the returned feed is already finished.
    pub fn subscribe(&self) -> UserFeed {
        let receiver = match self.current_sender() {
            Some(sender) => sender.subscribe(),
            None => {
                // Sender dropped immediately, so the receiver reports Closed
                let (sender, receiver) = broadcast::channel(1);
                drop(sender);
                receiver
            }
        };

        debug!(topic = TOPIC_NEW_USER, "Feed opened");
        UserFeed { receiver }
    }

    /// Number of open feeds
    pub fn subscriber_count(&self) -> usize {
        self.current_sender()
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Check whether the broadcaster has been shut down
    pub fn is_closed(&self) -> bool {
        self.current_sender().is_none()
    }

    /// Stop accepting events.
    ///
    /// Open feeds still yield what was already buffered, then end.
    pub fn shutdown(&self) {
        let taken = match self.sender.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(sender) = taken {
            info!(open_feeds = sender.receiver_count(), "Event broadcaster shut down");
        }
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}

/// One subscriber's view of the new-user events.
///
/// Dropping the feed (or calling [`UserFeed::close`]) releases it.
pub struct UserFeed {
    receiver: broadcast::Receiver<UserRecord>,
}

impl UserFeed {
    /// Wait for the next event.
    ///
    /// Returns `None` once the broadcaster has shut down and the buffer is
    /// drained. Events lost to lag are skipped.
    pub async fn recv(&mut self) -> Option<UserRecord> {
        loop {
            match self.receiver.recv().await {
                Ok(user) => return Some(user),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Feed fell behind, oldest events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<UserRecord> {
        use tokio::sync::broadcast::error::TryRecvError;

        loop {
            match self.receiver.try_recv() {
                Ok(user) => return Some(user),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Feed fell behind, oldest events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Convert into a lazy stream of events.
    pub fn into_stream(self) -> impl Stream<Item = UserRecord> + Send + 'static {
        stream::unfold(self, |mut feed| async move {
            feed.recv().await.map(|user| (user, feed))
        })
    }

    /// Close the feed; no further events are delivered to it.
    pub fn close(self) {
        debug!(topic = TOPIC_NEW_USER, "Feed closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use futures::StreamExt;

    fn user(name: &str) -> UserRecord {
        UserRecord::new(
            format!("id-{}", name),
            name.to_string(),
            format!("{}@example.com", name),
            "hash".to_string(),
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let events = EventBroadcaster::default();
        assert_eq!(events.publish(user("alice")).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fan_out_to_every_feed() {
        let events = EventBroadcaster::default();
        let mut first = events.subscribe();
        let mut second = events.subscribe();
        assert_eq!(events.subscriber_count(), 2);

        assert_eq!(events.publish(user("alice")).unwrap(), 2);

        assert_eq!(first.recv().await.unwrap().username, "alice");
        assert_eq!(second.recv().await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_closed_feed_is_released() {
        let events = EventBroadcaster::default();
        let feed = events.subscribe();
        let mut other = events.subscribe();

        feed.close();
        assert_eq!(events.subscriber_count(), 1);
        assert_eq!(events.publish(user("alice")).unwrap(), 1);
        assert!(other.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_lagging_feed_drops_oldest() {
        let events = EventBroadcaster::new(FeedConfig { buffer_size: 2 });
        let mut feed = events.subscribe();

        for name in ["a", "b", "c", "d"] {
            events.publish(user(name)).unwrap();
        }

        assert_eq!(feed.recv().await.unwrap().username, "c");
        assert_eq!(feed.recv().await.unwrap().username, "d");
        assert!(feed.try_recv().is_none());

        events.publish(user("e")).unwrap();
        assert_eq!(feed.recv().await.unwrap().username, "e");
    }

    #[tokio::test]
    async fn test_shutdown_drains_then_ends() {
        let events = EventBroadcaster::default();
        let mut feed = events.subscribe();
        events.publish(user("alice")).unwrap();

        events.shutdown();

        assert!(events.is_closed());
        assert_eq!(events.publish(user("bob")), Err(BroadcastError::Closed));
        assert_eq!(feed.recv().await.unwrap().username, "alice");
        assert!(feed.recv().await.is_none());
        assert!(events.subscribe().recv().await.is_none());
    }

    #[tokio::test]
    async fn test_feed_as_stream() {
        let events = EventBroadcaster::default();
        let stream = events.subscribe().into_stream();

        events.publish(user("alice")).unwrap();
        events.publish(user("bob")).unwrap();
        events.shutdown();

        let names: Vec<_> = stream.map(|u| u.username).collect().await;
        assert_eq!(names, vec!["alice", "bob"]);
    }
}
