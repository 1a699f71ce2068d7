//! Subscription events for newly registered users.

mod broadcaster;

pub use broadcaster::{BroadcastError, EventBroadcaster, UserFeed};
