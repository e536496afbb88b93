//! Presence Tracker port.
//!
//! Records which observers are watching which targets. Subscriptions are
//! ephemeral: created when an observer opens a chat or room with a target,
//! destroyed on unsubscribe or on the observer's own disconnect. Never
//! persisted.

use async_trait::async_trait;

use super::value_object::UserId;

/// Ephemeral observer-interest map consulted on every presence transition.
///
/// Only current subscribers are notified of a transition — there is no
/// global broadcast.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceSubscriptions: Send + Sync {
    /// Record that `observer` wants status changes for `target`.
    /// Subscribing twice is a no-op.
    async fn subscribe(&self, observer: UserId, target: UserId);

    /// Remove one subscription; removing an absent one is a no-op.
    async fn unsubscribe(&self, observer: &UserId, target: &UserId);

    /// Every observer currently subscribed to `target`.
    async fn observers_of(&self, target: &UserId) -> Vec<UserId>;

    /// Drop every subscription held by `observer` (observer disconnect).
    async fn drop_observer(&self, observer: &UserId);
}
