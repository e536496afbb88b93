//! Connection Registry port.
//!
//! Single source of truth for "who is reachable right now". The registry
//! binds a role-qualified identity to a live connection ref; presence,
//! chat relay and notification fanout all resolve recipients through it.

use async_trait::async_trait;

use super::value_object::{ConnectionId, Role, Timestamp, UserId};

/// Result of a `register` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    /// True when the identity had no live entry under any role before this
    /// call; drives the online presence transition.
    pub came_online: bool,
    /// Connection ref that lost its `(identity, role)` binding, if the call
    /// overwrote an existing entry. The transport itself is not closed, it
    /// just becomes unreachable through the registry.
    pub replaced: Option<ConnectionId>,
}

/// Result of a `remove` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// True when an entry was actually removed (false on no-op removals)
    pub removed: bool,
    /// True when the identity has no remaining live entry under any role;
    /// drives the offline presence transition.
    pub went_offline: bool,
}

/// Registry of live, registered connections.
///
/// Contract: at most one live entry per `(identity, role)`; re-registration
/// overwrites (last write wins, expected on reconnect, never an error). A
/// fresh transport never inherits an identity — callers must re-register on
/// every new transport instance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Bind `(identity, role)` to `connection`, overwriting any existing
    /// binding for the same key.
    async fn register(
        &self,
        identity: UserId,
        role: Role,
        connection: ConnectionId,
        registered_at: Timestamp,
    ) -> RegistrationOutcome;

    /// Resolve the live connection for `(identity, role)`, if any.
    async fn lookup(&self, identity: &UserId, role: Role) -> Option<ConnectionId>;

    /// Resolve every live connection of an identity across roles. Chat
    /// relay addresses an identity, not a role.
    async fn connections_of(&self, identity: &UserId) -> Vec<ConnectionId>;

    /// Remove the binding for `(identity, role)`, but only while it still
    /// points at `connection`: a stale transport closing after a reconnect
    /// must not evict the fresh registration. Idempotent.
    async fn remove(
        &self,
        identity: &UserId,
        role: Role,
        connection: &ConnectionId,
    ) -> RemovalOutcome;
}
