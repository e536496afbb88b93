//! Domain layer for the communication hub.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod collaborator;
pub mod entity;
pub mod error;
pub mod presence;
pub mod registry;
pub mod room_directory;
pub mod value_object;

pub use collaborator::{ChatStore, CollaboratorError};
pub use entity::{CallRoom, ChatMessageRecord, NotificationRecord, RoomMember, RoomStatus};
pub use error::{RoomError, ValueObjectError};
pub use presence::PresenceSubscriptions;
pub use registry::{ConnectionRegistry, RegistrationOutcome, RemovalOutcome};
pub use room_directory::{JoinOutcome, LeaveOutcome, RoomDirectory};
pub use value_object::{
    ConnectionId, DisplayName, MessageBody, Role, SessionId, SignalPayload, Timestamp, UserId,
};
