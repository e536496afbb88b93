//! Infrastructure layer: in-memory state implementations, collaborator
//! clients and wire DTOs.

pub mod collaborator;
pub mod dto;
pub mod presence;
pub mod registry;
pub mod rooms;
