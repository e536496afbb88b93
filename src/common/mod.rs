//! Cross-cutting helpers shared by all layers.

pub mod logger;
pub mod time;
