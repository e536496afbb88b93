//! Realtime communication hub server implementation.

mod handler;
mod runner;
mod signal;
pub mod state; // UseCase 層・テストからアクセスするため public

pub use runner::{app, run};
