//! HTTP handlers.

pub mod basic;
pub mod commands;
pub mod common;
pub mod exports;
pub mod responses;

pub use crate::server::ServerState;
