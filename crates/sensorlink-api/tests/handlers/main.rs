//! Handler tests. Handlers are called directly with their extractors.

#[path = "../common/mod.rs"]
mod common;

mod basic;
mod commands;
mod exports;
mod responses;
