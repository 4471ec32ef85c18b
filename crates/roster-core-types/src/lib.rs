//! Core types shared across Roster facilities
//!
//! This crate holds the canonical schema constants used by both the
//! error and logging facilities, so every crate emits the same field keys.

pub mod schema;
