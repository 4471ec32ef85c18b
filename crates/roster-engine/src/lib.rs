//! Roster Engine - orchestration between the store and a presentation layer
//!
//! Provides the view synchronizer, which forwards every live snapshot from
//! a `PersonStore` to a rendering callback.

pub mod view_sync;

pub use view_sync::ViewSync;
