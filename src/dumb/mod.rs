//! Detection-free scenario engine
//!
//! Replays a flat action list under two composed repeat scopes: each
//! action's own policy inside the whole-scenario envelope.

mod engine;

pub use engine::DumbEngine;
