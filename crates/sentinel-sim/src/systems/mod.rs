//! Host systems that run over the reference scene each tick.
//!
//! Systems are pure functions that take `&mut World` (or `&World` for read-only).
//! They do not own state; all state lives in components.

pub mod lifetime;
pub mod movement;
pub mod patrol;
pub mod snapshot;
