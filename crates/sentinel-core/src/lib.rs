//! Core types and definitions for the SENTINEL turret simulation.
//!
//! This crate defines the vocabulary shared across the workspace:
//! identity and transform types, geometry helpers, turret configuration,
//! scene components, events, snapshots, and constants.
//! It has no dependency on the ECS or any host runtime.

pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod math;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
