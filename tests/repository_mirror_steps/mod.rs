//! Step definitions for repository mirror scenarios.

mod given;
mod then;
mod when;
pub mod world;
