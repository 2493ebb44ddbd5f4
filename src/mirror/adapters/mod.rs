//! Adapter implementations for the repository mirror ports.

pub mod github;
pub mod memory;
pub mod postgres;
pub mod workspace;
