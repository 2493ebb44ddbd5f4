//! Per-repository work sessions.
//!
//! A session records a work interval on one repository with notes and the
//! editor state captured along the way. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Store implementations in `adapters`
//! - Orchestration services in [`services`]

mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
