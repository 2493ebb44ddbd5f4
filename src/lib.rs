//! Repo Mirror: local mirror of repositories hosted on a code-hosting service.
//!
//! This crate keeps a relational mirror of remote repository and branch
//! metadata, reconciles it against the remote REST API, and tracks
//! per-repository work sessions.
//!
//! # Architecture
//!
//! Repo Mirror follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//!
//! # Modules
//!
//! - [`config`]: Explicit configuration for the remote client and workspace
//! - [`logging`]: Subscriber installation for structured logs
//! - [`mirror`]: Repository and branch reconciliation, search, and deletion
//! - [`session`]: Per-repository work session tracking

pub mod config;
pub mod logging;
pub mod mirror;
pub mod session;
