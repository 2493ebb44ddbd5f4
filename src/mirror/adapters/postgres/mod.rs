//! `PostgreSQL` adapters for repository mirror persistence.

mod models;
mod repository;
pub(crate) mod schema;

pub use repository::{MirrorPgPool, PostgresMirrorStore};
