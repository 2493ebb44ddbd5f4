//! `PostgreSQL` session persistence on the shared mirror store.

mod models;
mod repository;
