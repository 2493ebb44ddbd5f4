//! GitHub REST API adapter.

mod client;
mod models;
mod pagination;

pub use client::GitHubClient;
pub use pagination::{RATE_LIMIT_REMAINING, RATE_LIMIT_RESET, check_rate_limit, next_link};
