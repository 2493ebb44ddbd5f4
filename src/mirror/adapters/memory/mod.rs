//! In-memory adapters for the repository mirror.

mod remote;
mod store;

pub use remote::InMemoryRemoteHost;
pub use store::InMemoryMirrorStore;
