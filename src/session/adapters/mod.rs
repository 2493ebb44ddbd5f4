//! Adapter implementations for the session store port.
//!
//! Sessions live beside repositories and branches, so both adapters extend
//! the mirror stores rather than defining their own.

mod memory;
mod postgres;
