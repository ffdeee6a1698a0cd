//! Umbrella crate for Wayfarer.
//!
//! This crate is intentionally small: it re-exports the engine and protocol crates
//! so downstream code can depend on a single crate name (`wayfarer`).

pub use wayfarer_engine as engine;
pub use wayfarer_protocol as protocol;
