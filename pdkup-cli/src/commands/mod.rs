//! CLI command implementations.
//!
//! All user-facing commands operate on the version store and live in the
//! [`versions`] module; its `Commands` enum is the top-level subcommand
//! surface of the binary.

pub mod versions;
