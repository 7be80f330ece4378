//! Logic modules: decide what to run and in what order.
//!
//! # Modules
//!
//! - `resolver`: service name resolution from a package manifest
//! - `workflow`: the single-pass install/resolve/dispatch run

pub mod resolver;
pub mod workflow;
