//! Common utilities for the Wombat layout engine.
//!
//! This crate provides shared infrastructure used by the layout crates:
//! - **Warning System** - colored terminal output for engine-limitation
//!   diagnostics

pub mod warning;

pub use warning::{clear_warnings, warn_once};
