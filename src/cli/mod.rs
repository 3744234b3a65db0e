//! CLI module exports

pub mod args;
pub mod output;

pub use args::{Args, Commands, Verbosity};
