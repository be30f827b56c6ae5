//! CLI module - argument parsing

mod args;

pub use args::{predictions_path, Cli, Commands, PredictSettings};
