// Core library for the fieldjoin two-file join tool

pub mod cancel;
pub mod cli;
pub mod config;
pub mod config_file;
pub mod decompression;
pub mod error_handling;
pub mod formatters;
pub mod index;
pub mod join;
pub mod parsers;
pub mod pipeline;
pub mod platform;
pub mod readers;
pub mod record;
pub mod stats;

pub use cancel::{CancellationToken, Progress};
pub use cli::Cli;
pub use config::{
    JoinConfig, JoinOptions, MissingFieldPolicy, StatsFormat, UnpairedSides, UnpairedStrategy,
};
pub use error_handling::{JoinError, Stage};
pub use pipeline::{run_join, Diagnostics, JoinPipeline, NamedInput};
pub use readers::InputSource;
pub use stats::JoinStats;
