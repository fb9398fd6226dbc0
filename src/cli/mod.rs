pub mod commands;

pub use commands::{Cli, Commands, SnippetFormat, run};
