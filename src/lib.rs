// Library interface for flush
// This allows benchmarks and tests to access internal modules

pub mod lexer;
pub mod parser;
pub mod executor;
pub mod runtime;
pub mod builtins;
pub mod jobs;
pub mod error;
pub mod signal;
pub mod config;
pub mod banner;
pub mod logging;
pub mod input;
pub mod prompt;
pub mod repl;
