pub mod commands;
pub mod job_commands;

pub use commands::{Cli, Commands};
pub use job_commands::JobCommandHandler;
