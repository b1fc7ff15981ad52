//! Log setup and the stage tags every job message is prefixed with

use env_logger::{Builder, Env, Target};

/// Prefix for progress messages
pub const TAG: &str = "[Speedtest]";

/// Prefix for the per-sample progress line
pub const TESTING_TAG: &str = "[Speedtest][testing]";

/// Initializes `env_logger` writing to stdout.
///
/// The level defaults to `info` and can be changed through `RUST_LOG`.
/// Calling this more than once is harmless.
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .format_timestamp_secs()
        .try_init();
}
