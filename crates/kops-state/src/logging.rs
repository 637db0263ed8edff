//! Console logging for the `kops-state` binary.
use snafu::{ResultExt, Snafu};
use tracing::{Level, level_filters::LevelFilter};
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Log directives in this variable take precedence over the configured log level.
pub const LOG_ENV: &str = "KOPS_STATE_LOG";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to initialize the global tracing subscriber"))]
    Init { source: TryInitError },
}

/// Uses the directives in the environment variable `env` if it is set and valid, logs everything
/// up to `level` otherwise.
fn env_filter(env: &str, level: Level) -> EnvFilter {
    match EnvFilter::try_from_env(env) {
        Ok(env_filter) => env_filter,
        _ => EnvFilter::default().add_directive(LevelFilter::from_level(level).into()),
    }
}

/// Initializes `tracing` logging to stderr, so that stdout only carries the command's output.
///
/// Fails if a global subscriber was already installed.
pub fn initialize_logging(env: &str, level: Level) -> Result<(), Error> {
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    Registry::default()
        .with(env_filter(env, level))
        .with(fmt)
        .try_init()
        .context(InitSnafu)?;

    tracing::debug!(env, %level, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Level::INFO, LevelFilter::INFO)]
    #[case(Level::TRACE, LevelFilter::TRACE)]
    fn falls_back_to_level(#[case] level: Level, #[case] expected: LevelFilter) {
        let filter = env_filter("KOPS_STATE_TEST_UNSET_LOG", level);
        assert_eq!(filter.max_level_hint(), Some(expected));
    }
}
