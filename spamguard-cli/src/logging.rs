use anyhow::Context;
use spamguard::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Logs go to stderr so reports on stdout stay clean.
pub fn init(config: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
    let filter = filter(&config.level, verbose)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
    }

    Ok(())
}

/// `-v` forces debug, then `RUST_LOG`, then the configured level
fn filter(level: &str, verbose: bool) -> anyhow::Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::new(directives("debug")));
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(directives(level)).with_context(|| format!("invalid log level '{}'", level))
}

fn directives(level: &str) -> String {
    format!("warn,spamguard={}", level)
}
