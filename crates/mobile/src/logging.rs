use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "yessplora_core=info,yessplora_mobile=info";

/// Install the tracing subscriber. Safe to call more than once; only the
/// first call has an effect.
#[uniffi::export]
pub fn init_logging() {
    static LOGGING_SETUP: Once = Once::new();

    LOGGING_SETUP.call_once(|| {
        if let Err(error) = install() {
            eprintln!("failed to initialize logging: {error}");
        }
    });
}

fn filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(target_os = "android")]
fn install() -> eyre::Result<()> {
    use tracing_logcat::{LogcatMakeWriter, LogcatTag};
    use tracing_subscriber::fmt::format::Format;

    let tag = LogcatTag::Fixed("Yessplora-Rust".to_owned());
    let writer = LogcatMakeWriter::new(tag)?;
    let layer = tracing_subscriber::fmt::layer()
        .event_format(Format::default().with_level(false).without_time())
        .with_writer(writer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(layer)
        .with(filter())
        .try_init()?;
    Ok(())
}

#[cfg(not(target_os = "android"))]
fn install() -> eyre::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter())
        .try_init()?;
    Ok(())
}
