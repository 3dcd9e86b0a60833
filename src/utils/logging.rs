use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the stderr log subscriber.
///
/// Default level is `warn`, `--debug` raises it to `debug`. `RUST_LOG`
/// directives are applied on top. Safe to call more than once.
pub(crate) fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .try_init();
}
