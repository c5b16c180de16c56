use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// `RUST_LOG` wins when set; otherwise `--verbose` turns on debug output for
/// this crate and everything else stays off.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let fallback = || EnvFilter::new(if verbose { "portwatch=debug" } else { "off" });
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).unwrap_or_else(|_| fallback())
        }
        _ => fallback(),
    }
}

pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(log_filter(verbose, rust_log.as_deref()))
        .init();
}
