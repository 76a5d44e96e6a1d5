use tracing_subscriber::{EnvFilter, fmt};

/// Log filter for a `-v` count; `RUST_LOG` takes precedence when set.
pub fn filter_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Logs go to stderr so stdout carries only reports.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for_verbosity(verbose)));

    fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}
