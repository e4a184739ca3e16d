//! Diagnostic logging for the CLI.
//!
//! Logging is off unless `--verbose` or `RUST_LOG` asks for it, and always goes
//! to stderr so stdout stays clean for exported documents.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_DIRECTIVES: &str = "querygraph_core=debug,querygraph_cli=debug";

/// Install the stderr subscriber when diagnostics were requested.
pub fn init(verbose: bool) {
    let from_env = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    if !verbose && !from_env {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(VERBOSE_DIRECTIVES));

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_directives_parse() {
        let filter = EnvFilter::try_new(VERBOSE_DIRECTIVES);
        assert!(filter.is_ok());
    }
}
