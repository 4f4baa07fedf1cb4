use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,ember=debug";

/// Install the global subscriber. Output goes to stderr so stdout stays free
/// for the MCP protocol; `RUST_LOG` overrides the default filter.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
