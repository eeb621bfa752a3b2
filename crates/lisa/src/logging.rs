use tracing_subscriber::EnvFilter;

/// Result messages from `LogNotifier` stay visible at the default level.
pub const DEFAULT_FILTER: &str = "warn,lisa::notifier=info";

/// Installs the stderr subscriber. `RUST_LOG` wins unless `verbose` is set.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_keeps_result_messages() {
        let filter = EnvFilter::new(DEFAULT_FILTER).to_string().to_lowercase();
        assert!(filter.contains("lisa::notifier=info"), "{filter}");
        assert!(filter.contains("warn"), "{filter}");
    }
}
