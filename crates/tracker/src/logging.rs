use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,solana_rpc_client=warn,reqwest=warn,hyper=warn";

/// Install the global subscriber; `RUST_LOG` overrides the default filter.
pub fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json(),
            )
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_target(false)).init();
    }

    tracing::debug!("Logging initialized (json={})", json);
}
