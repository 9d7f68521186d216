use tracing_subscriber::filter::{Builder, LevelFilter};
use tracing_subscriber::EnvFilter;

fn filter_builder() -> Builder {
    EnvFilter::builder().with_default_directive(LevelFilter::INFO.into())
}

/// Installs the global `tracing` subscriber. Directives in `RUST_LOG` are
/// used as given; INFO applies only when it sets none.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(filter_builder().from_env_lossy())
        .init();
}
