//! Tracing subscriber setup.

use crate::infra::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. When `RUST_LOG` is unset the level follows the environment.
pub fn init(environment: Environment) -> anyhow::Result<()> {
    let default_directive = if environment.is_production() {
        "pn_registry=info"
    } else {
        "pn_registry=debug"
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;

    let registry = tracing_subscriber::registry().with(filter);
    if environment.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_ansi(false))
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).try_init()?;
    }
    Ok(())
}
