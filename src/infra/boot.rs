use crate::dispatch::archive::ArchiveLimits;
use crate::dispatch::Dispatcher;
use crate::infra::config::Config;
use crate::tools::registry::build_registry;

/// Dispatcher with every built-in tool and the reference parser.
pub fn build_dispatcher(cfg: &Config) -> Dispatcher {
    tracing::debug!(
        max_entry_bytes = cfg.max_entry_bytes,
        pretty_json = cfg.pretty_json,
        "BOOT gbx-io dispatcher"
    );
    Dispatcher::new(build_registry(cfg)).with_limits(ArchiveLimits {
        max_entry_bytes: cfg.max_entry_bytes,
    })
}
