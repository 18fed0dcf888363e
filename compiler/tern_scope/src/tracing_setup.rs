//! Tracing subscriber installation for hosts embedding the scope chain.

use std::sync::Once;

/// Environment variable holding the `EnvFilter` directives.
pub const LOG_VAR: &str = "TERN_LOG";

/// Environment variable switching to indented, span-tree output.
pub const LOG_TREE_VAR: &str = "TERN_LOG_TREE";

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times. Does nothing
/// unless `TERN_LOG` is set, e.g. `TERN_LOG=tern_scope=debug` to see
/// implicit global creation and undefined lookups, or
/// `TERN_LOG=tern_scope=trace` for every scope and definition.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_env(LOG_VAR) else {
            return;
        };

        let (tree, flat) = if std::env::var_os(LOG_TREE_VAR).is_some() {
            let tree = tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_indent_lines(true);
            (Some(tree), None)
        } else {
            (None, Some(fmt::layer().with_target(true).with_level(true)))
        };

        // Another subscriber may already be installed by the host.
        let _ = tracing_subscriber::registry()
            .with(tree)
            .with(flat)
            .with(filter)
            .try_init();
    });
}
