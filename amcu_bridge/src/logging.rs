//! Tracing subscriber setup.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` directives are honored; `level` is added on top. Returns
/// `false` if a subscriber was already installed (the library may be loaded
/// into a process that configured tracing itself).
pub fn init_tracing(level: Level, json: bool) -> bool {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let installed = if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        init_tracing(Level::DEBUG, false);
        assert!(!init_tracing(Level::INFO, true));
    }
}
