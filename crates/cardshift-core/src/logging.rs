#![forbid(unsafe_code)]

//! Logging helpers.
//!
//! The engine crates log through `tracing`. This module pins the target
//! names they use and, behind features, re-exports the macros and installs
//! a JSON subscriber for hosts without their own.
//!
//! | Feature | Adds |
//! |---------|------|
//! | `tracing` | `debug!`, `info!`, `trace!`, `warn!`, `error!` re-exports |
//! | `tracing-json` | [`init_json_logging`] |

/// Target used by drag-controller transitions.
pub const TARGET_DRAG: &str = "cardshift::drag";

/// Target used by swap decisions.
pub const TARGET_SWAP: &str = "cardshift::swap";

/// Target used by the animation scheduler.
pub const TARGET_ANIMATION: &str = "cardshift::animation";

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

/// Install a global JSON subscriber filtered by `RUST_LOG`
/// (default `cardshift=info`).
///
/// Returns `false` when a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cardshift=info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_share_prefix() {
        for target in [TARGET_DRAG, TARGET_SWAP, TARGET_ANIMATION] {
            assert!(target.starts_with("cardshift::"));
        }
    }

    #[cfg(feature = "tracing-json")]
    #[test]
    fn json_logging_installs_once() {
        let first = init_json_logging();
        let second = init_json_logging();
        assert!(!second || !first);
    }
}
