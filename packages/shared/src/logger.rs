//! Logging setup utilities for the Kakehashi relay.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for the given crate targets.
///
/// Every target gets `default_log_level`, e.g. `kakehashi_server=info,tower_http=info`.
pub fn default_filter(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `targets` - Crate or binary names to enable (e.g., `["kakehashi-server", "tower_http"]`)
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use kakehashi_shared::logger::setup_logger;
///
/// setup_logger(&["kakehashi-server"], "info");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_normalizes_crate_names() {
        // テスト項目: クレート名のハイフンがアンダースコアに変換される
        // given (前提条件):
        let targets = ["kakehashi-server", "tower_http"];

        // when (操作):
        let filter = default_filter(&targets, "debug");

        // then (期待する結果):
        assert_eq!(filter, "kakehashi_server=debug,tower_http=debug");
    }

    #[test]
    fn test_default_filter_with_no_targets() {
        // テスト項目: ターゲットが空の場合、空のフィルタになる
        // given (前提条件):
        let targets: [&str; 0] = [];

        // when (操作):
        let filter = default_filter(&targets, "info");

        // then (期待する結果):
        assert!(filter.is_empty());
    }
}
