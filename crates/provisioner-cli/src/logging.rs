use tracing::Level;
use tracing_subscriber::EnvFilter;

/// `CI=true` marks a non-interactive pipeline run.
pub fn in_automation() -> bool {
    std::env::var("CI").is_ok_and(|v| v == "true")
}

/// Filter from a `RUST_LOG`-style spec. `default_level` applies only when the
/// spec names no directives, so `RUST_LOG=debug` raises the global level.
pub fn env_filter(spec: &str, default_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(spec)
}

/// Diagnostics go to stderr so stdout stays clean for `--json`. Colour is
/// off in automation, where logs end up in CI consoles.
pub fn init(default_level: Level) {
    let spec = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&spec, default_level))
        .with_target(false)
        .with_ansi(!in_automation())
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn unset_uses_default_level() {
        let filter = env_filter("", Level::INFO);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn bare_level_overrides_default() {
        assert_eq!(
            env_filter("debug", Level::INFO).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            env_filter("warn", Level::INFO).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }

    #[test]
    fn target_directive_is_honoured() {
        let filter = env_filter("provisioner_core=trace", Level::INFO);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }
}
