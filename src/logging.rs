use tracing_subscriber::EnvFilter;

/// All workspace crate targets that should receive log output.
const CRATE_TARGETS: &[&str] = &[
    "hydroskill",
    "hydroskill_datamodel",
    "hydroskill_metrics",
    "hydroskill_stats",
];

/// Maps a verbosity count to a level name.
///
/// - 0   -> warn
/// - 1   -> info
/// - 2   -> debug
/// - 3+  -> trace
fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Directive string applying `level` to every workspace crate.
fn default_directives(verbosity: u8) -> String {
    let level = level(verbosity);
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing for the embedding application.
///
/// `RUST_LOG` overrides `verbosity` if set. Calling this more than once is a
/// no-op after the first successful call.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    // A subscriber may already be installed by the host or a test harness.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(level(0), "warn");
        assert_eq!(level(1), "info");
        assert_eq!(level(2), "debug");
        assert_eq!(level(3), "trace");
        assert_eq!(level(200), "trace");
    }

    #[test]
    fn test_directives_cover_every_crate() {
        let directives = default_directives(2);
        for target in CRATE_TARGETS {
            assert!(directives.contains(&format!("{target}=debug")));
        }
        assert_eq!(directives.split(',').count(), CRATE_TARGETS.len());
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(0);
        init(3);
    }
}
