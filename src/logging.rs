use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_ENV: &str = "COACH_MATCHER_LOG";

/// `COACH_MATCHER_LOG` or `RUST_LOG` override the CLI flags.
pub fn init_tracing(verbose: bool, log_level: Option<&str>) -> anyhow::Result<()> {
    let level = match (verbose, log_level) {
        (_, Some(level)) => filter_directive(level),
        (true, None) => "coach_matcher=debug".to_string(),
        (false, None) => "coach_matcher=warn".to_string(),
    };

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .try_init()?;

    Ok(())
}

fn filter_directive(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("coach_matcher={level}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_levels_are_scoped_to_the_crate() {
        assert_eq!(filter_directive("trace"), "coach_matcher=trace");
        assert_eq!(filter_directive("csv=info"), "csv=info");
    }
}
