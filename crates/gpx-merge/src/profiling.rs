/*!
Logging and profiling setup.

There are two implementations behind one API:

- real: compiled only when `feature = "profiling"` is set. Adds a tracing-chrome
  layer recording every span of the run into `trace-<timestamp>.json`, viewable in
  Perfetto or `chrome://tracing`.
- stub: logging only.

`setup_logging_and_profiling()` returns a guard; keep it alive until the run ends
so the trace file gets flushed.
*/

/// Log filter used when `RUST_LOG` is not set
fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

#[cfg(feature = "profiling")]
mod inner {
    use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    /// Flushes the trace file when dropped
    pub struct ProfilingGuard {
        _flush: FlushGuard,
    }

    pub fn setup_logging_and_profiling() -> ProfilingGuard {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(super::default_filter()));
        let fmt_layer = fmt::layer().with_filter(filter);

        let trace_file = format!("trace-{}.json", chrono::Utc::now().format("%Y%m%dT%H%M%S"));
        let (chrome_layer, flush) = ChromeLayerBuilder::new().file(&trace_file).build();

        tracing_subscriber::registry()
            .with(chrome_layer)
            .with(fmt_layer)
            .init();

        tracing::info!("Profiling enabled, writing Chrome trace to {trace_file}");
        ProfilingGuard { _flush: flush }
    }
}

#[cfg(not(feature = "profiling"))]
mod inner {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    pub struct ProfilingGuard;

    /// Initialize logging with sensible defaults; profiling is a no-op here.
    pub fn setup_logging_and_profiling() -> ProfilingGuard {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(super::default_filter()));
        let fmt_layer = fmt::layer().with_filter(filter);
        tracing_subscriber::registry().with(fmt_layer).init();

        tracing::debug!("Logging initialized (profiling disabled in this build)");
        ProfilingGuard
    }
}

// Re-export a stable API surface regardless of which `inner` module was compiled.
pub use inner::{ProfilingGuard, setup_logging_and_profiling};
