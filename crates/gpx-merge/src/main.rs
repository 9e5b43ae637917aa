use gpx_merge::{Settings, log_version_info, profiling, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = Settings::from_cli();
    let _profiling = profiling::setup_logging_and_profiling();
    log_version_info();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            tracing::error!("Failed to create Tokio runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(&settings)) {
        Ok(stats) if stats.succeeded() => {
            tracing::info!("SUCCESS");
            ExitCode::SUCCESS
        }
        Ok(stats) if stats.files_read == 0 => {
            tracing::warn!("No input files were merged");
            ExitCode::SUCCESS
        }
        Ok(stats) => {
            tracing::warn!("Finished with {} failure(s)", stats.failure_count());
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
