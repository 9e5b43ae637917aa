use shadow_rs::shadow;

shadow!(build);

/// Log version info through `tracing`.
pub fn log_version_info() {
    tracing::info!("{}", short_version_info());
    tracing::info!(
        "Build date: {} ({})",
        build::BUILD_TIME_2822,
        build::BUILD_RUST_CHANNEL
    );
}

/// `name version (branch@commit[+dirty])`
pub fn short_version_info() -> String {
    format!(
        "{} {} ({}@{}{})",
        build::PROJECT_NAME,
        build::PKG_VERSION,
        build::BRANCH,
        build::SHORT_COMMIT,
        if build::GIT_CLEAN { "" } else { "+dirty" }
    )
}

/// Value of the `creator` attribute of merged documents
pub fn creator() -> String {
    format!("{} {}", build::PROJECT_NAME, build::PKG_VERSION)
}
