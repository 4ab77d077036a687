//! Logging initialization

/// Initialize the logging system for a host application.
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g. `RUST_LOG=maze3d=debug`
/// to see room placement and floating-block selection detail.
///
/// # Example
/// ```
/// maze3d::core::logging::init();
/// log::info!("Maze host started");
/// ```
pub fn init() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();
}
