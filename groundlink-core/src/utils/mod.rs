//! Utility functions and helpers

/// Wait until the process receives an interrupt signal (Ctrl-C).
///
/// Returns control to the caller on receipt without draining or closing
/// anything; shutdown stays an explicit follow-up step.
pub async fn wait_for_interrupt() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
