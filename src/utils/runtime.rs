use anyhow::Result;

/// The tracker is cooperative and single threaded: provider callbacks and display updates all run
/// on one thread.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
