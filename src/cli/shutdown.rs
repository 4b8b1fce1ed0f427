use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `cancelation` once the process receives Ctrl-C. Returns early if something else
/// cancelled it first.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => {
                info!("Received shutdown signal");
                cancelation.cancel();
            }
            Err(e) => {
                error!("Failed to listen for Ctrl-C {e:?}");
                cancelation.cancelled().await;
            }
        },
        _ = cancelation.cancelled() => {}
    };
}
