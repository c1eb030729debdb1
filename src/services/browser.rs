use tracing::{info, warn};

/// Fire-and-forget launch of the default browser. Failure is logged and
/// never surfaced; a headless machine should still get a working server.
pub fn open_in_background(url: String) {
    tokio::task::spawn_blocking(move || match webbrowser::open(&url) {
        Ok(_) => info!("🌐 Opened browser at {}", url),
        Err(e) => warn!("failed to open browser at {}: {}", url, e),
    });
}
