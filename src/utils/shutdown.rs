//! Operator interruption
//!
//! A `watch::Sender<bool>` flips to `true` on Ctrl-C; everything that may
//! block for long selects against [`wait_for_shutdown`].

use tokio::sync::watch;
use tracing::warn;

/// Resolve once shutdown has been requested. Never resolves when the
/// sender is gone without having requested it.
pub async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Sender side, flipped by Ctrl-C
pub fn install_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ Interrupted, finishing the current step and shutting down...");
            let _ = tx.send(true);
        }
    });
    rx
}

/// A receiver that never reports shutdown
pub fn never() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn resolves_after_request() {
        let (tx, mut rx) = watch::channel(false);
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), wait_for_shutdown(&mut rx))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dropped_sender_never_resolves() {
        let mut rx = never();
        let waited = tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(&mut rx)).await;
        assert!(waited.is_err());
    }
}
