use provisioner_core::shutdown::{ShutdownTrigger, Signal};
use tracing::warn;

/// Listen for SIGINT/SIGTERM on the current runtime and fire `trigger` on the
/// first one. The running stage then gets its grace period and the model
/// artifact is removed before the process exits.
pub fn spawn_listener(trigger: ShutdownTrigger) {
    tokio::spawn(async move {
        let signal = next_signal().await;
        if trigger.fire(signal) {
            warn!(%signal, "received signal, stopping after cleanup");
        }
    });
}

async fn interrupt() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn next_signal() -> Signal {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => tokio::select! {
            _ = interrupt() => Signal::Interrupt,
            _ = term.recv() => Signal::Terminate,
        },
        Err(e) => {
            warn!(error = %e, "could not listen for SIGTERM");
            interrupt().await;
            Signal::Interrupt
        }
    }
}

#[cfg(not(unix))]
async fn next_signal() -> Signal {
    interrupt().await;
    Signal::Interrupt
}
