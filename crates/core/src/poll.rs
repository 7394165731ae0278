//! Long-running poll loop around `Monitor::tick`.
//!
//! Each tick runs as its own task over a shared monitor, so a panic inside a
//! tick is reported as a join error and the loop carries on.

use crate::monitor::{Monitor, TickOutcome};
use crate::process::ProcessProbe;
use daw_presence::PresenceChannel;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Run the monitor until `shutdown` resolves, then clear the presence.
///
/// There is no other exit: every failure inside a tick is retried.
pub async fn run_monitor<C, P, F>(mut monitor: Monitor<C, P>, shutdown: F)
where
    C: PresenceChannel + 'static,
    P: ProcessProbe + 'static,
    F: Future<Output = ()>,
{
    let timing = monitor.config().timing;
    monitor.start();

    let monitor = Arc::new(Mutex::new(monitor));
    tokio::pin!(shutdown);

    info!("monitoring loop started");

    let mut delay = Duration::ZERO;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(delay) => {}
        }

        let tick_monitor = Arc::clone(&monitor);
        let mut tick = tokio::spawn(async move { tick_monitor.lock().await.tick().await });

        let joined = tokio::select! {
            biased;
            _ = &mut shutdown => {
                // Cancels at the tick's next await, releasing the monitor.
                tick.abort();
                break;
            }
            joined = &mut tick => joined,
        };

        delay = match joined {
            Ok(outcome) => {
                if let TickOutcome::TransientIo(e) = &outcome {
                    debug!(error = %e, "tick failed, retrying");
                }
                outcome.delay(&timing)
            }
            Err(e) => {
                error!(error = %e, "monitor tick panicked");
                timing.panic_backoff
            }
        };
    }

    info!("monitoring loop stopping");
    monitor.lock().await.shutdown();
}
