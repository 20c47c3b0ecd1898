//! Deadline-based liveness monitor for the event listener.
//!
//! One outstanding deadline; `renew()` replaces it, never stacks a second
//! timer. A dedicated task sleeps until the deadline and re-reads it on
//! wakeup, so a renew that races the expiry just extends the sleep. Firing
//! is guarded by an atomic swap: the expiry callback (cancelling the stall
//! token) runs exactly once, and a `renew()` arriving after the fire is a
//! no-op rather than a second restart.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use {
    tokio::{
        task::JoinHandle,
        time::{Duration, Instant},
    },
    tokio_util::sync::CancellationToken,
    tracing::warn,
};

pub struct Watchdog {
    timeout: Duration,
    deadline: Arc<Mutex<Instant>>,
    fired: Arc<AtomicBool>,
    stalled: CancellationToken,
    task: JoinHandle<()>,
}

impl Watchdog {
    /// Arm the watchdog: unless renewed, the stall token is cancelled
    /// `timeout` from now.
    #[must_use]
    pub fn arm(timeout: Duration) -> Self {
        let deadline = Arc::new(Mutex::new(Instant::now() + timeout));
        let fired = Arc::new(AtomicBool::new(false));
        let stalled = CancellationToken::new();

        let task = tokio::spawn({
            let deadline = Arc::clone(&deadline);
            let fired = Arc::clone(&fired);
            let stalled = stalled.clone();
            async move {
                loop {
                    let until = *deadline.lock().unwrap_or_else(|e| e.into_inner());
                    if Instant::now() >= until {
                        if !fired.swap(true, Ordering::SeqCst) {
                            warn!("watchdog expired, flagging connection as stalled");
                            stalled.cancel();
                        }
                        break;
                    }
                    tokio::time::sleep_until(until).await;
                }
            }
        });

        Self {
            timeout,
            deadline,
            fired,
            stalled,
            task,
        }
    }

    /// Push the deadline forward by the full timeout. No-op once expired.
    pub fn renew(&self) {
        if self.fired.load(Ordering::SeqCst) {
            return;
        }
        let mut deadline = self.deadline.lock().unwrap_or_else(|e| e.into_inner());
        *deadline = Instant::now() + self.timeout;
    }

    /// Cancelled exactly once when the deadline passes without a renew.
    #[must_use]
    pub fn stalled(&self) -> &CancellationToken {
        &self.stalled
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.task.abort();
    }
}
