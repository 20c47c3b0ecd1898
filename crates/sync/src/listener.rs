//! The live event loop: pull, renew the watchdog, route, repeat.

use std::sync::Arc;

use {
    tokio::time::Duration,
    tracing::{debug, warn},
};

use chronicle_platform::PlatformListener;

use crate::{
    error::{Error, Result},
    router::EventRouter,
    watchdog::Watchdog,
};

/// Blocking pull against the platform, one event at a time in arrival
/// order. Never returns `Ok`: the loop ends only when the connection
/// stalls (watchdog) or the transport breaks, and the supervisor decides
/// what happens next.
pub struct EventListener {
    source: Box<dyn PlatformListener>,
    router: Arc<EventRouter>,
    watchdog_timeout: Duration,
}

impl EventListener {
    #[must_use]
    pub fn new(
        source: Box<dyn PlatformListener>,
        router: Arc<EventRouter>,
        watchdog_timeout: Duration,
    ) -> Self {
        Self {
            source,
            router,
            watchdog_timeout,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let watchdog = Watchdog::arm(self.watchdog_timeout);

        loop {
            tokio::select! {
                () = watchdog.stalled().cancelled() => {
                    return Err(Error::Stalled);
                },
                event = self.source.next_event() => {
                    let event = event?;
                    watchdog.renew();
                    match self.router.handle(event).await {
                        Ok(disposition) => {
                            debug!(?disposition, "event routed");
                        },
                        Err(e) if e.is_fatal_connection() => return Err(e),
                        Err(e) => {
                            // Permanent for this event only: log and move on.
                            warn!(error = %e, "event skipped");
                        },
                    }
                },
            }
        }
    }
}
