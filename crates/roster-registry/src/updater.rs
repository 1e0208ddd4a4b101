//! StatusUpdater — keeps registered applications' status fresh.
//!
//! One recurring tick enumerates a snapshot of the store and re-probes
//! every entry whose status is older than `status_lifetime`. The tick
//! cadence (`monitor period`, owned by the caller of [`StatusUpdater::run`])
//! and the staleness threshold are independent knobs: a single shared
//! loop serves any number of registrations without per-entry timers.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use roster_model::{Application, status::now_millis};

use crate::events::{EventHub, RegistryEvent};
use crate::probe::query_status;
use crate::store::ApplicationStore;

const DEFAULT_STATUS_LIFETIME: Duration = Duration::from_secs(30);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Probes stale applications and publishes status changes.
pub struct StatusUpdater {
    store: ApplicationStore,
    hub: EventHub,
    /// How long a determined status stays fresh.
    status_lifetime: Duration,
    /// Upper bound for a single health probe (connect + read).
    probe_timeout: Duration,
}

impl StatusUpdater {
    pub fn new(store: ApplicationStore, hub: EventHub) -> Self {
        Self {
            store,
            hub,
            status_lifetime: DEFAULT_STATUS_LIFETIME,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_status_lifetime(mut self, lifetime: Duration) -> Self {
        self.status_lifetime = lifetime;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// One polling tick: probe every stale entry in the snapshot taken
    /// at tick start. Entries registered mid-tick wait for the next one.
    pub async fn update_all(&self) {
        let now = now_millis();
        let lifetime_ms = self.status_lifetime.as_millis() as u64;

        for application in self.store.find_all() {
            let age = now.saturating_sub(application.status_info().timestamp());
            if age > lifetime_ms {
                self.update_status(&application).await;
            } else {
                trace!(
                    id = application.id().unwrap_or(""),
                    age_ms = age,
                    "status still fresh, skipping probe"
                );
            }
        }
    }

    /// Probe one application and store the result. Publishes a
    /// `StatusChanged` event when the tag differs from the previous one.
    pub async fn update_status(&self, application: &Application) {
        let old_status = application.status_info().clone();
        let new_status = query_status(application.health_url(), self.probe_timeout).await;
        // Tag comparison only: re-confirming the same status refreshes
        // the timestamp without notifying anyone.
        let changed = new_status != old_status;

        debug!(
            id = application.id().unwrap_or(""),
            name = application.name(),
            status = new_status.status(),
            changed,
            "status determined"
        );

        let updated = match Application::rebuild(application)
            .with_status_info(new_status.clone())
            .build()
        {
            Ok(app) => app,
            Err(e) => {
                warn!(name = application.name(), error = %e, "could not rebuild application");
                return;
            }
        };

        match self.store.save(updated) {
            Ok(stored) => {
                if changed {
                    self.hub.publish(&RegistryEvent::StatusChanged {
                        application: stored,
                        from: old_status,
                        to: new_status,
                    });
                }
            }
            Err(e) => {
                warn!(name = application.name(), error = %e, "could not store updated status");
            }
        }
    }

    /// Run the recurring polling loop until the shutdown signal fires.
    ///
    /// One unreachable client delays the entries after it in the same
    /// tick by at most the probe timeout; it never kills the loop.
    pub async fn run(&self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(
            period_ms = period.as_millis() as u64,
            lifetime_ms = self.status_lifetime.as_millis() as u64,
            "status updater started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(period) => {
                    self.update_all().await;
                }
                _ = shutdown.changed() => {
                    info!("status updater shutting down");
                    break;
                }
            }
        }
    }
}
