// crates/netplane-discovery/src/driver.rs
// ============================================================================
// Module: Discovery Driver
// Description: Periodic discovery tick driving rediscovery and issuance.
// Purpose: Sequence reset, refresh, and specification renewal per tick.
// Dependencies: netplane-core, tokio, crate::lifecycle, crate::registry,
//               crate::telemetry
// ============================================================================

//! ## Overview
//! The driver owns the discovery cadence: every tick it first decays stale
//! state when the reset period has elapsed (clearing the seen-agent set and
//! signalling the topology side to mark everything stale), then rediscovers
//! capabilities and issues a renewed specification for each newly observed
//! one. The reset must run before the refresh so known agents can be
//! re-specified instead of staying one-shot forever. A failed tick is
//! reported through the event hooks and the loop keeps ticking; only the
//! shutdown signal stops it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use netplane_core::Receipt;
use netplane_core::Schedule;
use tokio::sync::mpsc;

use crate::lifecycle::LifecycleError;
use crate::lifecycle::LifecycleHandle;
use crate::registry::CapabilityRegistry;
use crate::telemetry::DiscoveryEvents;
use crate::telemetry::NoopDiscoveryEvents;

// ============================================================================
// SECTION: Discovery Cadence
// ============================================================================

/// Timing knobs for the discovery loop.
///
/// # Invariants
/// - `tick_period` bounds how often the broker is asked for capabilities.
/// - `reset_period` bounds both seen-set and topology staleness decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryCadence {
    /// Interval between discovery ticks.
    pub tick_period: Duration,
    /// Interval after which seen agents and topology state decay.
    pub reset_period: Duration,
    /// Sampling period stamped into issued specifications.
    pub spec_period: Duration,
}

impl Default for DiscoveryCadence {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(10_000),
            reset_period: Duration::from_secs(60),
            spec_period: Duration::from_millis(5_000),
        }
    }
}

// ============================================================================
// SECTION: Discovery Driver
// ============================================================================

/// Sequences one discovery tick: reset, refresh, issue.
pub struct DiscoveryDriver {
    /// Seen-agent registry.
    registry: CapabilityRegistry,
    /// Lifecycle handle issuing specifications.
    lifecycle: LifecycleHandle,
    /// Signal raised when a reset happened, consumed by topology decay.
    reset_signal: mpsc::Sender<()>,
    /// Timing knobs.
    cadence: DiscoveryCadence,
    /// Event hooks for tick failures.
    events: Arc<dyn DiscoveryEvents>,
}

impl DiscoveryDriver {
    /// Creates a driver over a registry and a lifecycle handle.
    #[must_use]
    pub fn new(
        registry: CapabilityRegistry,
        lifecycle: LifecycleHandle,
        reset_signal: mpsc::Sender<()>,
        cadence: DiscoveryCadence,
    ) -> Self {
        Self {
            registry,
            lifecycle,
            reset_signal,
            cadence,
            events: Arc::new(NoopDiscoveryEvents),
        }
    }

    /// Replaces the event hooks.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn DiscoveryEvents>) -> Self {
        self.events = events;
        self
    }

    /// Runs one discovery tick and returns the receipts of issued
    /// specifications.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when discovery or issuance fails; receipts
    /// carrying agent-side errors are returned, not raised.
    pub async fn tick(&mut self, now: Instant) -> Result<Vec<Receipt>, LifecycleError> {
        if self.registry.reset_if_stale(now, self.cadence.reset_period) {
            let _ = self.reset_signal.send(()).await;
        }
        let fresh = self.registry.refresh().await?;
        let mut receipts = Vec::with_capacity(fresh.len());
        for capability in fresh {
            let window = self.window();
            receipts.push(self.lifecycle.issue(capability, window).await?);
        }
        Ok(receipts)
    }

    /// Runs the discovery loop until the shutdown signal fires.
    ///
    /// A failed tick is reported through the event hooks and the next tick
    /// runs on schedule; a transient broker outage never kills the loop.
    pub async fn run(&mut self, mut shutdown: mpsc::Receiver<()>) {
        let mut ticks = tokio::time::interval(self.cadence.tick_period);
        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    if let Err(err) = self.tick(Instant::now()).await {
                        self.events.tick_failed(&err);
                    }
                }
                _ = shutdown.recv() => {
                    return;
                }
            }
        }
    }

    /// Builds the schedule window for a renewed specification.
    ///
    /// The window starts now, stops one reset period out, and samples at the
    /// configured specification period; the next reset re-issues before the
    /// window closes.
    fn window(&self) -> Schedule {
        let stop = epoch_millis().saturating_add(duration_millis(self.cadence.reset_period));
        Schedule::starting_now(stop, duration_millis(self.cadence.spec_period))
    }
}

/// Returns the current epoch time in milliseconds.
fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| u64::try_from(elapsed.as_millis()).ok())
        .unwrap_or(0)
}

/// Converts a duration to whole milliseconds, saturating on overflow.
fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
