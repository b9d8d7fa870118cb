//! The poll loop: position → resolve → translate → apply → sleep.
//!
//! One dedicated worker thread runs cycles strictly sequentially. Any failure
//! aborts that cycle only — the loop logs it and sleeps toward the next one.
//! The interval is not a hard deadline; drift from slow OS calls is tolerated.
//! Only an explicit stop request ends the loop, checked once per cycle right
//! after the sleep.

use crate::apply::{ApplyError, ApplyOutcome, TimezoneApplier};
use crate::logger::EventLog;
use crate::position::PositionSource;
use crate::resolver::{Resolution, ResolveError, ZoneResolver};
use crate::translate::{self, TranslationError};
use std::fmt;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// What one poll cycle did. Every variant is logged; none stops the loop.
#[derive(Debug)]
pub enum CycleOutcome {
    /// No GPS fix — nothing to do, zero OS calls.
    NoFix,
    /// Resolved and translated; the OS was already on the right zone.
    Unchanged,
    /// The OS timezone was changed.
    Applied { previous: String, current: String },
    /// The cycle failed; the next scheduled cycle is the retry.
    Failed(CycleError),
}

/// Cycle-level error: the taxonomy collected at the loop boundary.
#[derive(Debug)]
pub enum CycleError {
    Resolve(ResolveError),
    /// A table gap — expected and recoverable, but still ends the cycle.
    Translate(TranslationError),
    Apply(ApplyError),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve(e) => write!(f, "{}", e),
            Self::Translate(e) => write!(f, "{}", e),
            Self::Apply(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CycleError {}

/// The long-lived poll loop driving the whole pipeline.
pub struct ZonePoller {
    source: Box<dyn PositionSource>,
    resolver: ZoneResolver,
    applier: TimezoneApplier,
    log: EventLog,
    interval: Duration,
}

impl ZonePoller {
    pub fn new(
        source: Box<dyn PositionSource>,
        resolver: ZoneResolver,
        applier: TimezoneApplier,
        log: EventLog,
        interval: Duration,
    ) -> Self {
        Self { source, resolver, applier, log, interval }
    }

    /// Run exactly one cycle. Also the `--once` entry point.
    pub fn run_cycle(&self) -> CycleOutcome {
        let position = self.source.current_position();

        let tz = match self.resolver.resolve(&position) {
            Ok(Resolution::NoFix) => {
                self.log.write("no GPS fix; skipping cycle");
                return CycleOutcome::NoFix;
            }
            Ok(Resolution::Zone(tz)) => tz,
            Err(e) => {
                self.log.write(&format!("cycle failed: {}", e));
                return CycleOutcome::Failed(CycleError::Resolve(e));
            }
        };

        self.log
            .write(&format!("position {} resolved to '{}'", position, tz.name()));

        let target = match translate::translate(tz.name()) {
            Ok(key) => key,
            Err(e) => {
                // Known table gap; worth a log line, not an alarm.
                self.log.write(&format!("cycle skipped: {}", e));
                return CycleOutcome::Failed(CycleError::Translate(e));
            }
        };

        match self.applier.apply(&target) {
            Ok(ApplyOutcome::Unchanged { current }) => {
                self.log
                    .write(&format!("timezone already '{}'; nothing to do", current));
                CycleOutcome::Unchanged
            }
            Ok(ApplyOutcome::Applied { previous, current }) => CycleOutcome::Applied {
                previous: previous.to_string(),
                current: current.to_string(),
            },
            Err(e) => {
                self.log.write(&format!("cycle failed: {}", e));
                CycleOutcome::Failed(CycleError::Apply(e))
            }
        }
    }

    /// Start the dedicated worker thread. Spawn failure is the one fatal
    /// initialization error and is surfaced to the host.
    pub fn spawn(self) -> std::io::Result<PollerHandle> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = self.interval;

        let thread = thread::Builder::new()
            .name("zoneshift-poller".into())
            .spawn(move || {
                self.log
                    .write(&format!("poll loop started (interval {}s)", interval.as_secs()));
                loop {
                    let _ = self.run_cycle();
                    match stop_rx.recv_timeout(interval) {
                        Err(mpsc::RecvTimeoutError::Timeout) => continue,
                        // Stop requested, or the handle was dropped.
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
                self.log.write("poll loop stopped");
            })?;

        Ok(PollerHandle { stop_tx, thread })
    }
}

/// Owner-side handle to a running poller.
pub struct PollerHandle {
    stop_tx: mpsc::Sender<()>,
    thread: thread::JoinHandle<()>,
}

impl PollerHandle {
    /// Request a cooperative stop and wait for the worker to finish. The
    /// signal is observed once per cycle; an in-flight OS call is not
    /// interrupted.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.thread.join();
    }

    /// Block until the worker exits on its own. The stop channel stays open
    /// for the duration, so this only returns if the worker dies.
    pub fn wait(self) {
        let _ = self.thread.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::testing::MockAdapter;
    use crate::notify::testing::RecordingNotifier;
    use crate::position::{FixedPosition, GeoPosition};
    use crate::resolver::{LookupError, ZoneLookup};
    use std::sync::Arc;

    struct ScriptedLookup(Result<String, LookupError>);

    impl ZoneLookup for ScriptedLookup {
        fn lookup(&self, _lat: f64, _lon: f64) -> Result<String, LookupError> {
            self.0.clone()
        }
    }

    struct Fixture {
        poller: ZonePoller,
        adapter: Arc<MockAdapter>,
        notifier: RecordingNotifier,
    }

    fn fixture(position: GeoPosition, lookup_answer: &str, adapter: MockAdapter) -> Fixture {
        let adapter = Arc::new(adapter);
        let notifier = RecordingNotifier::default();
        let applier = TimezoneApplier::new(
            adapter.clone(),
            Box::new(notifier.clone()),
            EventLog::disabled(),
        );
        let resolver = ZoneResolver::new(Box::new(ScriptedLookup(Ok(lookup_answer.to_string()))));
        let poller = ZonePoller::new(
            Box::new(FixedPosition(position)),
            resolver,
            applier,
            EventLog::disabled(),
            Duration::from_millis(10),
        );
        Fixture { poller, adapter, notifier }
    }

    #[test]
    fn test_no_fix_cycle_makes_zero_os_calls() {
        let f = fixture(
            GeoPosition::new(0.0, 0.0),
            "Europe/Paris",
            MockAdapter::with_active("Romance Standard Time"),
        );

        assert!(matches!(f.poller.run_cycle(), CycleOutcome::NoFix));

        let calls = f.adapter.calls();
        assert_eq!(calls.read_active, 0);
        assert_eq!(calls.acquire, 0);
        assert_eq!(calls.set_active, 0);
    }

    #[test]
    fn test_paris_steady_state() {
        // Paris coordinates, OS already on Romance Standard Time: no apply,
        // no privilege, no notification.
        let f = fixture(
            GeoPosition::new(48.8566, 2.3522),
            "Europe/Paris",
            MockAdapter::with_active("Romance Standard Time"),
        );

        assert!(matches!(f.poller.run_cycle(), CycleOutcome::Unchanged));
        assert_eq!(f.adapter.calls().acquire, 0);
        assert!(f.notifier.received().is_empty());
    }

    #[test]
    fn test_london_crossing_applies_and_notifies() {
        let adapter = MockAdapter::with_active("Romance Standard Time");
        adapter.seed("GMT Standard Time", 0);
        let f = fixture(GeoPosition::new(51.5074, -0.1278), "Europe/London", adapter);

        match f.poller.run_cycle() {
            CycleOutcome::Applied { previous, current } => {
                assert_eq!(previous, "Romance Standard Time");
                assert_eq!(current, "GMT Standard Time");
            }
            other => panic!("expected Applied, got {:?}", other),
        }
        assert_eq!(f.notifier.received(), vec!["GMT Standard Time".to_string()]);
    }

    #[test]
    fn test_lookup_failure_contains_to_one_cycle() {
        let adapter = Arc::new(MockAdapter::with_active("Romance Standard Time"));
        let notifier = RecordingNotifier::default();
        let applier = TimezoneApplier::new(
            adapter.clone(),
            Box::new(notifier.clone()),
            EventLog::disabled(),
        );
        let resolver = ZoneResolver::new(Box::new(ScriptedLookup(Err(LookupError::Network(
            "offline".into(),
        )))));
        let poller = ZonePoller::new(
            Box::new(FixedPosition(GeoPosition::new(48.8566, 2.3522))),
            resolver,
            applier,
            EventLog::disabled(),
            Duration::from_millis(10),
        );

        // Two consecutive failing cycles: each contained, nothing mutated.
        for _ in 0..2 {
            assert!(matches!(
                poller.run_cycle(),
                CycleOutcome::Failed(CycleError::Resolve(_))
            ));
        }
        assert_eq!(adapter.calls().read_active, 0);
    }

    #[test]
    fn test_unmapped_zone_skips_apply() {
        // Dubai is a real zone with no table entry.
        let f = fixture(
            GeoPosition::new(25.2048, 55.2708),
            "Asia/Dubai",
            MockAdapter::with_active("Romance Standard Time"),
        );

        assert!(matches!(
            f.poller.run_cycle(),
            CycleOutcome::Failed(CycleError::Translate(TranslationError::UnmappedZone { .. }))
        ));
        assert_eq!(f.adapter.calls().read_active, 0);
        assert_eq!(f.adapter.calls().acquire, 0);
    }

    #[test]
    fn test_privilege_denied_leaves_loop_alive() {
        let mut adapter = MockAdapter::with_active("Romance Standard Time");
        adapter.fail_acquire = true;
        adapter.seed("GMT Standard Time", 0);
        let f = fixture(GeoPosition::new(51.5074, -0.1278), "Europe/London", adapter);

        assert!(matches!(
            f.poller.run_cycle(),
            CycleOutcome::Failed(CycleError::Apply(ApplyError::PrivilegeDenied(_)))
        ));
        // And the next cycle still runs.
        assert!(matches!(f.poller.run_cycle(), CycleOutcome::Failed(_)));
        assert_eq!(f.adapter.calls().set_active, 0);
    }

    #[test]
    fn test_spawn_and_stop() {
        let f = fixture(
            GeoPosition::new(0.0, 0.0),
            "Europe/Paris",
            MockAdapter::with_active("Romance Standard Time"),
        );

        let handle = f.poller.spawn().unwrap();
        thread::sleep(Duration::from_millis(35));
        handle.stop();
        // Cooperative stop joined; the worker is gone and made no OS calls.
        assert_eq!(f.adapter.calls().set_active, 0);
    }
}
