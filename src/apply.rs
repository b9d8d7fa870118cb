//! Transactional timezone apply.
//!
//! The state machine per invocation: read current → compare → acquire
//! privilege → fetch definition → commit → release privilege → verify →
//! notify. The steady state (current == target) takes the first two steps
//! only and never touches the privilege subsystem. Past acquisition, release
//! happens on every path — success, commit failure, or definition-fetch
//! failure.

use crate::adapter::{AdapterError, NativeZoneKey, OsTimezoneAdapter, TIME_ZONE_PRIVILEGE};
use crate::logger::EventLog;
use crate::notify::NotificationSink;
use std::fmt;
use std::sync::Arc;

/// What one apply invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The OS already runs the target zone. No privilege was acquired.
    Unchanged { current: NativeZoneKey },
    /// The zone was changed and the change verified.
    Applied {
        previous: NativeZoneKey,
        current: NativeZoneKey,
    },
}

/// Apply-stage failures, one variant per state-machine step.
#[derive(Debug, Clone)]
pub enum ApplyError {
    /// Could not read the active timezone.
    ReadFailed(AdapterError),
    /// The elevated right was refused. Nothing was mutated.
    PrivilegeDenied(AdapterError),
    /// The catalog has no definition for the target key.
    DefinitionLookupFailed(AdapterError),
    /// The mutator rejected the new definition.
    CommitFailed(AdapterError),
    /// The commit reported success but the re-read disagrees. Anomaly; the
    /// next cycle is the retry.
    VerificationMismatch {
        expected: NativeZoneKey,
        found: NativeZoneKey,
    },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed(e) => write!(f, "failed to read active timezone: {}", e),
            Self::PrivilegeDenied(e) => write!(f, "timezone privilege denied: {}", e),
            Self::DefinitionLookupFailed(e) => write!(f, "definition lookup failed: {}", e),
            Self::CommitFailed(e) => write!(f, "failed to commit new timezone: {}", e),
            Self::VerificationMismatch { expected, found } => write!(
                f,
                "verification mismatch after commit: expected '{}', found '{}'",
                expected, found
            ),
        }
    }
}

impl std::error::Error for ApplyError {}

/// Applies a target native zone to the OS, idempotently and privilege-gated.
pub struct TimezoneApplier {
    adapter: Arc<dyn OsTimezoneAdapter + Sync>,
    notifier: Box<dyn NotificationSink>,
    log: EventLog,
}

impl TimezoneApplier {
    pub fn new(
        adapter: Arc<dyn OsTimezoneAdapter + Sync>,
        notifier: Box<dyn NotificationSink>,
        log: EventLog,
    ) -> Self {
        Self { adapter, notifier, log }
    }

    /// Drive one apply. Idempotent: a second call with no external change is
    /// a no-op that acquires nothing.
    pub fn apply(&self, target: &NativeZoneKey) -> Result<ApplyOutcome, ApplyError> {
        let current = self.adapter.read_active().map_err(ApplyError::ReadFailed)?;

        if current == *target {
            return Ok(ApplyOutcome::Unchanged { current });
        }

        self.log
            .write(&format!("timezone change needed: '{}' -> '{}'", current, target));

        self.with_privilege(|| {
            let definition = self
                .adapter
                .fetch_definition(target)
                .map_err(ApplyError::DefinitionLookupFailed)?;
            self.adapter
                .set_active(&definition)
                .map_err(ApplyError::CommitFailed)
        })?;

        // Re-read to confirm the OS agrees before telling anyone.
        let active = self.adapter.read_active().map_err(ApplyError::ReadFailed)?;
        if active != *target {
            self.log.write(&format!(
                "anomaly: commit reported success but active zone is '{}', not '{}'",
                active, target
            ));
            return Err(ApplyError::VerificationMismatch {
                expected: target.clone(),
                found: active,
            });
        }

        // Best-effort broadcast; a timeout is logged, never fatal.
        if let Err(e) = self.adapter.broadcast_change() {
            self.log.write(&format!("settings-change broadcast failed: {}", e));
        }

        self.log.write(&format!("timezone changed to '{}'", target));
        self.notifier.notify(target.as_str());

        Ok(ApplyOutcome::Applied { previous: current, current: active })
    }

    /// Run `f` with the timezone privilege held. Release is unconditional
    /// once acquisition succeeded, whatever `f` returns; a failed release is
    /// logged and otherwise swallowed to keep the privilege window honest.
    fn with_privilege<T>(
        &self,
        f: impl FnOnce() -> Result<T, ApplyError>,
    ) -> Result<T, ApplyError> {
        self.adapter
            .acquire_privilege(TIME_ZONE_PRIVILEGE)
            .map_err(ApplyError::PrivilegeDenied)?;

        let outcome = f();

        if let Err(e) = self.adapter.release_privilege(TIME_ZONE_PRIVILEGE) {
            self.log
                .write(&format!("failed to release {}: {}", TIME_ZONE_PRIVILEGE, e));
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::testing::MockAdapter;
    use crate::notify::testing::RecordingNotifier;

    fn applier_with(adapter: MockAdapter) -> (TimezoneApplier, Arc<MockAdapter>, RecordingNotifier) {
        let adapter = Arc::new(adapter);
        let notifier = RecordingNotifier::default();
        let applier = TimezoneApplier::new(
            adapter.clone(),
            Box::new(notifier.clone()),
            EventLog::disabled(),
        );
        (applier, adapter, notifier)
    }

    #[test]
    fn test_steady_state_is_a_no_op_without_privilege() {
        // Paris position, OS already on Romance Standard Time.
        let (applier, adapter, notifier) = applier_with(MockAdapter::with_active("Romance Standard Time"));

        let outcome = applier.apply(&NativeZoneKey::from("Romance Standard Time")).unwrap();

        assert_eq!(
            outcome,
            ApplyOutcome::Unchanged { current: NativeZoneKey::from("Romance Standard Time") }
        );
        let calls = adapter.calls();
        assert_eq!(calls.acquire, 0);
        assert_eq!(calls.release, 0);
        assert_eq!(calls.set_active, 0);
        assert!(notifier.received().is_empty());
    }

    #[test]
    fn test_change_applies_and_notifies_once() {
        // London after a channel crossing: Romance -> GMT.
        let adapter = MockAdapter::with_active("Romance Standard Time");
        adapter.seed("GMT Standard Time", 0);
        let (applier, adapter, notifier) = applier_with(adapter);

        let outcome = applier.apply(&NativeZoneKey::from("GMT Standard Time")).unwrap();

        assert_eq!(
            outcome,
            ApplyOutcome::Applied {
                previous: NativeZoneKey::from("Romance Standard Time"),
                current: NativeZoneKey::from("GMT Standard Time"),
            }
        );
        assert_eq!(adapter.active_key(), NativeZoneKey::from("GMT Standard Time"));
        assert_eq!(notifier.received(), vec!["GMT Standard Time".to_string()]);

        let calls = adapter.calls();
        assert_eq!(calls.acquire, 1);
        assert_eq!(calls.release, 1);
        assert_eq!(calls.set_active, 1);
        assert_eq!(calls.broadcast, 1);
    }

    #[test]
    fn test_second_apply_is_idempotent() {
        let adapter = MockAdapter::with_active("Romance Standard Time");
        adapter.seed("GMT Standard Time", 0);
        let (applier, adapter, _notifier) = applier_with(adapter);
        let target = NativeZoneKey::from("GMT Standard Time");

        assert!(matches!(applier.apply(&target).unwrap(), ApplyOutcome::Applied { .. }));
        assert!(matches!(applier.apply(&target).unwrap(), ApplyOutcome::Unchanged { .. }));

        // Privilege was only ever taken for the real change.
        let calls = adapter.calls();
        assert_eq!(calls.acquire, 1);
        assert_eq!(calls.release, 1);
    }

    #[test]
    fn test_privilege_denied_mutates_nothing() {
        let mut adapter = MockAdapter::with_active("Romance Standard Time");
        adapter.fail_acquire = true;
        adapter.seed("GMT Standard Time", 0);
        let (applier, adapter, notifier) = applier_with(adapter);

        let err = applier.apply(&NativeZoneKey::from("GMT Standard Time")).unwrap_err();
        assert!(matches!(err, ApplyError::PrivilegeDenied(_)));

        let calls = adapter.calls();
        assert_eq!(calls.fetch_definition, 0);
        assert_eq!(calls.set_active, 0);
        assert_eq!(calls.release, 0);
        assert!(notifier.received().is_empty());
        assert_eq!(adapter.active_key(), NativeZoneKey::from("Romance Standard Time"));
    }

    #[test]
    fn test_missing_definition_releases_privilege() {
        // Catalog not seeded: the fetch fails after acquisition.
        let adapter = MockAdapter::with_active("Romance Standard Time");
        let (applier, adapter, _notifier) = applier_with(adapter);

        let err = applier.apply(&NativeZoneKey::from("GMT Standard Time")).unwrap_err();
        assert!(matches!(err, ApplyError::DefinitionLookupFailed(_)));

        let calls = adapter.calls();
        assert_eq!(calls.acquire, 1);
        assert_eq!(calls.release, 1);
        assert_eq!(calls.set_active, 0);
    }

    #[test]
    fn test_commit_failure_still_releases_privilege() {
        let mut adapter = MockAdapter::with_active("Romance Standard Time");
        adapter.fail_commit = true;
        adapter.seed("GMT Standard Time", 0);
        let (applier, adapter, notifier) = applier_with(adapter);

        let err = applier.apply(&NativeZoneKey::from("GMT Standard Time")).unwrap_err();
        assert!(matches!(err, ApplyError::CommitFailed(_)));

        let calls = adapter.calls();
        assert_eq!(calls.acquire, 1);
        assert_eq!(calls.release, 1);
        assert!(notifier.received().is_empty());
    }

    #[test]
    fn test_verification_mismatch_is_surfaced_without_notification() {
        let mut adapter = MockAdapter::with_active("Romance Standard Time");
        adapter.silently_ignore_commit = true;
        adapter.seed("GMT Standard Time", 0);
        let (applier, adapter, notifier) = applier_with(adapter);

        let err = applier.apply(&NativeZoneKey::from("GMT Standard Time")).unwrap_err();
        assert!(matches!(
            err,
            ApplyError::VerificationMismatch { ref expected, ref found }
                if expected.as_str() == "GMT Standard Time"
                    && found.as_str() == "Romance Standard Time"
        ));

        let calls = adapter.calls();
        assert_eq!(calls.release, 1);
        assert_eq!(calls.broadcast, 0);
        assert!(notifier.received().is_empty());
    }

    #[test]
    fn test_broadcast_timeout_does_not_fail_the_apply() {
        let mut adapter = MockAdapter::with_active("Romance Standard Time");
        adapter.fail_broadcast = true;
        adapter.seed("GMT Standard Time", 0);
        let (applier, _adapter, notifier) = applier_with(adapter);

        let outcome = applier.apply(&NativeZoneKey::from("GMT Standard Time")).unwrap();
        assert!(matches!(outcome, ApplyOutcome::Applied { .. }));
        // Notification still fires; the broadcast is best-effort.
        assert_eq!(notifier.received().len(), 1);
    }

    #[test]
    fn test_read_failure_aborts_first() {
        let mut adapter = MockAdapter::with_active("Romance Standard Time");
        adapter.fail_read = true;
        let (applier, adapter, _notifier) = applier_with(adapter);

        let err = applier.apply(&NativeZoneKey::from("GMT Standard Time")).unwrap_err();
        assert!(matches!(err, ApplyError::ReadFailed(_)));
        assert_eq!(adapter.calls().acquire, 0);
    }
}
