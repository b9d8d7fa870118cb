//! Change notification sink.

/// Receives a human-readable message naming the new timezone. Fire and
/// forget — no acknowledgment, and a sink must never fail the pipeline.
pub trait NotificationSink: Send {
    fn notify(&self, message: &str);
}

/// Default sink: one line on stderr.
pub struct StderrNotifier;

impl NotificationSink for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("TZ: {}", message);
    }
}

/// Sink that drops notifications (dry runs).
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn notify(&self, _message: &str) {}
}
