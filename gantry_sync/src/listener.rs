/// A callback contract through which a draining component reports the fate of
/// its tracked activity.
///
/// A listener is handed over when a drain is requested (e.g., when a control
/// point is paused), and is resolved later by whichever thread observes the
/// terminal event first:
///
/// - [`finished`](ActivityListener::finished) fires once all tracked activity
///   has reached zero while draining was in effect;
/// - [`cancelled`](ActivityListener::cancelled) fires if draining was aborted
///   (e.g., via a resume) before [`finished`](ActivityListener::finished) had
///   a chance to fire.
///
/// ## Exactly-once contract
///
/// Per listener instance, **at most one** of the two events ever fires, and
/// never both. Components that accept a listener must uphold this guarantee
/// even when completion and cancellation race on different threads.
///
/// Callbacks are invoked inline on the thread that observed the terminal
/// event, so implementations should be quick and must not block.
pub trait ActivityListener: Send + Sync {
    /// Invoked once all tracked activity has completed while draining.
    fn finished(&self);

    /// Invoked if draining was called off before all tracked activity had
    /// completed.
    fn cancelled(&self);
}
