use std::time::Duration;

// A poisoned lock means the process is in an unrecoverable/unsafe state and must exit (we panic).
pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - continued execution \
    is not safe because we can no longer ensure that the event registration is torn down correctly";

/// How long [`EventFuture::wait()`][crate::EventFuture::wait] blocks before giving up,
/// unless a different timeout is configured via
/// [`EventFutureBuilder::timeout()`][crate::EventFutureBuilder::timeout].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
